//! Spaced repetition scheduling engine shared by the study application
//! surfaces.
//!
//! Provides:
//! - Forgetting-curve memory model (retrievability and its inverse)
//! - FSRS scheduler (state machine, stability/difficulty updates, fuzzed
//!   intervals)
//! - Shared types (Card, Rating, State, ReviewLog)
//!
//! The engine is pure and side-effect-free: callers inject `now` on every
//! call and persist the returned card and log themselves.

pub mod error;
pub mod memory;
pub mod parameters;
pub mod scheduler;
pub mod types;

pub use error::{Result, SchedulerError};
pub use memory::{interval_for_retention, retrievability};
pub use parameters::{Parameters, WEIGHT_COUNT};
pub use scheduler::Scheduler;
pub use types::{Card, Rating, ReviewLog, ReviewOutcome, State};
