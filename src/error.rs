//! Error types for srs-core.

use thiserror::Error;

/// Result type alias using SchedulerError.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors surfaced by the scheduling engine.
///
/// All variants are reported synchronously to the caller; nothing is
/// retried internally. The computation is pure and closed-form, so the
/// only failure modes are contract violations on the way in.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Stored card fields violate a scheduling invariant (non-positive
    /// stability, out-of-range difficulty, state/rep inconsistency).
    /// The caller decides whether to repair or reject the record.
    #[error("invalid card state: {reason}")]
    InvalidState { reason: String },

    /// Scheduler parameters rejected at construction time, before any
    /// scheduling call. Never partially applied.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// Per-call input outside the caller contract, e.g. a grading
    /// timestamp earlier than the card's last review.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}
