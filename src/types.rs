//! Core types for the scheduling engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Card learning state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    New,
    Learning,
    Review,
    Relearning,
}

impl Default for State {
    fn default() -> Self {
        Self::New
    }
}

/// Rating for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }
}

/// Scheduling state for one card.
///
/// This is the persistent memory record the engine transforms once per
/// grading event. `stability` and `difficulty` are absent until the first
/// rating; after that, stability is always positive and difficulty stays
/// within [1, 10].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub state: State,
    /// Days until retrievability decays to ~90%.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
    /// Intrinsic hardness, 1-10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    /// Completed reviews. Monotonic.
    pub reps: u32,
    /// Times rated Again while in Review/Relearning. Monotonic.
    pub lapses: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    /// Planned interval length in whole days, kept for audit.
    pub scheduled_days: u32,
    /// Whole days actually elapsed since the previous review, kept for audit.
    pub elapsed_days: u32,
}

impl Card {
    /// Empty scheduling state for a card that has never been rated.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Card {
    fn default() -> Self {
        Self {
            state: State::New,
            stability: None,
            difficulty: None,
            reps: 0,
            lapses: 0,
            last_review_at: None,
            due_at: None,
            scheduled_days: 0,
            elapsed_days: 0,
        }
    }
}

/// Audit record for one grading event, suitable for a review log store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    pub rating: Rating,
    pub previous_state: State,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_stability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_difficulty: Option<f64>,
    pub elapsed_days: u32,
    pub reviewed_at: DateTime<Utc>,
}

/// Result of scheduling a card after review.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    pub card: Card,
    pub log: ReviewLog,
}
