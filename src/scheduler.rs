//! FSRS scheduler: state machine and memory update rules.
//!
//! The scheduler is a pure transform `(Card, Rating, now) -> Card'`. It
//! asks the memory model for the card's current retrievability, applies
//! the rating-specific stability/difficulty update, then sizes and
//! (optionally) fuzzes the next interval. `now` is always injected by the
//! caller; the engine never reads a clock.

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, SchedulerError};
use crate::memory;
use crate::parameters::{Parameters, D_MAX, D_MIN, S_MIN};
use crate::types::{Card, Rating, ReviewLog, ReviewOutcome, State};

const SECONDS_PER_DAY: f64 = 86_400.0;
const MINUTES_PER_DAY: f64 = 1_440.0;

/// Fuzz tiers: (range start in days, range end, fraction of the interval).
const FUZZ_RANGES: [(f64, f64, f64); 3] = [
    (2.5, 7.0, 0.15),
    (7.0, 20.0, 0.1),
    (20.0, f64::INFINITY, 0.05),
];

/// Intervals shorter than this many days are never fuzzed.
const FUZZ_THRESHOLD: f64 = 2.5;

/// FSRS scheduler over a fixed parameter set.
#[derive(Debug, Clone)]
pub struct Scheduler {
    params: Parameters,
}

impl Scheduler {
    /// Build a scheduler, validating the configuration up front.
    pub fn new(params: Parameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Empty scheduling state for a card that has never been rated.
    pub fn initial_card() -> Card {
        Card::new()
    }

    /// Current recall probability for a previously-reviewed card.
    pub fn current_retrievability(&self, card: &Card, now: DateTime<Utc>) -> Result<f64> {
        self.validate_card(card)?;
        match (card.stability, card.last_review_at) {
            (Some(stability), Some(last_review_at)) => {
                let elapsed = elapsed_days(last_review_at, now)?;
                memory::retrievability(stability, elapsed)
            }
            _ => Err(SchedulerError::InvalidState {
                reason: "card has never been reviewed".to_string(),
            }),
        }
    }

    /// Apply one grading event and return the updated card plus an audit
    /// log record. The input card is not mutated; the caller persists the
    /// returned value.
    pub fn review(&self, card: &Card, rating: Rating, now: DateTime<Utc>) -> Result<ReviewOutcome> {
        self.validate_card(card)?;

        let next = next_state(card.state, rating);

        let (new_stability, new_difficulty, elapsed, lapsed) =
            match (card.state, card.stability, card.difficulty, card.last_review_at) {
                (State::New, ..) => {
                    // First rating: memory state comes straight from the
                    // rating-specific base weights.
                    let stability = self.initial_stability(rating);
                    let difficulty = self.initial_difficulty(rating);
                    (stability, difficulty, 0.0, false)
                }
                (_, Some(stability), Some(difficulty), Some(last_review_at)) => {
                    let elapsed = elapsed_days(last_review_at, now)?;
                    let retrievability = memory::retrievability(stability, elapsed)?;
                    let new_difficulty = self.next_difficulty(difficulty, rating);
                    let (new_stability, lapsed) = if rating == Rating::Again {
                        let lapsed = matches!(card.state, State::Review | State::Relearning);
                        (
                            self.next_stability_forget(stability, difficulty, retrievability),
                            lapsed,
                        )
                    } else {
                        (
                            self.next_stability_recall(stability, difficulty, retrievability, rating),
                            false,
                        )
                    };
                    (new_stability, new_difficulty, elapsed, lapsed)
                }
                _ => {
                    return Err(SchedulerError::InvalidState {
                        reason: "rated card is missing stability, difficulty, or last review"
                            .to_string(),
                    });
                }
            };

        let interval_days = if next == State::Review {
            self.graduated_interval(new_stability)?
        } else {
            self.learning_step(next, rating)
        };

        let due_at = now + Duration::seconds((interval_days * SECONDS_PER_DAY).round() as i64);
        let elapsed_whole = elapsed.floor() as u32;

        tracing::debug!(
            rating = rating.to_value(),
            previous_state = ?card.state,
            next_state = ?next,
            stability = new_stability,
            difficulty = new_difficulty,
            interval_days,
            "scheduled card"
        );

        Ok(ReviewOutcome {
            card: Card {
                state: next,
                stability: Some(new_stability),
                difficulty: Some(new_difficulty),
                reps: card.reps + 1,
                lapses: card.lapses + u32::from(lapsed),
                last_review_at: Some(now),
                due_at: Some(due_at),
                scheduled_days: interval_days.round() as u32,
                elapsed_days: elapsed_whole,
            },
            log: ReviewLog {
                rating,
                previous_state: card.state,
                previous_stability: card.stability,
                previous_difficulty: card.difficulty,
                elapsed_days: elapsed_whole,
                reviewed_at: now,
            },
        })
    }

    /// Check stored-card invariants before touching any formula. Violations
    /// are surfaced as `InvalidState`, never silently repaired.
    fn validate_card(&self, card: &Card) -> Result<()> {
        match card.state {
            State::New => {
                if card.stability.is_some()
                    || card.difficulty.is_some()
                    || card.last_review_at.is_some()
                {
                    return Err(SchedulerError::InvalidState {
                        reason: "new card already carries memory state".to_string(),
                    });
                }
                if card.reps != 0 {
                    return Err(SchedulerError::InvalidState {
                        reason: format!("new card has nonzero reps ({})", card.reps),
                    });
                }
            }
            State::Learning | State::Review | State::Relearning => {
                let stability = card.stability.ok_or_else(|| SchedulerError::InvalidState {
                    reason: "rated card is missing stability".to_string(),
                })?;
                if !stability.is_finite() || stability <= 0.0 {
                    return Err(SchedulerError::InvalidState {
                        reason: format!("stability must be positive and finite, got {stability}"),
                    });
                }
                let difficulty = card.difficulty.ok_or_else(|| SchedulerError::InvalidState {
                    reason: "rated card is missing difficulty".to_string(),
                })?;
                if !difficulty.is_finite() || !(D_MIN..=D_MAX).contains(&difficulty) {
                    return Err(SchedulerError::InvalidState {
                        reason: format!(
                            "difficulty must be within [{D_MIN}, {D_MAX}], got {difficulty}"
                        ),
                    });
                }
                if card.last_review_at.is_none() {
                    return Err(SchedulerError::InvalidState {
                        reason: "rated card is missing last_review_at".to_string(),
                    });
                }
            }
        }
        if let (Some(last), Some(due)) = (card.last_review_at, card.due_at) {
            if due < last {
                return Err(SchedulerError::InvalidState {
                    reason: "due_at is earlier than last_review_at".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Initial stability for a new card: S0(G) = w[G-1].
    fn initial_stability(&self, rating: Rating) -> f64 {
        let w = &self.params.weights;
        w[(rating.to_value() - 1) as usize].max(S_MIN)
    }

    /// Initial difficulty for a new card: D0(G) = w[4] - w[5] * (G - 3).
    fn initial_difficulty(&self, rating: Rating) -> f64 {
        let w = &self.params.weights;
        let g = rating.to_value() as f64;
        (w[4] - w[5] * (g - 3.0)).clamp(D_MIN, D_MAX)
    }

    /// Difficulty update: mean reversion toward D0(G), then a rating-driven
    /// nudge. Easier on Easy, harder on Hard/Again, unchanged on Good.
    fn next_difficulty(&self, difficulty: f64, rating: Rating) -> f64 {
        let w = &self.params.weights;
        let g = rating.to_value() as f64;
        let reverted = w[7] * self.initial_difficulty(rating) + (1.0 - w[7]) * difficulty;
        (reverted - w[6] * (g - 3.0)).clamp(D_MIN, D_MAX)
    }

    /// Stability after a successful recall:
    /// S' = S * (1 + e^w[8] * (11 - D) * S^-w[9] * (e^(w[10](1-R)) - 1) * penalty * bonus)
    ///
    /// The growth term shrinks as stability rises and grows as the recall
    /// was more surprising (lower R at the moment of success).
    fn next_stability_recall(
        &self,
        stability: f64,
        difficulty: f64,
        retrievability: f64,
        rating: Rating,
    ) -> f64 {
        let w = &self.params.weights;
        let difficulty_factor = 11.0 - difficulty;
        let stability_decay = stability.powf(-w[9]);
        let surprise = (w[10] * (1.0 - retrievability)).exp() - 1.0;
        let modifier = match rating {
            Rating::Hard => w[15],
            Rating::Easy => w[16],
            _ => 1.0,
        };
        let growth = 1.0 + w[8].exp() * difficulty_factor * stability_decay * surprise * modifier;
        (stability * growth).clamp(S_MIN, self.params.maximum_interval as f64)
    }

    /// Stability after a lapse:
    /// S' = w[11] * D^-w[12] * ((S+1)^w[13] - 1) * e^(w[14](1-R))
    ///
    /// Forgetting a highly-retrievable memory costs more stability than
    /// forgetting a shaky one, and a lapse never leaves the card stronger
    /// than it was.
    fn next_stability_forget(&self, stability: f64, difficulty: f64, retrievability: f64) -> f64 {
        let w = &self.params.weights;
        let difficulty_factor = difficulty.powf(-w[12]);
        let stability_factor = (stability + 1.0).powf(w[13]) - 1.0;
        let retrievability_factor = (w[14] * (1.0 - retrievability)).exp();
        let new_stability = w[11] * difficulty_factor * stability_factor * retrievability_factor;
        new_stability.min(stability).max(S_MIN)
    }

    /// Long-term interval for a card graduating to Review: invert the
    /// forgetting curve at the requested retention, clamp to
    /// [1, maximum_interval], then fuzz if enabled.
    fn graduated_interval(&self, stability: f64) -> Result<f64> {
        let raw = memory::interval_for_retention(stability, self.params.requested_retention)?;
        let capped = raw.round().clamp(1.0, self.params.maximum_interval as f64);
        Ok(if self.params.enable_fuzz {
            self.fuzzed(capped)
        } else {
            capped
        })
    }

    /// Short fixed step for cards staying in Learning/Relearning: Again
    /// restarts at the first step, anything else takes the last.
    fn learning_step(&self, next: State, rating: Rating) -> f64 {
        let steps = if next == State::Relearning {
            &self.params.relearning_steps
        } else {
            &self.params.learning_steps
        };
        let minutes = if rating == Rating::Again {
            steps[0]
        } else {
            steps[steps.len() - 1]
        };
        minutes / MINUTES_PER_DAY
    }

    /// Perturb a graduated interval within the tiered fuzz window so cards
    /// scheduled together do not all resurface on the same day. The result
    /// never leaves [1, maximum_interval].
    fn fuzzed(&self, interval: f64) -> f64 {
        if interval < FUZZ_THRESHOLD {
            return interval;
        }
        let delta = fuzz_delta(interval);
        let mut rng = match self.params.fuzz_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let fuzzed = rng.gen_range(interval - delta..=interval + delta);
        fuzzed.round().clamp(1.0, self.params.maximum_interval as f64)
    }
}

/// Transition table: current state x rating -> next state.
fn next_state(state: State, rating: Rating) -> State {
    match (state, rating) {
        (State::New, Rating::Again | Rating::Hard | Rating::Good) => State::Learning,
        (State::New, Rating::Easy) => State::Review,
        (State::Learning, Rating::Again | Rating::Hard) => State::Learning,
        (State::Learning, Rating::Good | Rating::Easy) => State::Review,
        (State::Review, Rating::Again) => State::Relearning,
        (State::Review, Rating::Hard | Rating::Good | Rating::Easy) => State::Review,
        (State::Relearning, Rating::Again | Rating::Hard) => State::Relearning,
        (State::Relearning, Rating::Good | Rating::Easy) => State::Review,
    }
}

/// Half-width of the fuzz window: one day plus a tiered fraction of the
/// interval.
fn fuzz_delta(interval: f64) -> f64 {
    let mut delta = 1.0;
    for (start, end, factor) in FUZZ_RANGES {
        delta += factor * (interval.min(end) - start).max(0.0);
    }
    delta
}

/// Fractional days between the previous review and now. Grading events
/// must not run backwards in time.
fn elapsed_days(last_review_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<f64> {
    let seconds = (now - last_review_at).num_seconds();
    if seconds < 0 {
        return Err(SchedulerError::InvalidInput {
            reason: format!("now ({now}) is earlier than last_review_at ({last_review_at})"),
        });
    }
    Ok(seconds as f64 / SECONDS_PER_DAY)
}
