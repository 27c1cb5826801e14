//! Scheduler configuration: the FSRS weight vector and interval policy.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

/// Arity of the FSRS-4.5 weight vector.
pub const WEIGHT_COUNT: usize = 17;

/// Difficulty bounds. Every update clamps back into this range.
pub(crate) const D_MIN: f64 = 1.0;
pub(crate) const D_MAX: f64 = 10.0;

/// Floor for stability so the forgetting curve stays well-defined.
pub(crate) const S_MIN: f64 = 0.1;

/// Scheduler parameters.
///
/// Supplied once at construction and never mutated by a scheduling call.
/// The default weight vector is the published FSRS-4.5 parameter set;
/// callers with fitted per-user weights substitute their own via
/// [`Parameters::with_weights`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// FSRS-4.5 weights:
    /// w[0-3] initial stability for Again/Hard/Good/Easy,
    /// w[4-5] initial difficulty base and modifier,
    /// w[6-7] difficulty decay and mean reversion,
    /// w[8-10] stability growth on recall,
    /// w[11-14] stability after a lapse,
    /// w[15] hard penalty, w[16] easy bonus.
    pub weights: [f64; WEIGHT_COUNT],
    /// Target recall probability used to size intervals, in (0, 1).
    pub requested_retention: f64,
    /// Hard cap on any scheduled interval, in days.
    pub maximum_interval: u32,
    /// Learning steps in minutes, applied while a card is in Learning.
    pub learning_steps: Vec<f64>,
    /// Relearning steps in minutes, applied after a lapse.
    pub relearning_steps: Vec<f64>,
    /// Randomize graduated intervals so cards added together spread out.
    pub enable_fuzz: bool,
    /// Seed for the fuzz RNG. `Some` makes scheduling fully deterministic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzz_seed: Option<u64>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            weights: [
                0.4, 0.6, 2.4, 5.8, // w[0-3]: initial stability per rating
                4.93, 0.94, // w[4-5]: initial difficulty
                0.86, 0.01, // w[6-7]: difficulty decay, mean reversion
                1.49, 0.14, 0.94, // w[8-10]: recall stability growth
                2.18, 0.05, 0.34, 1.26, // w[11-14]: lapse stability
                0.29, // w[15]: hard penalty
                2.61, // w[16]: easy bonus
            ],
            requested_retention: 0.9,
            maximum_interval: 36500,
            learning_steps: vec![1.0, 10.0],
            relearning_steps: vec![10.0],
            enable_fuzz: false,
            fuzz_seed: None,
        }
    }
}

impl Parameters {
    /// Defaults with a caller-supplied weight vector.
    ///
    /// Rejects a slice whose arity differs from [`WEIGHT_COUNT`].
    pub fn with_weights(weights: &[f64]) -> Result<Self> {
        if weights.len() != WEIGHT_COUNT {
            return Err(SchedulerError::InvalidConfiguration {
                reason: format!(
                    "expected {WEIGHT_COUNT} weights, got {}",
                    weights.len()
                ),
            });
        }
        let mut params = Self::default();
        params.weights.copy_from_slice(weights);
        params.validate()?;
        Ok(params)
    }

    /// Check every configuration invariant. Called by `Scheduler::new`
    /// before any scheduling, so a bad configuration is never partially
    /// applied.
    pub fn validate(&self) -> Result<()> {
        for (i, w) in self.weights.iter().enumerate() {
            if !w.is_finite() {
                return Err(SchedulerError::InvalidConfiguration {
                    reason: format!("weight w[{i}] is not finite: {w}"),
                });
            }
        }
        if !self.requested_retention.is_finite()
            || self.requested_retention <= 0.0
            || self.requested_retention >= 1.0
        {
            return Err(SchedulerError::InvalidConfiguration {
                reason: format!(
                    "requested_retention must be in (0, 1), got {}",
                    self.requested_retention
                ),
            });
        }
        if self.maximum_interval == 0 {
            return Err(SchedulerError::InvalidConfiguration {
                reason: "maximum_interval must be at least 1 day".to_string(),
            });
        }
        Self::validate_steps("learning_steps", &self.learning_steps)?;
        Self::validate_steps("relearning_steps", &self.relearning_steps)?;
        Ok(())
    }

    fn validate_steps(name: &str, steps: &[f64]) -> Result<()> {
        if steps.is_empty() {
            return Err(SchedulerError::InvalidConfiguration {
                reason: format!("{name} must not be empty"),
            });
        }
        for step in steps {
            if !step.is_finite() || *step <= 0.0 {
                return Err(SchedulerError::InvalidConfiguration {
                    reason: format!("{name} entries must be positive minutes, got {step}"),
                });
            }
        }
        Ok(())
    }
}
