//! Forgetting-curve memory model.
//!
//! Retrievability after `t` days at stability `S` follows the FSRS-4.5
//! power curve `R = (1 + t / (9 S))^(-1)`: `R(S, 0) = 1` and `R(S, S) = 0.9`,
//! which is the definition of stability. Both functions here are exact
//! algebraic inverses of each other.

use crate::error::{Result, SchedulerError};

/// Forgetting-curve factor, chosen so `R(S, S) = 0.9`.
const FACTOR: f64 = 9.0;

/// Probability of successful recall `elapsed_days` after the last review.
///
/// Negative elapsed time is clamped to zero; the result is always in
/// `(0, 1]`, strictly decreasing in elapsed time and strictly increasing
/// in stability. A non-finite or non-positive stability fails fast with
/// `InvalidState` rather than producing NaN.
pub fn retrievability(stability: f64, elapsed_days: f64) -> Result<f64> {
    check_stability(stability)?;
    let t = elapsed_days.max(0.0);
    Ok((1.0 + t / (FACTOR * stability)).powi(-1))
}

/// Days until retrievability decays to `retention`, the inverse of
/// [`retrievability`].
///
/// Turns "bring this card back at 90% retention" into a concrete day
/// count: `t = 9 S (1/R - 1)`. At the reference retention 0.9 the
/// interval equals the stability itself.
pub fn interval_for_retention(stability: f64, retention: f64) -> Result<f64> {
    check_stability(stability)?;
    if !retention.is_finite() || retention <= 0.0 || retention >= 1.0 {
        return Err(SchedulerError::InvalidInput {
            reason: format!("retention must be in (0, 1), got {retention}"),
        });
    }
    Ok(FACTOR * stability * (1.0 / retention - 1.0))
}

fn check_stability(stability: f64) -> Result<()> {
    if !stability.is_finite() || stability <= 0.0 {
        return Err(SchedulerError::InvalidState {
            reason: format!("stability must be positive and finite, got {stability}"),
        });
    }
    Ok(())
}
