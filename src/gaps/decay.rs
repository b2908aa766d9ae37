//! Forgetting-curve decay and spaced-repetition scheduling.
//!
//! Retention decays exponentially in days since the last review; the
//! per-state `retention_strength` stretches the half-life the way an
//! SM-2 ease factor stretches intervals.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{DecayParams, ReviewParams};
use crate::error::{EngineError, Result};
use crate::types::KnowledgeState;

/// Fractional days between two instants, never negative.
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let seconds = (later - earlier).num_seconds();
    if seconds <= 0 {
        0.0
    } else {
        seconds as f64 / 86_400.0
    }
}

/// Predicted retention as a percentage, 0-100.
///
/// `retention = 100 * exp(-days / (strength * half_life))`. Strength
/// below the floor is treated as the floor so a corrupted record cannot
/// produce a degenerate curve.
pub fn predicted_retention(days_since_review: f64, strength: f64, decay: &DecayParams) -> f64 {
    if days_since_review <= 0.0 {
        return 100.0;
    }
    let strength = strength.max(decay.min_strength);
    let time_constant = strength * decay.base_half_life_days;
    100.0 * (-days_since_review / time_constant).exp()
}

/// Days until predicted retention falls to the review trigger. Clamped to
/// at least one day so items never schedule into the past.
pub fn scheduled_interval_days(strength: f64, decay: &DecayParams, review: &ReviewParams) -> f64 {
    let strength = strength.max(decay.min_strength);
    let interval =
        strength * decay.base_half_life_days * (100.0 / review.trigger_retention).ln();
    interval.max(1.0)
}

pub fn next_review_date(
    reviewed_at: DateTime<Utc>,
    strength: f64,
    decay: &DecayParams,
    review: &ReviewParams,
) -> DateTime<Utc> {
    let days = scheduled_interval_days(strength, decay, review);
    reviewed_at + Duration::seconds((days * 86_400.0) as i64)
}

/// Result of applying one review to a knowledge state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub retention_strength: f64,
    pub interval_days: f64,
    pub next_review: DateTime<Utc>,
}

/// Applies a graded review (quality 0-5, SM-2 style) to the state's
/// retention strength and returns the new schedule. Quality 3 and up is a
/// success; below that the strength collapses and the item comes back
/// tomorrow.
pub fn apply_review(
    state: &mut KnowledgeState,
    quality: u8,
    reviewed_at: DateTime<Utc>,
    decay: &DecayParams,
    review: &ReviewParams,
) -> Result<ReviewOutcome> {
    if quality > 5 {
        return Err(EngineError::InvalidInput(format!(
            "review quality must be in [0,5], got {quality}"
        )));
    }

    let strength = state.retention_strength;
    let (strength, interval_days) = if quality >= 3 {
        let gain = decay.success_gain - (5 - quality) as f64 * decay.quality_penalty;
        let strength = (strength + gain).clamp(decay.min_strength, decay.max_strength);
        (strength, scheduled_interval_days(strength, decay, review))
    } else {
        let strength = (strength * decay.failure_factor)
            .clamp(decay.min_strength, decay.max_strength);
        (strength, 1.0)
    };

    state.retention_strength = strength;
    state.last_reviewed = reviewed_at;
    state.last_accessed = reviewed_at;

    Ok(ReviewOutcome {
        retention_strength: strength,
        interval_days,
        next_review: reviewed_at + Duration::seconds((interval_days * 86_400.0) as i64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn decay() -> DecayParams {
        DecayParams::default()
    }

    fn review() -> ReviewParams {
        ReviewParams::default()
    }

    #[test]
    fn test_retention_starts_at_full() {
        assert_eq!(predicted_retention(0.0, 1.0, &decay()), 100.0);
        assert_eq!(predicted_retention(-3.0, 1.0, &decay()), 100.0);
    }

    #[test]
    fn test_retention_decays_over_time() {
        let d = decay();
        let at_10 = predicted_retention(10.0, 1.0, &d);
        let at_30 = predicted_retention(30.0, 1.0, &d);
        // One time constant leaves e^-1, three leave e^-3.
        assert!((at_10 - 36.79).abs() < 0.01);
        assert!((at_30 - 4.98).abs() < 0.01);
        assert!(at_30 < at_10);
    }

    #[test]
    fn test_stronger_memory_decays_slower() {
        let d = decay();
        let weak = predicted_retention(10.0, 1.0, &d);
        let strong = predicted_retention(10.0, 3.0, &d);
        assert!(strong > weak);
    }

    #[test]
    fn test_interval_grows_with_strength_and_never_below_a_day() {
        let d = decay();
        let r = review();
        let base = scheduled_interval_days(1.0, &d, &r);
        // ln(100/70) * 10 ~= 3.57 days at strength 1.
        assert!((base - 3.567).abs() < 0.01);
        assert!(scheduled_interval_days(2.0, &d, &r) > base);

        let mut tight = r.clone();
        tight.trigger_retention = 99.9;
        assert_eq!(scheduled_interval_days(0.5, &d, &tight), 1.0);
    }

    #[test]
    fn test_successful_review_strengthens() {
        let d = decay();
        let r = review();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut state = KnowledgeState::new("u1", "c1", now);

        let perfect = apply_review(&mut state, 5, now, &d, &r).unwrap();
        assert!((perfect.retention_strength - 1.1).abs() < 1e-9);
        assert_eq!(state.retention_strength, perfect.retention_strength);
        assert_eq!(state.last_reviewed, now);

        let mut state2 = KnowledgeState::new("u1", "c1", now);
        let shaky = apply_review(&mut state2, 3, now, &d, &r).unwrap();
        assert!(shaky.retention_strength < perfect.retention_strength);
        assert!(shaky.retention_strength > 1.0);
        assert!(shaky.interval_days < perfect.interval_days);
    }

    #[test]
    fn test_failed_review_collapses_strength() {
        let d = decay();
        let r = review();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut state = KnowledgeState::new("u1", "c1", now);
        state.retention_strength = 2.0;

        let outcome = apply_review(&mut state, 1, now, &d, &r).unwrap();
        assert!((outcome.retention_strength - 1.4).abs() < 1e-9);
        assert_eq!(outcome.interval_days, 1.0);
    }

    #[test]
    fn test_strength_stays_in_bounds() {
        let d = decay();
        let r = review();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let mut state = KnowledgeState::new("u1", "c1", now);
        state.retention_strength = d.max_strength;
        let outcome = apply_review(&mut state, 5, now, &d, &r).unwrap();
        assert_eq!(outcome.retention_strength, d.max_strength);

        let mut state = KnowledgeState::new("u1", "c1", now);
        state.retention_strength = d.min_strength;
        let outcome = apply_review(&mut state, 0, now, &d, &r).unwrap();
        assert_eq!(outcome.retention_strength, d.min_strength);
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut state = KnowledgeState::new("u1", "c1", now);
        assert!(apply_review(&mut state, 6, now, &decay(), &review()).is_err());
    }

    #[test]
    fn test_days_between_never_negative() {
        let a = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(days_between(a, b), 3.0);
        assert_eq!(days_between(b, a), 0.0);
    }
}
