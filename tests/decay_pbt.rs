//! Property-based tests for the decay curve, review scheduling, and
//! profile derivation.
//!
//! Invariants:
//! - Retention is 100 at zero elapsed time, stays in [0, 100], and never
//!   increases as time passes
//! - Review outcomes keep strength inside its configured bounds and never
//!   schedule an interval under one day
//! - Style and profile derivation are pure functions of the score map

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use zpd_core::config::{DecayParams, ReviewParams};
use zpd_core::gaps::{apply_review, predicted_retention, scheduled_interval_days};
use zpd_core::psychometric::{derive_learning_style, estimate_cognitive_profile};
use zpd_core::{Domain, DomainScore, KnowledgeState};

fn arb_strength() -> impl Strategy<Value = f64> {
    (500u64..=6000u64).prop_map(|v| v as f64 / 1000.0)
}

fn arb_days() -> impl Strategy<Value = f64> {
    (0u64..=3650u64).prop_map(|v| v as f64 / 10.0)
}

fn arb_score_map() -> impl Strategy<Value = HashMap<Domain, DomainScore>> {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    proptest::collection::vec((0usize..Domain::COUNT, 0u64..=1000u64), 0..12).prop_map(
        move |entries| {
            entries
                .into_iter()
                .map(|(idx, raw)| {
                    (
                        Domain::ALL[idx],
                        DomainScore::new(raw as f64 / 10.0, 0.9, now),
                    )
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn prop_retention_bounded_and_full_at_zero(strength in arb_strength(), days in arb_days()) {
        let decay = DecayParams::default();
        let retention = predicted_retention(days, strength, &decay);
        prop_assert!(retention >= 0.0);
        prop_assert!(retention <= 100.0);
        prop_assert_eq!(predicted_retention(0.0, strength, &decay), 100.0);
    }

    #[test]
    fn prop_retention_never_increases(strength in arb_strength(), days in arb_days()) {
        let decay = DecayParams::default();
        let earlier = predicted_retention(days, strength, &decay);
        let later = predicted_retention(days + 1.0, strength, &decay);
        prop_assert!(later <= earlier);
    }

    #[test]
    fn prop_review_outcome_stays_in_bounds(
        strength in arb_strength(),
        quality in 0u8..=5u8,
    ) {
        let decay = DecayParams::default();
        let review = ReviewParams::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut state = KnowledgeState::new("u1", "c1", now);
        state.retention_strength = strength;

        let outcome = apply_review(&mut state, quality, now, &decay, &review).unwrap();
        prop_assert!(outcome.retention_strength >= decay.min_strength);
        prop_assert!(outcome.retention_strength <= decay.max_strength);
        prop_assert!(outcome.interval_days >= 1.0);
        prop_assert!(outcome.next_review >= now);
        prop_assert_eq!(state.retention_strength, outcome.retention_strength);
    }

    #[test]
    fn prop_success_schedules_no_sooner_than_failure(strength in arb_strength()) {
        let decay = DecayParams::default();
        let review = ReviewParams::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let mut pass = KnowledgeState::new("u1", "c1", now);
        pass.retention_strength = strength;
        let mut fail = KnowledgeState::new("u1", "c1", now);
        fail.retention_strength = strength;

        let pass_outcome = apply_review(&mut pass, 5, now, &decay, &review).unwrap();
        let fail_outcome = apply_review(&mut fail, 1, now, &decay, &review).unwrap();
        prop_assert!(pass_outcome.interval_days >= fail_outcome.interval_days);
        prop_assert!(pass_outcome.retention_strength >= fail_outcome.retention_strength);
    }

    #[test]
    fn prop_interval_monotone_in_strength(strength in arb_strength()) {
        let decay = DecayParams::default();
        let review = ReviewParams::default();
        let base = scheduled_interval_days(strength, &decay, &review);
        let stronger = scheduled_interval_days(strength + 0.5, &decay, &review);
        prop_assert!(stronger >= base);
    }

    #[test]
    fn prop_profile_derivation_is_deterministic(scores in arb_score_map()) {
        let style_a = derive_learning_style(&scores).unwrap();
        let style_b = derive_learning_style(&scores).unwrap();
        prop_assert_eq!(style_a, style_b);

        let profile_a = estimate_cognitive_profile(&scores).unwrap();
        let profile_b = estimate_cognitive_profile(&scores).unwrap();
        prop_assert_eq!(profile_a, profile_b);
    }
}
