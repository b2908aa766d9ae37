//! Engine configuration.
//!
//! Every threshold the zone, gap, decay, and review logic depends on lives
//! here, so tests can override them without touching algorithm code.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneThresholds {
    /// Readiness above this is already masterable (too easy).
    pub too_easy: f64,
    /// Readiness at or above this (and at most `too_easy`) is optimal.
    pub zpd_floor: f64,
    /// Readiness at or above this is a stretch: hard but still reachable.
    pub stretch_floor: f64,
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            too_easy: 0.8,
            zpd_floor: 0.5,
            stretch_floor: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessWeights {
    /// Weight of the fraction of satisfied direct prerequisites.
    pub prerequisites: f64,
    /// Weight of the inverse-difficulty term.
    pub ease: f64,
    /// Scale applied to the psychometric difficulty modifier.
    pub modifier: f64,
    /// Headroom added to the learner's mastered-difficulty ceiling when
    /// normalizing concept difficulty.
    pub ceiling_reach: f64,
    /// Ceiling assumed for a learner with no mastered concepts yet.
    pub default_ceiling: f64,
}

impl Default for ReadinessWeights {
    fn default() -> Self {
        Self {
            prerequisites: 0.6,
            ease: 0.4,
            modifier: 0.2,
            ceiling_reach: 2.0,
            default_ceiling: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingWeights {
    /// Weight of readiness in the recommendation ordering.
    pub readiness: f64,
    /// Weight of the psychometric match.
    pub fit: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            readiness: 0.6,
            fit: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryThresholds {
    /// Mastery at which a prerequisite counts as satisfied.
    pub prerequisite_met: f64,
    /// Mastery at which a concept is considered mastered (forces too-easy).
    pub mastered: f64,
    /// Minimum mastery for a concept to enter the review queue.
    pub review_floor: f64,
}

impl Default for MasteryThresholds {
    fn default() -> Self {
        Self {
            prerequisite_met: 70.0,
            mastered: 80.0,
            review_floor: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecayParams {
    /// Time constant of the forgetting curve at retention strength 1.0.
    pub base_half_life_days: f64,
    pub min_strength: f64,
    pub max_strength: f64,
    /// Strength gained by a quality-5 review.
    pub success_gain: f64,
    /// Strength gain lost per quality point below 5.
    pub quality_penalty: f64,
    /// Multiplier applied to strength on a failed review.
    pub failure_factor: f64,
}

impl Default for DecayParams {
    fn default() -> Self {
        Self {
            base_half_life_days: 10.0,
            min_strength: 0.5,
            max_strength: 6.0,
            success_gain: 0.1,
            quality_penalty: 0.04,
            failure_factor: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewParams {
    /// Predicted retention (percent) below which a review is due.
    pub trigger_retention: f64,
    /// Retention (percent) below which a queue item is urgent.
    pub urgent_retention: f64,
    /// Retention (percent) below which a queue item is at least normal.
    pub normal_retention: f64,
    /// Days overdue past which a queue item is urgent.
    pub urgent_overdue_days: f64,
}

impl Default for ReviewParams {
    fn default() -> Self {
        Self {
            trigger_retention: 70.0,
            urgent_retention: 40.0,
            normal_retention: 60.0,
            urgent_overdue_days: 7.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapThresholds {
    /// Mastery below this is a partial gap.
    pub partial_mastery: f64,
    /// Mastery below this makes a partial gap high severity.
    pub partial_high: f64,
    /// Predicted retention (percent) below this marks a learned concept
    /// as forgotten.
    pub forgotten_retention: f64,
    /// Retention below this makes a forgotten gap high severity.
    pub forgotten_high_retention: f64,
    /// Days since review past which a forgotten gap is high severity.
    pub forgotten_high_days: f64,
    /// Number of blocked dependents at which a missing gap jumps to the
    /// top remediation tier.
    pub blocking_high: usize,
}

impl Default for GapThresholds {
    fn default() -> Self {
        Self {
            partial_mastery: 70.0,
            partial_high: 50.0,
            forgotten_retention: 70.0,
            forgotten_high_retention: 30.0,
            forgotten_high_days: 30.0,
            blocking_high: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalLimits {
    /// Hard cap on BFS depth regardless of caller options.
    pub max_depth: usize,
    /// Hard cap on nodes visited in one traversal.
    pub max_nodes: usize,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingParams {
    /// Minutes of study per point of absolute difficulty.
    pub minutes_per_difficulty: f64,
    pub slower_factor: f64,
    pub faster_factor: f64,
    /// Fraction of full mastery time for remediating a partial gap.
    pub partial_factor: f64,
    /// Fraction of full mastery time for refreshing a forgotten concept.
    pub forgotten_factor: f64,
    /// Base minutes for addressing one misconception.
    pub misconception_minutes: f64,
}

impl Default for PacingParams {
    fn default() -> Self {
        Self {
            minutes_per_difficulty: 12.0,
            slower_factor: 1.3,
            faster_factor: 0.8,
            partial_factor: 0.5,
            forgotten_factor: 0.35,
            misconception_minutes: 20.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub zones: ZoneThresholds,
    pub readiness: ReadinessWeights,
    pub ranking: RankingWeights,
    pub mastery: MasteryThresholds,
    pub decay: DecayParams,
    pub review: ReviewParams,
    pub gaps: GapThresholds,
    pub traversal: TraversalLimits,
    pub pacing: PacingParams,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ZPD_BASE_HALF_LIFE_DAYS") {
            if let Ok(parsed) = val.parse::<f64>() {
                if parsed > 0.0 {
                    config.decay.base_half_life_days = parsed;
                }
            }
        }
        if let Ok(val) = std::env::var("ZPD_TRIGGER_RETENTION") {
            if let Ok(parsed) = val.parse::<f64>() {
                if (0.0..=100.0).contains(&parsed) {
                    config.review.trigger_retention = parsed;
                }
            }
        }
        if let Ok(val) = std::env::var("ZPD_MAX_TRAVERSAL_NODES") {
            if let Ok(parsed) = val.parse::<usize>() {
                config.traversal.max_nodes = parsed;
            }
        }

        config
    }
}
