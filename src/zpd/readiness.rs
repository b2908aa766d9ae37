//! Readiness scoring and zone classification.
//!
//! Readiness combines direct-prerequisite satisfaction with an
//! inverse-difficulty term normalized against the learner's own mastered
//! ceiling, then shifts by the psychometric difficulty modifier. All
//! weights and cut points live in [`crate::config::EngineConfig`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::graph::GraphIndex;
use crate::types::{ConceptNode, KnowledgeState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Zone {
    TooEasy,
    Zpd,
    TooHard,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TooEasy => "tooEasy",
            Self::Zpd => "zpd",
            Self::TooHard => "tooHard",
        }
    }
}

/// Readiness score with the factors that produced it, kept for
/// recommendation reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessBreakdown {
    /// Final readiness, 0-1.
    pub score: f64,
    /// Fraction of direct required/recommended prerequisites satisfied.
    pub prerequisites_met: f64,
    /// Concept ids of unsatisfied direct prerequisites.
    pub missing_prerequisites: Vec<String>,
    /// Inverse-difficulty term, 0-1.
    pub ease: f64,
    /// Psychometric shift actually applied (already weighted).
    pub modifier_applied: f64,
}

/// Highest absolute difficulty among concepts the learner has mastered;
/// the baseline for normalizing what "hard" means for this learner.
pub fn mastered_ceiling(
    graph: &GraphIndex,
    states: &HashMap<String, KnowledgeState>,
    config: &EngineConfig,
) -> f64 {
    let mut ceiling = config.readiness.default_ceiling;
    for (concept_id, state) in states {
        if state.mastery >= config.mastery.mastered {
            if let Some(concept) = graph.concept(concept_id) {
                ceiling = ceiling.max(concept.difficulty.absolute);
            }
        }
    }
    ceiling
}

pub fn readiness(
    concept: &ConceptNode,
    graph: &GraphIndex,
    states: &HashMap<String, KnowledgeState>,
    ceiling: f64,
    difficulty_modifier: f64,
    config: &EngineConfig,
) -> ReadinessBreakdown {
    let mut total = 0usize;
    let mut met = 0usize;
    let mut missing = Vec::new();
    for edge in graph.prerequisite_edges(&concept.concept_id) {
        if !edge.strength.counts_for_readiness() {
            continue;
        }
        total += 1;
        let mastery = states.get(&edge.from).map(|s| s.mastery).unwrap_or(0.0);
        if mastery >= config.mastery.prerequisite_met {
            met += 1;
        } else {
            missing.push(edge.from.clone());
        }
    }
    missing.sort_unstable();
    let prerequisites_met = if total == 0 {
        1.0
    } else {
        met as f64 / total as f64
    };

    let reach = ceiling + config.readiness.ceiling_reach;
    let relative = if reach > 0.0 {
        concept.difficulty.absolute / reach
    } else {
        1.0
    };
    let ease = 1.0 - relative.min(1.0);

    let modifier_applied = config.readiness.modifier * difficulty_modifier;
    let score = (config.readiness.prerequisites * prerequisites_met
        + config.readiness.ease * ease
        + modifier_applied)
        .clamp(0.0, 1.0);

    ReadinessBreakdown {
        score,
        prerequisites_met,
        missing_prerequisites: missing,
        ease,
        modifier_applied,
    }
}

/// Assigns exactly one zone. Mastery at or above the mastered threshold
/// overrides the computed readiness: already-learned concepts are too easy
/// by definition.
pub fn classify(score: f64, mastery: Option<f64>, config: &EngineConfig) -> Zone {
    if let Some(m) = mastery {
        if m >= config.mastery.mastered {
            return Zone::TooEasy;
        }
    }
    if score > config.zones.too_easy {
        Zone::TooEasy
    } else if score >= config.zones.stretch_floor {
        Zone::Zpd
    } else {
        Zone::TooHard
    }
}

/// Inside the recommendable band but below the optimal floor: challenging
/// yet reachable.
pub fn is_stretch(score: f64, config: &EngineConfig) -> bool {
    score >= config.zones.stretch_floor && score < config.zones.zpd_floor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_thresholds() {
        let config = EngineConfig::default();
        assert_eq!(classify(0.81, None, &config), Zone::TooEasy);
        assert_eq!(classify(0.8, None, &config), Zone::Zpd);
        assert_eq!(classify(0.5, None, &config), Zone::Zpd);
        assert_eq!(classify(0.3, None, &config), Zone::Zpd);
        assert_eq!(classify(0.29, None, &config), Zone::TooHard);
        assert_eq!(classify(0.0, None, &config), Zone::TooHard);
    }

    #[test]
    fn test_mastery_overrides_readiness() {
        let config = EngineConfig::default();
        assert_eq!(classify(0.1, Some(85.0), &config), Zone::TooEasy);
        assert_eq!(classify(0.1, Some(79.9), &config), Zone::TooHard);
    }

    #[test]
    fn test_stretch_band() {
        let config = EngineConfig::default();
        assert!(is_stretch(0.3, &config));
        assert!(is_stretch(0.49, &config));
        assert!(!is_stretch(0.5, &config));
        assert!(!is_stretch(0.29, &config));
    }
}
