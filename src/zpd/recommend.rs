//! Recommendation assembly: mastery-time estimates, profile matching,
//! per-concept scaffolding, and human-readable reasons.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, PacingParams, RankingWeights};
use crate::error::Result;
use crate::graph::GraphIndex;
use crate::psychometric::{
    CognitiveProfile, LearningStyle, Level, PaceRecommendation, ScaffoldType,
    ScaffoldingStrategy, StyleModality,
};
use crate::types::{ConceptDifficulty, ConceptNode};
use crate::zpd::readiness::{is_stretch, ReadinessBreakdown};

const MATCH_NEUTRAL: f64 = 0.5;
const GOOD_MATCH: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub concept_id: String,
    pub name: String,
    /// Readiness as a percentage, 0-100.
    pub readiness_score: f64,
    pub estimated_mastery_time_minutes: f64,
    /// Fit between the concept's teaching-style needs and the learner, 0-1.
    pub psychometric_match: f64,
    /// Challenging but reachable (readiness in the stretch band).
    pub stretch: bool,
    pub scaffolding_strategies: Vec<ScaffoldingStrategy>,
    pub reasons: Vec<String>,
    /// Names of direct prerequisites, in dependency order.
    pub prerequisite_chain: Vec<String>,
}

/// Minutes to mastery from difficulty, cognitive load, and learner pace.
pub fn estimated_mastery_minutes(
    difficulty: &ConceptDifficulty,
    pace: PaceRecommendation,
    pacing: &PacingParams,
) -> f64 {
    let base = pacing.minutes_per_difficulty
        * difficulty.absolute
        * (1.0 + difficulty.cognitive_load);
    let factor = match pace {
        PaceRecommendation::Slower => pacing.slower_factor,
        PaceRecommendation::Normal => 1.0,
        PaceRecommendation::Faster => pacing.faster_factor,
    };
    (base * factor).round()
}

/// Similarity between what the concept demands and how the learner learns.
/// Neutral is 0.5; evidence moves it either way.
pub fn psychometric_match(
    concept: &ConceptNode,
    style: &LearningStyle,
    cognitive: &CognitiveProfile,
) -> f64 {
    let mut score = MATCH_NEUTRAL;

    if concept.difficulty.abstractness > 0.7 {
        match cognitive.abstract_thinking {
            Level::High => score += 0.2,
            Level::Low => score -= 0.2,
            Level::Medium => {}
        }
    }
    if concept.difficulty.cognitive_load > 0.7 {
        match cognitive.working_memory_capacity {
            Level::High => score += 0.1,
            Level::Low => score -= 0.2,
            Level::Medium => {}
        }
    }

    let has_tag = |needles: &[&str]| {
        concept
            .tags
            .iter()
            .any(|t| needles.iter().any(|n| t.eq_ignore_ascii_case(n)))
    };
    let modality_bonus = |modality: StyleModality, bonus: f64| {
        if style.primary == modality || style.secondary == Some(modality) {
            bonus
        } else {
            0.0
        }
    };
    if has_tag(&["visual", "diagram", "spatial"]) {
        score += modality_bonus(StyleModality::Visual, 0.2);
    }
    if has_tag(&["hands-on", "lab", "practice"]) {
        score += modality_bonus(StyleModality::Kinesthetic, 0.2);
    }
    if has_tag(&["reading", "text", "theory"]) {
        score += modality_bonus(StyleModality::Reading, 0.15);
    }
    if has_tag(&["audio", "discussion", "lecture"]) {
        score += modality_bonus(StyleModality::Auditory, 0.15);
    }

    score.clamp(0.0, 1.0)
}

/// Subset of the learner-level strategies relevant to this concept's
/// difficulty profile. Order is preserved from the learner-level ranking.
pub fn concept_scaffolding(
    strategies: &[ScaffoldingStrategy],
    difficulty: &ConceptDifficulty,
) -> Vec<ScaffoldingStrategy> {
    strategies
        .iter()
        .filter(|s| match s.kind {
            ScaffoldType::Chunking => difficulty.cognitive_load > 0.5,
            ScaffoldType::Analogy => difficulty.abstractness > 0.5,
            ScaffoldType::Repetition => {
                difficulty.cognitive_load > 0.5 || difficulty.absolute >= 7.0
            }
            _ => true,
        })
        .cloned()
        .collect()
}

pub(crate) fn build_reasons(
    breakdown: &ReadinessBreakdown,
    psychometric_match: f64,
    config: &EngineConfig,
) -> Vec<String> {
    let mut reasons = Vec::new();
    if breakdown.missing_prerequisites.is_empty() {
        reasons.push("all direct prerequisites satisfied".to_string());
    } else {
        reasons.push(format!(
            "{:.0}% of direct prerequisites satisfied; missing: {}",
            breakdown.prerequisites_met * 100.0,
            breakdown.missing_prerequisites.join(", ")
        ));
    }
    if breakdown.ease > 0.0 {
        reasons.push("difficulty within reach of current mastery ceiling".to_string());
    }
    if psychometric_match >= GOOD_MATCH {
        reasons.push("good fit with learning profile".to_string());
    }
    if is_stretch(breakdown.score, config) {
        reasons.push("stretch goal: challenging but reachable".to_string());
    }
    reasons
}

/// Direct prerequisite names, ordered so that prerequisites of
/// prerequisites come first.
pub(crate) fn prerequisite_chain(
    concept_id: &str,
    graph: &GraphIndex,
) -> Result<Vec<String>> {
    let direct: BTreeSet<String> = graph
        .prerequisite_edges(concept_id)
        .iter()
        .map(|e| e.from.clone())
        .collect();
    if direct.is_empty() {
        return Ok(Vec::new());
    }
    let order = graph.topo_sort(&direct)?;
    Ok(order
        .into_iter()
        .filter_map(|id| graph.concept(&id).map(|c| c.name.clone()))
        .collect())
}

/// Composite ranking score: readiness dominates, profile fit breaks the
/// rest of the distance. Weights live in [`RankingWeights`].
pub(crate) fn composite_score(
    readiness: f64,
    psychometric_match: f64,
    weights: &RankingWeights,
) -> f64 {
    weights.readiness * readiness + weights.fit * psychometric_match
}
