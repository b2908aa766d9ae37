//! ZPD engine: partitions a learner's concepts into too-easy / zpd /
//! too-hard, ranks recommendations for the optimal band, and derives a
//! prerequisite-valid suggested learning path.

pub mod readiness;
pub mod recommend;

use std::collections::BTreeSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::graph::GraphIndex;
use crate::psychometric::{
    derive_adjustments, derive_learning_style, estimate_cognitive_profile,
    PsychometricAdjustments,
};
use crate::store::Storage;
use crate::types::EdgeStrength;

pub use readiness::{classify, is_stretch, mastered_ceiling, ReadinessBreakdown, Zone};
pub use recommend::{
    concept_scaffolding, estimated_mastery_minutes, psychometric_match, Recommendation,
};

/// One concept's standing inside a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneEntry {
    pub concept_id: String,
    pub name: String,
    /// Readiness as a percentage, 0-100.
    pub readiness: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mastery: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZpdAnalysis {
    pub too_easy: Vec<ZoneEntry>,
    pub zpd: Vec<ZoneEntry>,
    pub too_hard: Vec<ZoneEntry>,
    pub recommendations: Vec<Recommendation>,
    pub psychometric_adjustments: PsychometricAdjustments,
    /// Topological order over the zpd and too-hard concepts.
    pub suggested_path: Vec<String>,
    pub computation_time_ms: u64,
}

pub struct ZpdEngine<'a> {
    storage: &'a dyn Storage,
    config: EngineConfig,
}

impl<'a> ZpdEngine<'a> {
    pub fn new(storage: &'a dyn Storage, config: EngineConfig) -> Self {
        Self { storage, config }
    }

    /// Full ZPD computation for one learner. `limit` caps the number of
    /// recommendations returned, not the zone partition.
    pub fn analyze(&self, user_id: &str, limit: Option<usize>) -> Result<ZpdAnalysis> {
        let started = Instant::now();

        let learner = self
            .storage
            .get_learner(user_id)
            .ok_or_else(|| EngineError::NotFound(format!("learner {user_id}")))?;

        let adjustments = derive_adjustments(&learner)?;
        let style = derive_learning_style(&learner.psychometric_scores)?;
        let cognitive = estimate_cognitive_profile(&learner.psychometric_scores)?;

        let graph = GraphIndex::build(self.storage);
        if graph.is_empty() {
            return Ok(ZpdAnalysis {
                too_easy: vec![],
                zpd: vec![],
                too_hard: vec![],
                recommendations: vec![],
                psychometric_adjustments: adjustments,
                suggested_path: vec![],
                computation_time_ms: started.elapsed().as_millis() as u64,
            });
        }
        graph.detect_cycle()?;

        let states = graph.index_states(self.storage.knowledge_states(user_id));
        let ceiling = mastered_ceiling(&graph, &states, &self.config);

        let mut too_easy = Vec::new();
        let mut zpd = Vec::new();
        let mut too_hard = Vec::new();
        // (concept id, breakdown) for everything in the recommendable band.
        let mut candidates = Vec::new();

        for concept_id in graph.concept_ids_sorted() {
            let Some(concept) = graph.concept(concept_id) else { continue };
            let breakdown = readiness::readiness(
                concept,
                &graph,
                &states,
                ceiling,
                adjustments.difficulty_modifier,
                &self.config,
            );
            let mastery = states.get(concept_id).map(|s| s.mastery);
            let zone = classify(breakdown.score, mastery, &self.config);
            let entry = ZoneEntry {
                concept_id: concept_id.to_string(),
                name: concept.name.clone(),
                readiness: breakdown.score * 100.0,
                mastery,
            };
            match zone {
                Zone::TooEasy => too_easy.push(entry),
                Zone::TooHard => too_hard.push(entry),
                Zone::Zpd => {
                    zpd.push(entry);
                    candidates.push((concept_id.to_string(), breakdown));
                }
            }
        }

        // Sortable rows: (composite score, difficulty, recommendation).
        let mut rows = Vec::with_capacity(candidates.len());
        for (concept_id, breakdown) in candidates {
            let Some(concept) = graph.concept(&concept_id) else { continue };
            let fit = psychometric_match(concept, &style, &cognitive);
            let recommendation = Recommendation {
                concept_id: concept_id.clone(),
                name: concept.name.clone(),
                readiness_score: breakdown.score * 100.0,
                estimated_mastery_time_minutes: estimated_mastery_minutes(
                    &concept.difficulty,
                    adjustments.pace_recommendation,
                    &self.config.pacing,
                ),
                psychometric_match: fit,
                stretch: is_stretch(breakdown.score, &self.config),
                scaffolding_strategies: concept_scaffolding(
                    &adjustments.scaffolding_strategies,
                    &concept.difficulty,
                ),
                reasons: recommend::build_reasons(&breakdown, fit, &self.config),
                prerequisite_chain: recommend::prerequisite_chain(&concept_id, &graph)?,
            };
            rows.push((
                recommend::composite_score(breakdown.score, fit, &self.config.ranking),
                concept.difficulty.absolute,
                recommendation,
            ));
        }
        rows.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.2.concept_id.cmp(&b.2.concept_id))
        });
        let mut recommendations: Vec<Recommendation> =
            rows.into_iter().map(|(_, _, r)| r).collect();
        if let Some(limit) = limit {
            recommendations.truncate(limit);
        }

        let mut path_subset: BTreeSet<String> = zpd
            .iter()
            .chain(too_hard.iter())
            .map(|e| e.concept_id.clone())
            .collect();
        // Pull in unsatisfied required prerequisites so the path starts
        // from what actually has to be learned first.
        let mut pending: Vec<String> = path_subset.iter().cloned().collect();
        while let Some(id) = pending.pop() {
            for edge in graph.prerequisite_edges(&id) {
                if edge.strength != EdgeStrength::Required {
                    continue;
                }
                let satisfied = states
                    .get(&edge.from)
                    .map(|s| s.mastery >= self.config.mastery.prerequisite_met)
                    .unwrap_or(false);
                if !satisfied && path_subset.insert(edge.from.clone()) {
                    pending.push(edge.from.clone());
                }
            }
        }
        let suggested_path = graph.topo_sort(&path_subset)?;

        let computation_time_ms = started.elapsed().as_millis() as u64;
        debug!(
            user_id,
            too_easy = too_easy.len(),
            zpd = zpd.len(),
            too_hard = too_hard.len(),
            computation_time_ms,
            "zpd analysis complete"
        );

        Ok(ZpdAnalysis {
            too_easy,
            zpd,
            too_hard,
            recommendations,
            psychometric_adjustments: adjustments,
            suggested_path,
            computation_time_ms,
        })
    }
}
