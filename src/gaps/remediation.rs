//! Remediation planning: turns a gap report into an ordered study plan
//! that never schedules a concept before its in-plan prerequisites.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::gaps::detect::{GapReport, GapType, KnowledgeGap};
use crate::graph::GraphIndex;
use crate::types::EdgeStrength;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationStep {
    /// 1-based position in the plan.
    pub order: usize,
    pub concept_id: String,
    pub concept_name: String,
    pub gap_type: GapType,
    pub action: String,
    pub estimated_time_minutes: f64,
    /// Scheduling tier: lower runs earlier, all else equal.
    pub priority: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationPlan {
    pub steps: Vec<RemediationStep>,
    pub estimated_total_time_minutes: f64,
    /// The gap kind that dominates the plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_focus: Option<GapType>,
}

/// When the same concept carries several gaps, the plan addresses the most
/// consequential one: a misconception corrupts further study, a missing
/// foundation blocks it, partial weakness limits it, and forgetting merely
/// erodes it.
fn dominance(gap_type: GapType) -> u8 {
    match gap_type {
        GapType::Misconception => 0,
        GapType::Missing => 1,
        GapType::Partial => 2,
        GapType::Forgotten => 3,
    }
}

fn tier(gap: &KnowledgeGap, config: &EngineConfig) -> u8 {
    match gap.gap_type {
        GapType::Misconception => 0,
        GapType::Missing if gap.blocked_dependents >= config.gaps.blocking_high => 0,
        GapType::Missing => 1,
        GapType::Partial => 2,
        GapType::Forgotten => 3,
    }
}

fn action_for(gap: &KnowledgeGap) -> String {
    match gap.gap_type {
        GapType::Missing => format!("learn {} from scratch", gap.concept_name),
        GapType::Partial => format!("review and practice {}", gap.concept_name),
        GapType::Forgotten => format!("refresh {} with spaced review", gap.concept_name),
        GapType::Misconception => {
            let ids: Vec<&str> = gap.misconceptions.iter().map(|m| m.id.as_str()).collect();
            format!(
                "address misconception(s) in {}: {}",
                gap.concept_name,
                ids.join(", ")
            )
        }
    }
}

fn estimated_minutes(gap: &KnowledgeGap, graph: &GraphIndex, config: &EngineConfig) -> f64 {
    let full = graph
        .concept(&gap.concept_id)
        .map(|c| {
            config.pacing.minutes_per_difficulty
                * c.difficulty.absolute
                * (1.0 + c.difficulty.cognitive_load)
        })
        .unwrap_or(config.pacing.minutes_per_difficulty);
    match gap.gap_type {
        GapType::Missing => full,
        GapType::Partial => full * config.pacing.partial_factor,
        GapType::Forgotten => full * config.pacing.forgotten_factor,
        GapType::Misconception => {
            config.pacing.misconception_minutes * gap.misconceptions.len().max(1) as f64
        }
    }
}

/// Builds the ordered plan from a gap report.
///
/// Ordering is a priority-queue topological sort over the required edges
/// between in-plan concepts: among everything currently unblocked, the
/// lowest tier goes first, then the gap blocking the most dependents, then
/// lexical concept id.
pub fn build_plan(
    report: &GapReport,
    graph: &GraphIndex,
    config: &EngineConfig,
) -> Result<RemediationPlan> {
    // Dominant gap per concept.
    let mut by_concept: HashMap<&str, &KnowledgeGap> = HashMap::new();
    for gap in report.all_gaps() {
        by_concept
            .entry(gap.concept_id.as_str())
            .and_modify(|held| {
                if dominance(gap.gap_type) < dominance(held.gap_type) {
                    *held = gap;
                }
            })
            .or_insert(gap);
    }
    if by_concept.is_empty() {
        return Ok(RemediationPlan::default());
    }

    let mut indegree: HashMap<&str, usize> =
        by_concept.keys().map(|&id| (id, 0)).collect();
    for &id in by_concept.keys() {
        for edge in graph.prerequisite_edges(id) {
            if edge.strength == EdgeStrength::Required
                && by_concept.contains_key(edge.from.as_str())
            {
                if let Some(deg) = indegree.get_mut(id) {
                    *deg += 1;
                }
            }
        }
    }

    // Key: (tier, fewest-blocked last, concept id). Reverse turns the
    // max-heap into "smallest key first".
    let key = |gap: &KnowledgeGap| {
        (
            tier(gap, config),
            -(gap.blocked_dependents as i64),
            gap.concept_id.clone(),
        )
    };
    let mut ready: BinaryHeap<Reverse<(u8, i64, String)>> = indegree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .filter_map(|(&id, _)| by_concept.get(id).map(|g| Reverse(key(g))))
        .collect();

    let mut steps = Vec::with_capacity(by_concept.len());
    let mut total_minutes = 0.0;
    while let Some(Reverse((priority, _, concept_id))) = ready.pop() {
        let Some(gap) = by_concept.get(concept_id.as_str()) else { continue };
        let minutes = estimated_minutes(gap, graph, config);
        total_minutes += minutes;
        steps.push(RemediationStep {
            order: steps.len() + 1,
            concept_id: gap.concept_id.clone(),
            concept_name: gap.concept_name.clone(),
            gap_type: gap.gap_type,
            action: action_for(gap),
            estimated_time_minutes: minutes,
            priority,
        });

        for edge in graph.dependent_edges(&concept_id) {
            if edge.strength != EdgeStrength::Required {
                continue;
            }
            if let Some(deg) = indegree.get_mut(edge.to.as_str()) {
                *deg -= 1;
                if *deg == 0 {
                    if let Some(gap) = by_concept.get(edge.to.as_str()) {
                        ready.push(Reverse(key(gap)));
                    }
                }
            }
        }
    }

    if steps.len() < by_concept.len() {
        let stuck: Vec<&str> = by_concept
            .keys()
            .filter(|&&id| !steps.iter().any(|s| s.concept_id == id))
            .copied()
            .collect();
        return Err(EngineError::GraphInconsistency(format!(
            "prerequisite cycle involving: {}",
            stuck.join(", ")
        )));
    }

    let mut counts: HashMap<GapType, usize> = HashMap::new();
    for step in &steps {
        *counts.entry(step.gap_type).or_insert(0) += 1;
    }
    let priority_focus = counts
        .into_iter()
        .max_by_key(|&(gap_type, count)| (count, Reverse(dominance(gap_type))))
        .map(|(gap_type, _)| gap_type);

    Ok(RemediationPlan {
        steps,
        estimated_total_time_minutes: total_minutes,
        priority_focus,
    })
}
