//! Knowledge-gap detection.
//!
//! Four gap kinds: concepts never touched whose prerequisites are ready
//! (missing), concepts started but below proficiency (partial), concepts
//! learned but decayed below the retention floor (forgotten), and concepts
//! carrying recorded misconceptions. A concept can surface as both a
//! mastery gap and a misconception at the same time.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::gaps::decay::{days_between, predicted_retention};
use crate::graph::GraphIndex;
use crate::types::{KnowledgeState, Misconception, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapType {
    Missing,
    Partial,
    Forgotten,
    Misconception,
}

impl GapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Partial => "partial",
            Self::Forgotten => "forgotten",
            Self::Misconception => "misconception",
        }
    }
}

/// Restricts which concepts a gap analysis considers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "values")]
pub enum GapScope {
    All,
    Domains(Vec<String>),
    Concepts(Vec<String>),
}

impl GapScope {
    fn includes(&self, concept_id: &str, domain: &str) -> bool {
        match self {
            Self::All => true,
            Self::Domains(domains) => domains.iter().any(|d| d == domain),
            Self::Concepts(ids) => ids.iter().any(|id| id == concept_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeGap {
    pub concept_id: String,
    pub concept_name: String,
    pub gap_type: GapType,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mastery: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_retention: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_review: Option<f64>,
    /// Dependents whose prerequisite chain this gap blocks.
    pub blocked_dependents: usize,
    /// Concept ids of those blocked dependents, lexically ordered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_dependent_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub misconceptions: Vec<Misconception>,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapSummary {
    pub total: usize,
    /// High-severity gaps.
    pub critical: usize,
    pub by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    pub missing: Vec<KnowledgeGap>,
    pub partial: Vec<KnowledgeGap>,
    pub forgotten: Vec<KnowledgeGap>,
    pub misconceptions: Vec<KnowledgeGap>,
    pub summary: GapSummary,
}

impl GapReport {
    pub fn all_gaps(&self) -> impl Iterator<Item = &KnowledgeGap> {
        self.missing
            .iter()
            .chain(self.partial.iter())
            .chain(self.forgotten.iter())
            .chain(self.misconceptions.iter())
    }
}

/// Runs gap detection over every in-scope concept at instant `now`.
pub fn detect(
    graph: &GraphIndex,
    states: &HashMap<String, KnowledgeState>,
    scope: &GapScope,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> GapReport {
    let mut report = GapReport::default();
    // A learner with no history at all: every in-scope concept is a
    // missing gap, prerequisites included, so the report shows the whole
    // frontier instead of an empty list.
    let no_states = states.is_empty();

    for concept_id in graph.concept_ids_sorted() {
        let Some(concept) = graph.concept(concept_id) else { continue };
        if !scope.includes(concept_id, &concept.domain) {
            continue;
        }
        let blocked_ids = blocked_dependent_ids(graph, concept_id);
        let blocked = blocked_ids.len();

        match states.get(concept_id) {
            None => {
                if no_states || prerequisites_ready(graph, states, concept_id, config) {
                    report.missing.push(KnowledgeGap {
                        concept_id: concept_id.to_string(),
                        concept_name: concept.name.clone(),
                        gap_type: GapType::Missing,
                        severity: Severity::High,
                        mastery: None,
                        predicted_retention: None,
                        days_since_review: None,
                        blocked_dependents: blocked,
                        blocked_dependent_ids: blocked_ids.clone(),
                        misconceptions: vec![],
                        detail: format!(
                            "never studied; prerequisites ready, blocks {blocked} dependent(s)"
                        ),
                    });
                }
            }
            Some(state) => {
                if state.mastery < config.gaps.partial_mastery {
                    let severity = if state.mastery < config.gaps.partial_high {
                        Severity::High
                    } else {
                        Severity::Medium
                    };
                    report.partial.push(KnowledgeGap {
                        concept_id: concept_id.to_string(),
                        concept_name: concept.name.clone(),
                        gap_type: GapType::Partial,
                        severity,
                        mastery: Some(state.mastery),
                        predicted_retention: None,
                        days_since_review: None,
                        blocked_dependents: blocked,
                        blocked_dependent_ids: blocked_ids.clone(),
                        misconceptions: vec![],
                        detail: format!(
                            "mastery {:.0}% is below the {:.0}% proficiency bar",
                            state.mastery, config.gaps.partial_mastery
                        ),
                    });
                } else {
                    let days = days_between(state.last_reviewed, now);
                    let retention =
                        predicted_retention(days, state.retention_strength, &config.decay);
                    if retention < config.gaps.forgotten_retention {
                        let severity = if retention < config.gaps.forgotten_high_retention
                            || days > config.gaps.forgotten_high_days
                        {
                            Severity::High
                        } else {
                            Severity::Medium
                        };
                        report.forgotten.push(KnowledgeGap {
                            concept_id: concept_id.to_string(),
                            concept_name: concept.name.clone(),
                            gap_type: GapType::Forgotten,
                            severity,
                            mastery: Some(state.mastery),
                            predicted_retention: Some(retention),
                            days_since_review: Some(days),
                            blocked_dependents: blocked,
                            blocked_dependent_ids: blocked_ids.clone(),
                            misconceptions: vec![],
                            detail: format!(
                                "learned to {:.0}% but predicted retention is {:.0}% after {:.0} day(s)",
                                state.mastery, retention, days
                            ),
                        });
                    }
                }

                // Misconceptions are orthogonal to mastery level and always
                // critical: they corrupt everything built on top.
                if !state.misconceptions.is_empty() {
                    report.misconceptions.push(KnowledgeGap {
                        concept_id: concept_id.to_string(),
                        concept_name: concept.name.clone(),
                        gap_type: GapType::Misconception,
                        severity: Severity::High,
                        mastery: Some(state.mastery),
                        predicted_retention: None,
                        days_since_review: None,
                        blocked_dependents: blocked,
                        blocked_dependent_ids: blocked_ids.clone(),
                        misconceptions: state.misconceptions.clone(),
                        detail: format!(
                            "{} recorded misconception(s)",
                            state.misconceptions.len()
                        ),
                    });
                }
            }
        }
    }

    report.summary = summarize(&report);
    report
}

fn summarize(report: &GapReport) -> GapSummary {
    let mut by_type = BTreeMap::new();
    let mut total = 0;
    let mut critical = 0;
    for gap in report.all_gaps() {
        total += 1;
        if gap.severity == Severity::High {
            critical += 1;
        }
        *by_type.entry(gap.gap_type.as_str().to_string()).or_insert(0) += 1;
    }
    GapSummary {
        total,
        critical,
        by_type,
    }
}

/// True when every direct required prerequisite is at or above the
/// satisfaction threshold.
fn prerequisites_ready(
    graph: &GraphIndex,
    states: &HashMap<String, KnowledgeState>,
    concept_id: &str,
    config: &EngineConfig,
) -> bool {
    graph
        .prerequisite_edges(concept_id)
        .iter()
        .filter(|e| e.strength == crate::types::EdgeStrength::Required)
        .all(|e| {
            states
                .get(&e.from)
                .map(|s| s.mastery >= config.mastery.prerequisite_met)
                .unwrap_or(false)
        })
}

/// Dependents reached through required/recommended edges, lexically
/// ordered and deduped.
fn blocked_dependent_ids(graph: &GraphIndex, concept_id: &str) -> Vec<String> {
    let mut ids: Vec<String> = graph
        .dependent_edges(concept_id)
        .iter()
        .filter(|e| e.strength.counts_for_readiness())
        .map(|e| e.to.clone())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
