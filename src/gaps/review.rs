//! Review queue: concepts whose predicted retention has sunk far enough,
//! or whose scheduled review date has passed, tiered by urgency.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::gaps::decay::{days_between, next_review_date, predicted_retention};
use crate::graph::GraphIndex;
use crate::types::KnowledgeState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewPriority {
    Urgent,
    Normal,
    Low,
}

impl ReviewPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Urgent => 0,
            Self::Normal => 1,
            Self::Low => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub concept_id: String,
    pub concept_name: String,
    pub predicted_retention: f64,
    /// Days past the scheduled review date; zero when not yet due.
    pub days_overdue: f64,
    pub next_review: DateTime<Utc>,
    pub priority: ReviewPriority,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueStats {
    pub total_items: usize,
    pub urgent: usize,
    pub normal: usize,
    pub low: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueue {
    pub items: Vec<ReviewItem>,
    pub stats: ReviewQueueStats,
}

/// Builds the review queue at instant `now`. Only concepts the learner has
/// actually learned to the review floor participate; barely-started
/// concepts belong to gap remediation, not spaced review.
pub fn build_queue(
    graph: &GraphIndex,
    states: &HashMap<String, KnowledgeState>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> ReviewQueue {
    let mut items = Vec::new();

    for (concept_id, state) in states {
        if state.mastery < config.mastery.review_floor {
            continue;
        }
        let Some(concept) = graph.concept(concept_id) else { continue };

        let days = days_between(state.last_reviewed, now);
        let retention = predicted_retention(days, state.retention_strength, &config.decay);
        let next_review = next_review_date(
            state.last_reviewed,
            state.retention_strength,
            &config.decay,
            &config.review,
        );
        let days_overdue = days_between(next_review, now);

        if retention >= config.review.trigger_retention && days_overdue <= 0.0 {
            continue;
        }

        let priority = if retention < config.review.urgent_retention
            || days_overdue > config.review.urgent_overdue_days
        {
            ReviewPriority::Urgent
        } else if retention < config.review.normal_retention || days_overdue > 0.0 {
            ReviewPriority::Normal
        } else {
            ReviewPriority::Low
        };

        items.push(ReviewItem {
            concept_id: concept_id.clone(),
            concept_name: concept.name.clone(),
            predicted_retention: retention,
            days_overdue,
            next_review,
            priority,
        });
    }

    items.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| {
                a.predicted_retention
                    .partial_cmp(&b.predicted_retention)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.concept_id.cmp(&b.concept_id))
    });

    let stats = ReviewQueueStats {
        total_items: items.len(),
        urgent: items
            .iter()
            .filter(|i| i.priority == ReviewPriority::Urgent)
            .count(),
        normal: items
            .iter()
            .filter(|i| i.priority == ReviewPriority::Normal)
            .count(),
        low: items
            .iter()
            .filter(|i| i.priority == ReviewPriority::Low)
            .count(),
        overdue: items.iter().filter(|i| i.days_overdue > 0.0).count(),
    };

    ReviewQueue { items, stats }
}
