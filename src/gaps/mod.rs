//! Gap analysis: detection, spaced-review queueing, and remediation
//! planning over one learner's knowledge states.

pub mod decay;
pub mod detect;
pub mod remediation;
pub mod review;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::graph::GraphIndex;
use crate::store::Storage;

pub use decay::{
    apply_review, next_review_date, predicted_retention, scheduled_interval_days, ReviewOutcome,
};
pub use detect::{GapReport, GapScope, GapSummary, GapType, KnowledgeGap};
pub use remediation::{RemediationPlan, RemediationStep};
pub use review::{ReviewItem, ReviewPriority, ReviewQueue, ReviewQueueStats};

/// Remediation plan together with how many gaps fed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationOutcome {
    pub plan: RemediationPlan,
    pub gaps_total: usize,
}

pub struct GapEngine<'a> {
    storage: &'a dyn Storage,
    config: EngineConfig,
}

impl<'a> GapEngine<'a> {
    pub fn new(storage: &'a dyn Storage, config: EngineConfig) -> Self {
        Self { storage, config }
    }

    pub fn detect_gaps(&self, user_id: &str, scope: &GapScope) -> Result<GapReport> {
        self.detect_gaps_at(user_id, scope, Utc::now())
    }

    /// Gap detection at an explicit instant, for deterministic callers.
    pub fn detect_gaps_at(
        &self,
        user_id: &str,
        scope: &GapScope,
        now: DateTime<Utc>,
    ) -> Result<GapReport> {
        let (graph, states) = self.load(user_id)?;
        let report = detect::detect(&graph, &states, scope, now, &self.config);
        debug!(
            user_id,
            total = report.summary.total,
            critical = report.summary.critical,
            "gap detection complete"
        );
        Ok(report)
    }

    /// Raw decay number for one state, for callers that display it.
    pub fn predicted_retention(
        &self,
        state: &crate::types::KnowledgeState,
        now: DateTime<Utc>,
    ) -> f64 {
        decay::predicted_retention(
            decay::days_between(state.last_reviewed, now),
            state.retention_strength,
            &self.config.decay,
        )
    }

    pub fn review_queue(&self, user_id: &str) -> Result<ReviewQueue> {
        self.review_queue_at(user_id, Utc::now())
    }

    pub fn review_queue_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<ReviewQueue> {
        let (graph, states) = self.load(user_id)?;
        Ok(review::build_queue(&graph, &states, now, &self.config))
    }

    pub fn remediation_plan(&self, user_id: &str, scope: &GapScope) -> Result<RemediationOutcome> {
        self.remediation_plan_at(user_id, scope, Utc::now())
    }

    pub fn remediation_plan_at(
        &self,
        user_id: &str,
        scope: &GapScope,
        now: DateTime<Utc>,
    ) -> Result<RemediationOutcome> {
        let (graph, states) = self.load(user_id)?;
        let report = detect::detect(&graph, &states, scope, now, &self.config);
        let plan = remediation::build_plan(&report, &graph, &self.config)?;
        Ok(RemediationOutcome {
            plan,
            gaps_total: report.summary.total,
        })
    }

    fn load(
        &self,
        user_id: &str,
    ) -> Result<(
        GraphIndex,
        std::collections::HashMap<String, crate::types::KnowledgeState>,
    )> {
        if self.storage.get_learner(user_id).is_none() {
            return Err(EngineError::NotFound(format!("learner {user_id}")));
        }
        let graph = GraphIndex::build(self.storage);
        let states = graph.index_states(self.storage.knowledge_states(user_id));
        Ok((graph, states))
    }
}
