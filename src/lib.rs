//! # zpd-core - adaptive education recommendation engines
//!
//! Pure-Rust algorithms for adaptive learning:
//!
//! - **ZPD analysis** - partitions a prerequisite graph into too-easy /
//!   zpd / too-hard zones per learner and ranks recommendations
//! - **Gap detection** - missing, partial, forgotten, and misconception
//!   gaps with severities and a summary
//! - **Forgetting curve** - exponential decay with per-state retention
//!   strength, plus SM-2 style review scheduling
//! - **Psychometrics** - 39 scored domains derived into learning style,
//!   cognitive profile, and difficulty adjustments
//!
//! ## Module structure
//!
//! - [`zpd`] - zone partitioning, readiness, recommendations
//! - [`gaps`] - gap detection, review queue, remediation plans, decay
//! - [`psychometric`] - domain taxonomy and profile derivation
//! - [`graph`] - bounded prerequisite-graph traversal
//! - [`store`] - the storage contract and the in-memory reference store
//! - [`types`] - shared data model
//! - [`config`] - every tunable threshold in one place
//!
//! ## Example
//!
//! ```rust
//! use zpd_core::{EngineConfig, LearnerProfile, MemoryStorage, Storage, ZpdEngine};
//!
//! let storage = MemoryStorage::new();
//! storage.upsert_learner(LearnerProfile::new("u1", "Sam")).unwrap();
//!
//! let engine = ZpdEngine::new(&storage, EngineConfig::default());
//! let analysis = engine.analyze("u1", Some(5)).unwrap();
//! assert!(analysis.recommendations.is_empty());
//! ```

pub mod config;
pub mod error;
pub mod gaps;
pub mod graph;
pub mod psychometric;
pub mod store;
pub mod types;
pub mod zpd;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use gaps::{
    apply_review, predicted_retention, GapEngine, GapReport, GapScope, GapType, KnowledgeGap,
    RemediationOutcome, RemediationPlan, ReviewOutcome, ReviewPriority, ReviewQueue,
};
pub use graph::{ChainNode, GraphIndex, TraversalOptions};
pub use psychometric::{
    CognitiveProfile, Domain, DomainCategory, LearningStyle, PsychometricAdjustments,
};
pub use store::{MemoryStorage, Storage};
pub use types::{
    ConceptDifficulty, ConceptNode, DomainScore, EdgeStrength, KnowledgeState, LearnerProfile,
    Misconception, PrerequisiteEdge, Severity,
};
pub use zpd::{Recommendation, Zone, ZoneEntry, ZpdAnalysis, ZpdEngine};
