//! Storage boundary.
//!
//! The engines consume a narrow read/write contract; the persistent
//! implementation behind it (SQL, key-value, whatever the host app uses) is
//! out of scope. `MemoryStorage` is the reference implementation used by
//! tests and embedding callers that keep everything in process.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::psychometric::{derive_learning_style, estimate_cognitive_profile, Domain};
use crate::types::{ConceptNode, DomainScore, KnowledgeState, LearnerProfile, PrerequisiteEdge};

/// Read/write operations the engines require from the host's data store.
///
/// Reads return owned values: engine computations index and re-shape the
/// data anyway, and implementations are free to deserialize on demand.
pub trait Storage: Send + Sync {
    fn get_concept(&self, concept_id: &str) -> Option<ConceptNode>;
    fn list_concepts(&self) -> Vec<ConceptNode>;
    fn list_edges(&self) -> Vec<PrerequisiteEdge>;
    fn get_learner(&self, user_id: &str) -> Option<LearnerProfile>;
    /// All knowledge states for one learner.
    fn knowledge_states(&self, user_id: &str) -> Vec<KnowledgeState>;
    fn upsert_knowledge_state(&self, state: KnowledgeState) -> Result<()>;
    fn upsert_learner(&self, learner: LearnerProfile) -> Result<()>;

    fn edges_from(&self, concept_id: &str) -> Vec<PrerequisiteEdge> {
        self.list_edges()
            .into_iter()
            .filter(|e| e.from == concept_id)
            .collect()
    }

    fn edges_to(&self, concept_id: &str) -> Vec<PrerequisiteEdge> {
        self.list_edges()
            .into_iter()
            .filter(|e| e.to == concept_id)
            .collect()
    }

    fn get_knowledge_state(&self, user_id: &str, concept_id: &str) -> Option<KnowledgeState> {
        self.knowledge_states(user_id)
            .into_iter()
            .find(|s| s.concept_id == concept_id)
    }

    /// Merges new psychometric scores into a learner's profile and
    /// re-derives the categorical learning style and cognitive profile.
    /// Invalid scores are rejected before anything is written.
    fn upsert_psychometric_scores(
        &self,
        user_id: &str,
        scores: HashMap<Domain, DomainScore>,
    ) -> Result<LearnerProfile> {
        let mut learner = self
            .get_learner(user_id)
            .ok_or_else(|| EngineError::NotFound(format!("learner {user_id}")))?;

        for score in scores.values() {
            score.validate()?;
        }
        learner.psychometric_scores.extend(scores);
        learner.learning_style = Some(derive_learning_style(&learner.psychometric_scores)?);
        learner.cognitive_profile =
            Some(estimate_cognitive_profile(&learner.psychometric_scores)?);

        self.upsert_learner(learner.clone())?;
        Ok(learner)
    }
}

#[derive(Default)]
struct StoreInner {
    concepts: HashMap<String, ConceptNode>,
    edges: Vec<PrerequisiteEdge>,
    learners: HashMap<String, LearnerProfile>,
    states: HashMap<(String, String), KnowledgeState>,
}

/// In-process store over `parking_lot` maps. Writes are last-writer-wins,
/// matching the concurrency contract of the engines.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<StoreInner>,
}

/// JSON fixture shape accepted by [`MemoryStorage::from_json`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fixture {
    #[serde(default)]
    concepts: Vec<ConceptNode>,
    #[serde(default)]
    edges: Vec<PrerequisiteEdge>,
    #[serde(default)]
    learners: Vec<LearnerProfile>,
    #[serde(default)]
    knowledge_states: Vec<KnowledgeState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_concept(&self, concept: ConceptNode) -> Result<()> {
        concept.validate()?;
        self.inner
            .write()
            .concepts
            .insert(concept.concept_id.clone(), concept);
        Ok(())
    }

    /// Inserts an edge; both endpoints must already exist.
    pub fn insert_edge(&self, edge: PrerequisiteEdge) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.concepts.contains_key(&edge.from) {
            return Err(EngineError::InvalidInput(format!(
                "edge references unknown concept {}",
                edge.from
            )));
        }
        if !inner.concepts.contains_key(&edge.to) {
            return Err(EngineError::InvalidInput(format!(
                "edge references unknown concept {}",
                edge.to
            )));
        }
        inner.edges.push(edge);
        Ok(())
    }

    /// Removes a concept without touching knowledge states that reference
    /// it; the engines tolerate the resulting dangling records.
    pub fn remove_concept(&self, concept_id: &str) -> Option<ConceptNode> {
        let mut inner = self.inner.write();
        inner.edges.retain(|e| e.from != concept_id && e.to != concept_id);
        inner.concepts.remove(concept_id)
    }

    /// Loads a whole store from a JSON fixture. Everything is validated the
    /// same way the individual insert methods validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidInput(format!("fixture parse error: {e}")))?;

        let storage = Self::new();
        for concept in fixture.concepts {
            storage.insert_concept(concept)?;
        }
        for edge in fixture.edges {
            storage.insert_edge(edge)?;
        }
        for learner in fixture.learners {
            storage.upsert_learner(learner)?;
        }
        for state in fixture.knowledge_states {
            storage.upsert_knowledge_state(state)?;
        }
        Ok(storage)
    }
}

impl Storage for MemoryStorage {
    fn get_concept(&self, concept_id: &str) -> Option<ConceptNode> {
        self.inner.read().concepts.get(concept_id).cloned()
    }

    fn list_concepts(&self) -> Vec<ConceptNode> {
        self.inner.read().concepts.values().cloned().collect()
    }

    fn list_edges(&self) -> Vec<PrerequisiteEdge> {
        self.inner.read().edges.clone()
    }

    fn get_learner(&self, user_id: &str) -> Option<LearnerProfile> {
        self.inner.read().learners.get(user_id).cloned()
    }

    fn knowledge_states(&self, user_id: &str) -> Vec<KnowledgeState> {
        self.inner
            .read()
            .states
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    fn upsert_knowledge_state(&self, state: KnowledgeState) -> Result<()> {
        state.validate()?;
        self.inner.write().states.insert(
            (state.user_id.clone(), state.concept_id.clone()),
            state,
        );
        Ok(())
    }

    fn upsert_learner(&self, learner: LearnerProfile) -> Result<()> {
        learner.validate()?;
        self.inner
            .write()
            .learners
            .insert(learner.user_id.clone(), learner);
        Ok(())
    }

    fn edges_from(&self, concept_id: &str) -> Vec<PrerequisiteEdge> {
        self.inner
            .read()
            .edges
            .iter()
            .filter(|e| e.from == concept_id)
            .cloned()
            .collect()
    }

    fn edges_to(&self, concept_id: &str) -> Vec<PrerequisiteEdge> {
        self.inner
            .read()
            .edges
            .iter()
            .filter(|e| e.to == concept_id)
            .cloned()
            .collect()
    }

    fn get_knowledge_state(&self, user_id: &str, concept_id: &str) -> Option<KnowledgeState> {
        self.inner
            .read()
            .states
            .get(&(user_id.to_string(), concept_id.to_string()))
            .cloned()
    }
}
