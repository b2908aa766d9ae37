//! Knowledge-graph accessor: adjacency index plus bounded traversal.
//!
//! The edge list is indexed once per computation into forward and reverse
//! adjacency so traversal never rescans all edges. All walks are iterative
//! with a visited set and node budget, so malformed (cyclic) input fails
//! fast instead of hanging.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::TraversalLimits;
use crate::error::{EngineError, Result};
use crate::store::Storage;
use crate::types::{ConceptNode, EdgeStrength, PrerequisiteEdge};

/// One node reached by a chain traversal, at its minimum depth from the
/// queried concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainNode {
    pub concept_id: String,
    pub depth: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TraversalOptions {
    /// Maximum depth; unlimited (up to the safety cap) when `None`.
    pub depth: Option<usize>,
    /// Only depth-1 neighbors.
    pub direct: bool,
}

impl TraversalOptions {
    pub fn direct() -> Self {
        Self {
            depth: None,
            direct: true,
        }
    }
}

enum Direction {
    /// Backward over edges: toward prerequisites.
    Prerequisites,
    /// Forward over edges: toward dependents.
    Dependents,
}

pub struct GraphIndex {
    concepts: HashMap<String, ConceptNode>,
    edges: Vec<PrerequisiteEdge>,
    /// concept -> indices of edges leaving it (it is a prerequisite of).
    forward: HashMap<String, Vec<usize>>,
    /// concept -> indices of edges entering it (its prerequisites).
    reverse: HashMap<String, Vec<usize>>,
}

impl GraphIndex {
    /// Indexes the store's concepts and edges. Edges referencing unknown
    /// concepts are skipped with a warning; partial data beats no data for
    /// these read-heavy computations.
    pub fn build(storage: &dyn Storage) -> Self {
        let concepts: HashMap<String, ConceptNode> = storage
            .list_concepts()
            .into_iter()
            .map(|c| (c.concept_id.clone(), c))
            .collect();

        let mut edges = Vec::new();
        let mut forward: HashMap<String, Vec<usize>> = HashMap::new();
        let mut reverse: HashMap<String, Vec<usize>> = HashMap::new();
        for edge in storage.list_edges() {
            if !concepts.contains_key(&edge.from) || !concepts.contains_key(&edge.to) {
                warn!(
                    from = %edge.from,
                    to = %edge.to,
                    "skipping prerequisite edge with dangling concept reference"
                );
                continue;
            }
            let idx = edges.len();
            forward.entry(edge.from.clone()).or_default().push(idx);
            reverse.entry(edge.to.clone()).or_default().push(idx);
            edges.push(edge);
        }

        Self {
            concepts,
            edges,
            forward,
            reverse,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn concept(&self, concept_id: &str) -> Option<&ConceptNode> {
        self.concepts.get(concept_id)
    }

    pub fn contains(&self, concept_id: &str) -> bool {
        self.concepts.contains_key(concept_id)
    }

    /// All concept ids in lexical order, for deterministic iteration.
    pub fn concept_ids_sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.concepts.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Edges whose target is `concept_id`: its direct prerequisites.
    pub fn prerequisite_edges(&self, concept_id: &str) -> Vec<&PrerequisiteEdge> {
        self.reverse
            .get(concept_id)
            .map(|idxs| idxs.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Edges whose source is `concept_id`: edges toward its dependents.
    pub fn dependent_edges(&self, concept_id: &str) -> Vec<&PrerequisiteEdge> {
        self.forward
            .get(concept_id)
            .map(|idxs| idxs.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Breadth-first prerequisite chain (backward over edges), depth
    /// limited, each ancestor exactly once at its minimum depth.
    pub fn prerequisites(
        &self,
        concept_id: &str,
        opts: TraversalOptions,
        limits: &TraversalLimits,
    ) -> Result<Vec<ChainNode>> {
        self.chain(concept_id, opts, limits, Direction::Prerequisites)
    }

    /// Breadth-first dependent chain (forward over edges).
    pub fn dependents(
        &self,
        concept_id: &str,
        opts: TraversalOptions,
        limits: &TraversalLimits,
    ) -> Result<Vec<ChainNode>> {
        self.chain(concept_id, opts, limits, Direction::Dependents)
    }

    fn chain(
        &self,
        start: &str,
        opts: TraversalOptions,
        limits: &TraversalLimits,
        direction: Direction,
    ) -> Result<Vec<ChainNode>> {
        if !self.concepts.contains_key(start) {
            return Err(EngineError::NotFound(format!("concept {start}")));
        }

        let depth_cap = if opts.direct {
            1
        } else {
            opts.depth.unwrap_or(limits.max_depth).min(limits.max_depth)
        };

        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(start);
        let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
        queue.push_back((start, 0));
        let mut out = Vec::new();

        while let Some((id, depth)) = queue.pop_front() {
            if depth >= depth_cap {
                continue;
            }
            let edge_idxs = match direction {
                Direction::Prerequisites => self.reverse.get(id),
                Direction::Dependents => self.forward.get(id),
            };
            let Some(edge_idxs) = edge_idxs else { continue };
            for &idx in edge_idxs {
                let edge = &self.edges[idx];
                let next = match direction {
                    Direction::Prerequisites => edge.from.as_str(),
                    Direction::Dependents => edge.to.as_str(),
                };
                if !visited.insert(next) {
                    continue;
                }
                if visited.len() > limits.max_nodes {
                    return Err(EngineError::ComputationLimitExceeded(format!(
                        "traversal from {start} exceeded {} nodes",
                        limits.max_nodes
                    )));
                }
                out.push(ChainNode {
                    concept_id: next.to_string(),
                    depth: depth + 1,
                });
                queue.push_back((next, depth + 1));
            }
        }

        out.sort_by(|a, b| a.depth.cmp(&b.depth).then(a.concept_id.cmp(&b.concept_id)));
        Ok(out)
    }

    /// Kahn's algorithm over the required edges within `subset`, with a
    /// lexical tie-break so the order is deterministic. Fails on cycles.
    pub fn topo_sort(&self, subset: &BTreeSet<String>) -> Result<Vec<String>> {
        let mut indegree: HashMap<&str, usize> =
            subset.iter().map(|id| (id.as_str(), 0)).collect();
        for edge in &self.edges {
            if edge.strength == EdgeStrength::Required
                && subset.contains(&edge.from)
                && subset.contains(&edge.to)
            {
                if let Some(deg) = indegree.get_mut(edge.to.as_str()) {
                    *deg += 1;
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<&str>> = indegree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| Reverse(id))
            .collect();
        let mut order = Vec::with_capacity(subset.len());

        while let Some(Reverse(id)) = ready.pop() {
            order.push(id.to_string());
            if let Some(edge_idxs) = self.forward.get(id) {
                for &idx in edge_idxs {
                    let edge = &self.edges[idx];
                    if edge.strength != EdgeStrength::Required || !subset.contains(&edge.to) {
                        continue;
                    }
                    if let Some(deg) = indegree.get_mut(edge.to.as_str()) {
                        *deg -= 1;
                        if *deg == 0 {
                            ready.push(Reverse(edge.to.as_str()));
                        }
                    }
                }
            }
        }

        if order.len() < subset.len() {
            let stuck: Vec<&str> = subset
                .iter()
                .map(String::as_str)
                .filter(|id| !order.iter().any(|o| o == id))
                .collect();
            return Err(EngineError::GraphInconsistency(format!(
                "prerequisite cycle involving: {}",
                stuck.join(", ")
            )));
        }
        Ok(order)
    }

    /// Indexes one learner's states by concept id, dropping records that
    /// reference concepts no longer in the graph.
    pub fn index_states(
        &self,
        states: Vec<crate::types::KnowledgeState>,
    ) -> HashMap<String, crate::types::KnowledgeState> {
        let mut by_concept = HashMap::with_capacity(states.len());
        for state in states {
            if !self.concepts.contains_key(&state.concept_id) {
                warn!(
                    user_id = %state.user_id,
                    concept_id = %state.concept_id,
                    "skipping knowledge state for deleted concept"
                );
                continue;
            }
            by_concept.insert(state.concept_id.clone(), state);
        }
        by_concept
    }

    /// Fast-fail cycle check over every edge regardless of strength.
    pub fn detect_cycle(&self) -> Result<()> {
        let mut indegree: HashMap<&str, usize> = self
            .concepts
            .keys()
            .map(|id| (id.as_str(), 0))
            .collect();
        for edge in &self.edges {
            if let Some(deg) = indegree.get_mut(edge.to.as_str()) {
                *deg += 1;
            }
        }

        let mut ready: VecDeque<&str> = indegree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut seen = 0usize;
        while let Some(id) = ready.pop_front() {
            seen += 1;
            if let Some(edge_idxs) = self.forward.get(id) {
                for &idx in edge_idxs {
                    let to = self.edges[idx].to.as_str();
                    if let Some(deg) = indegree.get_mut(to) {
                        *deg -= 1;
                        if *deg == 0 {
                            ready.push_back(to);
                        }
                    }
                }
            }
        }

        if seen < self.concepts.len() {
            return Err(EngineError::GraphInconsistency(
                "prerequisite graph contains a cycle".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use crate::types::ConceptDifficulty;

    fn concept(id: &str) -> ConceptNode {
        ConceptNode {
            concept_id: id.to_string(),
            name: id.to_uppercase(),
            domain: "math".to_string(),
            subdomain: None,
            description: None,
            difficulty: ConceptDifficulty::default(),
            bloom_level: None,
            tags: vec![],
        }
    }

    fn edge(from: &str, to: &str) -> PrerequisiteEdge {
        PrerequisiteEdge {
            from: from.to_string(),
            to: to.to_string(),
            strength: EdgeStrength::Required,
            reason: None,
        }
    }

    fn diamond_store() -> MemoryStorage {
        // a -> b -> d, a -> c -> d: d reachable from a via two paths.
        let storage = MemoryStorage::new();
        for id in ["a", "b", "c", "d"] {
            storage.insert_concept(concept(id)).unwrap();
        }
        for (f, t) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")] {
            storage.insert_edge(edge(f, t)).unwrap();
        }
        storage
    }

    #[test]
    fn test_prerequisites_dedupe_at_min_depth() {
        let graph = GraphIndex::build(&diamond_store());
        let limits = TraversalLimits::default();
        let chain = graph
            .prerequisites("d", TraversalOptions::default(), &limits)
            .unwrap();
        // a appears once, at depth 2 (its minimum), not twice.
        let a_entries: Vec<_> = chain.iter().filter(|n| n.concept_id == "a").collect();
        assert_eq!(a_entries.len(), 1);
        assert_eq!(a_entries[0].depth, 2);
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_direct_only() {
        let graph = GraphIndex::build(&diamond_store());
        let limits = TraversalLimits::default();
        let chain = graph
            .prerequisites("d", TraversalOptions::direct(), &limits)
            .unwrap();
        let ids: Vec<&str> = chain.iter().map(|n| n.concept_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_depth_limit() {
        let graph = GraphIndex::build(&diamond_store());
        let limits = TraversalLimits::default();
        let chain = graph
            .dependents(
                "a",
                TraversalOptions {
                    depth: Some(1),
                    direct: false,
                },
                &limits,
            )
            .unwrap();
        assert_eq!(chain.len(), 2);
        assert!(chain.iter().all(|n| n.depth == 1));
    }

    #[test]
    fn test_unknown_concept_is_not_found() {
        let graph = GraphIndex::build(&diamond_store());
        let limits = TraversalLimits::default();
        let err = graph
            .prerequisites("ghost", TraversalOptions::default(), &limits)
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_node_budget_is_enforced() {
        let graph = GraphIndex::build(&diamond_store());
        let limits = TraversalLimits {
            max_depth: 64,
            max_nodes: 2,
        };
        let err = graph
            .dependents("a", TraversalOptions::default(), &limits)
            .unwrap_err();
        assert!(matches!(err, EngineError::ComputationLimitExceeded(_)));
    }

    #[test]
    fn test_traversal_terminates_on_cycle() {
        // a -> b -> c -> a, plus the queried node inside the cycle.
        let storage = MemoryStorage::new();
        for id in ["a", "b", "c"] {
            storage.insert_concept(concept(id)).unwrap();
        }
        for (f, t) in [("a", "b"), ("b", "c"), ("c", "a")] {
            storage.insert_edge(edge(f, t)).unwrap();
        }
        let graph = GraphIndex::build(&storage);
        let limits = TraversalLimits::default();
        let chain = graph
            .prerequisites("a", TraversalOptions::default(), &limits)
            .unwrap();
        // Each ancestor exactly once; the walk does not loop forever.
        assert_eq!(chain.len(), 2);
        assert!(graph.detect_cycle().is_err());
    }

    #[test]
    fn test_topo_sort_respects_required_edges() {
        let graph = GraphIndex::build(&diamond_store());
        let subset: BTreeSet<String> =
            ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let order = graph.topo_sort(&subset).unwrap();
        let pos = |id: &str| order.iter().position(|o| o == id).unwrap();
        assert!(pos("a") < pos("b"));
        assert!(pos("a") < pos("c"));
        assert!(pos("b") < pos("d"));
        assert!(pos("c") < pos("d"));
    }

    #[test]
    fn test_dangling_edge_is_skipped() {
        let storage = MemoryStorage::new();
        storage.insert_concept(concept("a")).unwrap();
        storage.insert_concept(concept("b")).unwrap();
        storage.insert_edge(edge("a", "b")).unwrap();
        storage.remove_concept("a");

        let graph = GraphIndex::build(&storage);
        let limits = TraversalLimits::default();
        let chain = graph
            .prerequisites("b", TraversalOptions::default(), &limits)
            .unwrap();
        assert!(chain.is_empty());
    }
}
