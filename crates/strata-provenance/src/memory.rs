use std::collections::HashSet;
use std::sync::RwLock;

use strata_types::VersionId;

use crate::edge::MergeProvenanceEdge;
use crate::error::{ProvenanceError, Result};
use crate::traits::ProvenanceStore;

/// In-memory provenance store for tests and embedding.
///
/// Edges are held in recording order in a single append-only list.
pub struct InMemoryProvenanceStore {
    inner: RwLock<ProvenanceState>,
}

#[derive(Default)]
struct ProvenanceState {
    edges: Vec<MergeProvenanceEdge>,
    seen: HashSet<(VersionId, VersionId)>,
}

impl InMemoryProvenanceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ProvenanceState::default()),
        }
    }

    /// Total number of recorded edges.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").edges.len()
    }

    /// Returns `true` if nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").edges.is_empty()
    }
}

impl Default for InMemoryProvenanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvenanceStore for InMemoryProvenanceStore {
    fn record(&self, edges: Vec<MergeProvenanceEdge>) -> Result<()> {
        let mut state = self.inner.write().expect("lock poisoned");

        // Validate the whole batch before appending anything.
        let mut batch_seen = HashSet::new();
        for edge in &edges {
            let pair = (edge.child, edge.parent);
            if state.seen.contains(&pair) || !batch_seen.insert(pair) {
                return Err(ProvenanceError::DuplicateEdge {
                    child: edge.child,
                    parent: edge.parent,
                });
            }
        }

        for edge in edges {
            state.seen.insert((edge.child, edge.parent));
            state.edges.push(edge);
        }
        Ok(())
    }

    fn parents_of(&self, child: &VersionId) -> Result<Vec<MergeProvenanceEdge>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .edges
            .iter()
            .filter(|e| e.child == *child)
            .cloned()
            .collect())
    }

    fn children_of(&self, parent: &VersionId) -> Result<Vec<MergeProvenanceEdge>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .edges
            .iter()
            .filter(|e| e.parent == *parent)
            .cloned()
            .collect())
    }
}

impl std::fmt::Debug for InMemoryProvenanceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryProvenanceStore")
            .field("edge_count", &self.len())
            .finish()
    }
}
