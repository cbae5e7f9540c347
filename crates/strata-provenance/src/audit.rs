//! Audit trail reconstruction: "why does this version look like this".
//!
//! A [`ProvenanceTrail`] is the backward closure of a version's provenance
//! edges — every recorded contribution reachable by following parent links
//! from the version under audit.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use strata_types::VersionId;

use crate::edge::MergeProvenanceEdge;
use crate::error::Result;
use crate::traits::ProvenanceStore;

/// The complete recorded provenance behind one version.
///
/// Edges are ordered breadth-first from the audited version backward:
/// direct contributors first, then their contributors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceTrail {
    /// The version being audited.
    pub version: VersionId,
    /// Backward closure of provenance edges.
    pub chain: Vec<MergeProvenanceEdge>,
}

impl ProvenanceTrail {
    /// Walk parent edges backward from `version` and collect the full
    /// recorded history.
    pub fn explain<P: ProvenanceStore>(store: &P, version: VersionId) -> Result<Self> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut frontier = vec![version];

        while let Some(current) = frontier.pop() {
            if !visited.insert(current) {
                continue;
            }
            for edge in store.parents_of(&current)? {
                frontier.push(edge.parent);
                chain.push(edge);
            }
        }

        Ok(Self { version, chain })
    }

    /// Number of edges in the trail.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` if the version has no recorded provenance (it was
    /// never produced by a merge).
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// All unique versions that contributed somewhere in the trail.
    pub fn contributing_versions(&self) -> Vec<VersionId> {
        let mut out: Vec<VersionId> = self.chain.iter().map(|e| e.parent).collect();
        out.sort();
        out.dedup();
        out
    }
}
