use strata_types::VersionId;

use crate::edge::MergeProvenanceEdge;
use crate::error::Result;

/// Append-only storage boundary for merge provenance edges.
///
/// Implementations never update or delete rows; the audit trail must stay
/// reconstructable for the lifetime of the graph.
pub trait ProvenanceStore: Send + Sync {
    /// Record a batch of edges (one merge execute's worth).
    ///
    /// Fails with `DuplicateEdge` if any (child, parent) pair was already
    /// recorded; nothing is applied in that case.
    fn record(&self, edges: Vec<MergeProvenanceEdge>) -> Result<()>;

    /// The edges explaining how `child` was produced.
    fn parents_of(&self, child: &VersionId) -> Result<Vec<MergeProvenanceEdge>>;

    /// The edges in which `parent` contributed to later versions.
    fn children_of(&self, parent: &VersionId) -> Result<Vec<MergeProvenanceEdge>>;
}
