/// Errors surfaced by the high-level graph API.
///
/// Each variant wraps the owning subsystem's error unchanged so the
/// request layer can map conflict/not-found/validation shapes to its own
/// response codes.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error(transparent)]
    Store(#[from] strata_store::StoreError),

    #[error(transparent)]
    Lineage(#[from] strata_lineage::LineageError),

    #[error(transparent)]
    Merge(#[from] strata_merge::MergeError),

    #[error(transparent)]
    Provenance(#[from] strata_provenance::ProvenanceError),
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
