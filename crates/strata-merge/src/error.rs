use strata_types::BranchId;

/// Errors raised by the merge engine.
///
/// A merge with conflicts is NOT an error — conflicts are classified
/// outcomes inside the returned summary. These variants cover genuine
/// faults: unknown branches and failures in the underlying stores.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The target or source branch id is unknown.
    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),

    /// Lineage resolution failed.
    #[error(transparent)]
    Lineage(#[from] strata_lineage::LineageError),

    /// The version store rejected a read or the commit batch.
    #[error(transparent)]
    Store(#[from] strata_store::StoreError),

    /// Diff computation failed while building a merged version.
    #[error(transparent)]
    Diff(#[from] strata_diff::DiffError),

    /// Provenance recording failed.
    #[error(transparent)]
    Provenance(#[from] strata_provenance::ProvenanceError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
