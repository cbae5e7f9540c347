use strata_types::BranchId;

/// Errors raised by branch and lineage operations.
#[derive(Debug, thiserror::Error)]
pub enum LineageError {
    /// The referenced branch does not exist.
    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),

    /// A branch with this name already exists in the same project scope.
    #[error("branch name {name:?} already exists in this scope")]
    DuplicateName { name: String },

    /// The branch name failed validation.
    #[error("invalid branch name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The underlying version store failed during resolution.
    #[error(transparent)]
    Store(#[from] strata_store::StoreError),
}

/// Convenience alias for lineage results.
pub type Result<T> = std::result::Result<T, LineageError>;
