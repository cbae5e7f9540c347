use strata_types::{BranchId, CanonicalId, VersionId};

use crate::schema::SchemaViolation;

/// Errors raised by the object store.
///
/// `DuplicateKey` and `StaleVersion` are the two conflict shapes
/// (optimistic-concurrency violations); `VersionNotFound` / `Deleted` map
/// to not-found at the request layer; `Schema` carries a registry
/// rejection that aborted the write before any row was persisted.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The referenced version row does not exist.
    #[error("version not found: {0}")]
    VersionNotFound(VersionId),

    /// A live object with the same (type, key) already exists on the branch.
    #[error("a live {object_type:?} object with key {key:?} already exists on branch {branch_id}")]
    DuplicateKey {
        object_type: String,
        key: String,
        branch_id: BranchId,
    },

    /// The caller's version is no longer the branch head for the canonical
    /// object; the caller must re-read and retry.
    #[error("stale version {given} for {canonical_id}: branch {branch_id} head is {head}")]
    StaleVersion {
        given: VersionId,
        head: VersionId,
        canonical_id: CanonicalId,
        branch_id: BranchId,
    },

    /// The object has been soft-deleted on this branch.
    #[error("object {canonical_id} is deleted on branch {branch_id}")]
    Deleted {
        canonical_id: CanonicalId,
        branch_id: BranchId,
    },

    /// The schema registry rejected the write.
    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    /// Diff computation failed.
    #[error(transparent)]
    Diff(#[from] strata_diff::DiffError),

    /// A backend invariant was violated (duplicate row id, non-monotonic
    /// version append, partial batch).
    #[error("store integrity violation: {0}")]
    Integrity(String),
}

impl StoreError {
    /// Returns `true` for the optimistic-concurrency conflict shapes.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. } | Self::StaleVersion { .. })
    }
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;
