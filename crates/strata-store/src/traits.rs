use strata_types::{BranchId, CanonicalId, VersionId};

use crate::error::StoreResult;
use crate::object::ObjectVersion;

/// Storage backend for object version rows.
///
/// All implementations must satisfy these invariants:
/// - Rows are immutable once inserted; new state means a new row.
/// - Appends for one (canonical, branch) are monotonic in `version`; the
///   backend re-verifies this on insert rather than trusting the caller.
/// - `insert_batch` is atomic: either every row lands or none do.
/// - Reads never block writes on other canonical ids.
pub trait VersionStore: Send + Sync {
    /// Insert one version row.
    ///
    /// Fails with `Integrity` on a duplicate row id or a non-monotonic
    /// append, and with `DuplicateKey` when a live row already claims the
    /// same (branch, type, key) under a different canonical id.
    fn insert(&self, version: ObjectVersion) -> StoreResult<()>;

    /// Insert several rows atomically (the merge-execute commit).
    ///
    /// The whole batch is validated against current state before any row
    /// is applied; a failed batch leaves the store untouched.
    fn insert_batch(&self, versions: Vec<ObjectVersion>) -> StoreResult<()>;

    /// Read a version row by id. Returns `Ok(None)` if absent.
    fn get(&self, id: &VersionId) -> StoreResult<Option<ObjectVersion>>;

    /// The most recent version row for a canonical object on one branch,
    /// tombstones included. `Ok(None)` if the branch never touched it.
    fn head_on(
        &self,
        canonical_id: &CanonicalId,
        branch_id: &BranchId,
    ) -> StoreResult<Option<ObjectVersion>>;

    /// The live (non-deleted) head claiming a (type, key) on a branch.
    fn live_by_key(
        &self,
        branch_id: &BranchId,
        object_type: &str,
        key: &str,
    ) -> StoreResult<Option<ObjectVersion>>;

    /// Distinct canonical ids with at least one version row on the branch.
    fn canonicals_on(&self, branch_id: &BranchId) -> StoreResult<Vec<CanonicalId>>;

    /// Every version row for a canonical object, oldest first.
    fn versions_of(&self, canonical_id: &CanonicalId) -> StoreResult<Vec<ObjectVersion>>;
}
