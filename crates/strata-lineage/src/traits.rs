use strata_types::BranchId;

use crate::branch::Branch;
use crate::error::Result;

/// Storage boundary for branches and their ancestor closures.
///
/// All implementations must satisfy these invariants:
/// - The lineage graph is acyclic (guaranteed by construction: a parent
///   must exist before its child).
/// - `ancestors` is ordered nearest-first and always starts with the
///   branch itself.
/// - For a child C of parent P: `ancestors(C) == [C] ++ ancestors(P)`.
pub trait BranchStore: Send + Sync {
    /// Create a branch, optionally from a parent.
    ///
    /// The ancestor closure is computed here, once; creation never copies
    /// object rows. Fails with `BranchNotFound` for an unknown parent,
    /// `DuplicateName` when the name is taken within the project scope,
    /// and `InvalidName` when validation rejects the name.
    fn create(
        &self,
        name: &str,
        project_id: Option<uuid::Uuid>,
        parent: Option<BranchId>,
    ) -> Result<Branch>;

    /// Read a branch by id. Returns `Ok(None)` if absent.
    fn get(&self, id: &BranchId) -> Result<Option<Branch>>;

    /// The precomputed ancestor closure, nearest-first, self included.
    ///
    /// Fails with `BranchNotFound` for an unknown branch.
    fn ancestors(&self, id: &BranchId) -> Result<Vec<BranchId>>;

    /// All branches, optionally filtered by project scope.
    fn list(&self, project_id: Option<uuid::Uuid>) -> Result<Vec<Branch>>;
}
