use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use strata_types::BranchId;

/// A branch of the knowledge graph.
///
/// Branch creation copies nothing: objects written on ancestors stay where
/// they are and become visible through lineage fallback. Only the ancestor
/// closure is materialized at creation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch identifier.
    pub id: BranchId,
    /// Human-readable name, unique within its project scope.
    pub name: String,
    /// Owning project, if scoped; `None` for org-global branches.
    pub project_id: Option<uuid::Uuid>,
    /// The branch this one was created from; `None` for a root branch.
    pub parent: Option<BranchId>,
    /// When the branch was created.
    pub created_at: DateTime<Utc>,
}

impl Branch {
    /// Returns `true` if this is a root branch (no parent).
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
