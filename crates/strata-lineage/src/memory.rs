use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;

use strata_types::BranchId;

use crate::branch::Branch;
use crate::error::{LineageError, Result};
use crate::names::validate_branch_name;
use crate::traits::BranchStore;

/// In-memory branch store for tests and embedding.
///
/// Holds the branch records plus the precomputed ancestor closure per
/// branch. Closures are immutable once computed — branches are never
/// re-parented.
pub struct InMemoryBranchStore {
    inner: RwLock<BranchState>,
}

#[derive(Default)]
struct BranchState {
    branches: HashMap<BranchId, Branch>,
    // Nearest-first, self included.
    ancestry: HashMap<BranchId, Vec<BranchId>>,
    // (project scope, name) -> branch, for duplicate detection.
    names: HashMap<(Option<uuid::Uuid>, String), BranchId>,
}

impl InMemoryBranchStore {
    /// Create an empty branch store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BranchState::default()),
        }
    }

    /// Number of branches.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").branches.len()
    }

    /// Returns `true` if no branches exist.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").branches.is_empty()
    }
}

impl Default for InMemoryBranchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchStore for InMemoryBranchStore {
    fn create(
        &self,
        name: &str,
        project_id: Option<uuid::Uuid>,
        parent: Option<BranchId>,
    ) -> Result<Branch> {
        validate_branch_name(name)?;

        let mut state = self.inner.write().expect("lock poisoned");

        let scope_key = (project_id, name.to_string());
        if state.names.contains_key(&scope_key) {
            return Err(LineageError::DuplicateName {
                name: name.to_string(),
            });
        }

        // The closure is the parent's closure with the new branch in front.
        let mut closure = vec![];
        if let Some(parent_id) = parent {
            let parent_closure = state
                .ancestry
                .get(&parent_id)
                .ok_or(LineageError::BranchNotFound(parent_id))?;
            closure = parent_closure.clone();
        }

        let branch = Branch {
            id: BranchId::new(),
            name: name.to_string(),
            project_id,
            parent,
            created_at: Utc::now(),
        };
        closure.insert(0, branch.id);

        debug!(
            branch = %branch.id,
            name = %branch.name,
            depth = closure.len(),
            "created branch"
        );

        state.names.insert(scope_key, branch.id);
        state.ancestry.insert(branch.id, closure);
        state.branches.insert(branch.id, branch.clone());
        Ok(branch)
    }

    fn get(&self, id: &BranchId) -> Result<Option<Branch>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.branches.get(id).cloned())
    }

    fn ancestors(&self, id: &BranchId) -> Result<Vec<BranchId>> {
        let state = self.inner.read().expect("lock poisoned");
        state
            .ancestry
            .get(id)
            .cloned()
            .ok_or(LineageError::BranchNotFound(*id))
    }

    fn list(&self, project_id: Option<uuid::Uuid>) -> Result<Vec<Branch>> {
        let state = self.inner.read().expect("lock poisoned");
        let mut branches: Vec<Branch> = state
            .branches
            .values()
            .filter(|b| project_id.is_none() || b.project_id == project_id)
            .cloned()
            .collect();
        branches.sort_by_key(|b| b.id);
        Ok(branches)
    }
}

impl std::fmt::Debug for InMemoryBranchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBranchStore")
            .field("branch_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_branch_is_its_own_only_ancestor() {
        let store = InMemoryBranchStore::new();
        let main = store.create("main", None, None).unwrap();

        assert!(main.is_root());
        assert_eq!(store.ancestors(&main.id).unwrap(), vec![main.id]);
    }

    #[test]
    fn child_closure_is_self_plus_parent_closure() {
        let store = InMemoryBranchStore::new();
        let main = store.create("main", None, None).unwrap();
        let feature = store.create("feature", None, Some(main.id)).unwrap();
        let nested = store.create("nested", None, Some(feature.id)).unwrap();

        assert_eq!(
            store.ancestors(&nested.id).unwrap(),
            vec![nested.id, feature.id, main.id]
        );
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let store = InMemoryBranchStore::new();
        let err = store.create("orphan", None, Some(BranchId::new())).unwrap_err();
        assert!(matches!(err, LineageError::BranchNotFound(_)));
    }

    #[test]
    fn duplicate_name_in_scope_is_rejected() {
        let store = InMemoryBranchStore::new();
        store.create("main", None, None).unwrap();
        let err = store.create("main", None, None).unwrap_err();
        assert!(matches!(err, LineageError::DuplicateName { .. }));
    }

    #[test]
    fn same_name_in_different_projects_is_fine() {
        let store = InMemoryBranchStore::new();
        store.create("main", Some(uuid::Uuid::now_v7()), None).unwrap();
        store.create("main", Some(uuid::Uuid::now_v7()), None).unwrap();
    }

    #[test]
    fn invalid_name_is_rejected() {
        let store = InMemoryBranchStore::new();
        assert!(matches!(
            store.create("bad..name", None, None).unwrap_err(),
            LineageError::InvalidName { .. }
        ));
    }

    #[test]
    fn list_filters_by_project() {
        let store = InMemoryBranchStore::new();
        let project = uuid::Uuid::now_v7();
        store.create("main", Some(project), None).unwrap();
        store.create("other", None, None).unwrap();

        assert_eq!(store.list(Some(project)).unwrap().len(), 1);
        assert_eq!(store.list(None).unwrap().len(), 2);
    }

    #[test]
    fn ancestors_of_unknown_branch_errors() {
        let store = InMemoryBranchStore::new();
        assert!(matches!(
            store.ancestors(&BranchId::new()).unwrap_err(),
            LineageError::BranchNotFound(_)
        ));
    }
}
