//! Lazy fallback resolution and common-base detection.
//!
//! Resolution answers "what does canonical object X look like on branch
//! B": walk B's precomputed ancestor closure nearest-first and let the
//! first branch holding any version of X decide. A live head resolves to
//! that head; a tombstone resolves to absence — deletion on a nearer
//! branch shadows live copies further up the lineage.

use std::collections::HashSet;
use std::sync::Arc;

use strata_store::{ObjectVersion, VersionStore};
use strata_types::{BranchId, CanonicalId};

use crate::error::{LineageError, Result};
use crate::traits::BranchStore;

/// Resolves objects and merge bases through branch lineage.
pub struct LineageResolver<B, V> {
    branches: Arc<B>,
    versions: Arc<V>,
}

impl<B: BranchStore, V: VersionStore> LineageResolver<B, V> {
    /// Create a resolver over the given stores.
    pub fn new(branches: Arc<B>, versions: Arc<V>) -> Self {
        Self { branches, versions }
    }

    /// The branch store this resolver reads.
    pub fn branches(&self) -> &Arc<B> {
        &self.branches
    }

    /// Resolve a canonical object on a branch through lineage fallback.
    ///
    /// Absence (`Ok(None)`) is a valid outcome — it is what classifies an
    /// object as `Added` during a merge. Only an unknown branch id is an
    /// error.
    pub fn resolve(
        &self,
        branch_id: BranchId,
        canonical_id: CanonicalId,
    ) -> Result<Option<ObjectVersion>> {
        for ancestor in self.branches.ancestors(&branch_id)? {
            if let Some(head) = self.versions.head_on(&canonical_id, &ancestor)? {
                // The nearest branch that ever touched the object decides:
                // a tombstone here means deleted, regardless of ancestors.
                return Ok(if head.is_deleted() { None } else { Some(head) });
            }
        }
        Ok(None)
    }

    /// The nearest common ancestor branch of `target` and `source`.
    ///
    /// Ancestor closures include the branch itself, so fully-contained
    /// history falls out directly: if `source` is an ancestor of `target`
    /// the base is `source` (and vice versa). Among multiple candidates
    /// (diamond lineage) the nearest is the one with the largest ancestor
    /// closure — the deepest branch; ties break by earliest creation time,
    /// then by id, so the choice is deterministic.
    pub fn common_base(&self, target: BranchId, source: BranchId) -> Result<Option<BranchId>> {
        let target_closure = self.branches.ancestors(&target)?;
        let source_closure: HashSet<BranchId> =
            self.branches.ancestors(&source)?.into_iter().collect();

        let mut best: Option<(usize, chrono::DateTime<chrono::Utc>, BranchId)> = None;
        for candidate in target_closure.into_iter().filter(|c| source_closure.contains(c)) {
            let depth = self.branches.ancestors(&candidate)?.len();
            let created_at = self
                .branches
                .get(&candidate)?
                .ok_or(LineageError::BranchNotFound(candidate))?
                .created_at;

            let better = match &best {
                None => true,
                Some((best_depth, best_created, best_id)) => {
                    depth > *best_depth
                        || (depth == *best_depth
                            && (created_at < *best_created
                                || (created_at == *best_created && candidate < *best_id)))
                }
            };
            if better {
                best = Some((depth, created_at, candidate));
            }
        }

        Ok(best.map(|(_, _, id)| id))
    }

    /// Every canonical id with at least one version visible from the
    /// branch or any of its ancestors (tombstoned or not — callers
    /// re-resolve to find out).
    pub fn visible_canonicals(&self, branch_id: BranchId) -> Result<Vec<CanonicalId>> {
        let mut out = Vec::new();
        for ancestor in self.branches.ancestors(&branch_id)? {
            out.extend(self.versions.canonicals_on(&ancestor)?);
        }
        out.sort();
        out.dedup();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBranchStore;
    use serde_json::json;
    use strata_store::{InMemoryVersionStore, ObjectStore, PatchRequest, WriteRequest};
    use strata_types::Properties;

    struct Fixture {
        store: ObjectStore<InMemoryVersionStore>,
        branches: Arc<InMemoryBranchStore>,
        resolver: LineageResolver<InMemoryBranchStore, InMemoryVersionStore>,
    }

    fn fixture() -> Fixture {
        let versions = Arc::new(InMemoryVersionStore::new());
        let branches = Arc::new(InMemoryBranchStore::new());
        Fixture {
            store: ObjectStore::new(Arc::clone(&versions)),
            branches: Arc::clone(&branches),
            resolver: LineageResolver::new(branches, versions),
        }
    }

    fn props(pairs: &[(&str, serde_json::Value)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn resolves_branch_local_head() {
        let f = fixture();
        let main = f.branches.create("main", None, None).unwrap();
        let v1 = f
            .store
            .create(WriteRequest::new(main.id, "Doc", "k1"))
            .unwrap();

        let resolved = f.resolver.resolve(main.id, v1.canonical_id).unwrap();
        assert_eq!(resolved.unwrap().id, v1.id);
    }

    #[test]
    fn falls_back_to_ancestor() {
        let f = fixture();
        let main = f.branches.create("main", None, None).unwrap();
        let feature = f.branches.create("feature", None, Some(main.id)).unwrap();
        let v1 = f
            .store
            .create(WriteRequest::new(main.id, "Doc", "k1"))
            .unwrap();

        // Nothing written on feature; main's head shows through.
        let resolved = f.resolver.resolve(feature.id, v1.canonical_id).unwrap();
        assert_eq!(resolved.unwrap().id, v1.id);
    }

    #[test]
    fn branch_local_edit_shadows_ancestor() {
        let f = fixture();
        let main = f.branches.create("main", None, None).unwrap();
        let feature = f.branches.create("feature", None, Some(main.id)).unwrap();
        let v1 = f
            .store
            .create(
                WriteRequest::new(main.id, "Doc", "k1")
                    .with_properties(props(&[("title", json!("A"))])),
            )
            .unwrap();
        let v2 = f
            .store
            .patch(
                feature.id,
                v1.id,
                PatchRequest::properties(props(&[("title", json!("B"))])),
            )
            .unwrap();

        let on_feature = f.resolver.resolve(feature.id, v1.canonical_id).unwrap();
        assert_eq!(on_feature.unwrap().id, v2.id);
        // Main is untouched.
        let on_main = f.resolver.resolve(main.id, v1.canonical_id).unwrap();
        assert_eq!(on_main.unwrap().id, v1.id);
    }

    #[test]
    fn deletion_on_nearer_branch_shadows_live_ancestor() {
        let f = fixture();
        let main = f.branches.create("main", None, None).unwrap();
        let feature = f.branches.create("feature", None, Some(main.id)).unwrap();
        let v1 = f
            .store
            .create(WriteRequest::new(main.id, "Doc", "k1"))
            .unwrap();
        f.store.soft_delete(feature.id, v1.id).unwrap();

        // Deleted on feature, still alive on main.
        assert!(f.resolver.resolve(feature.id, v1.canonical_id).unwrap().is_none());
        assert!(f.resolver.resolve(main.id, v1.canonical_id).unwrap().is_some());
    }

    #[test]
    fn absence_is_a_valid_outcome() {
        let f = fixture();
        let main = f.branches.create("main", None, None).unwrap();
        assert!(f
            .resolver
            .resolve(main.id, CanonicalId::new())
            .unwrap()
            .is_none());
    }

    #[test]
    fn unknown_branch_is_an_error() {
        let f = fixture();
        assert!(matches!(
            f.resolver.resolve(BranchId::new(), CanonicalId::new()).unwrap_err(),
            LineageError::BranchNotFound(_)
        ));
    }

    #[test]
    fn common_base_of_siblings_is_the_parent() {
        let f = fixture();
        let main = f.branches.create("main", None, None).unwrap();
        let a = f.branches.create("a", None, Some(main.id)).unwrap();
        let b = f.branches.create("b", None, Some(main.id)).unwrap();

        assert_eq!(f.resolver.common_base(a.id, b.id).unwrap(), Some(main.id));
    }

    #[test]
    fn common_base_with_contained_history_is_the_ancestor() {
        let f = fixture();
        let main = f.branches.create("main", None, None).unwrap();
        let feature = f.branches.create("feature", None, Some(main.id)).unwrap();

        // Source is an ancestor of target (and vice versa).
        assert_eq!(
            f.resolver.common_base(feature.id, main.id).unwrap(),
            Some(main.id)
        );
        assert_eq!(
            f.resolver.common_base(main.id, feature.id).unwrap(),
            Some(main.id)
        );
    }

    #[test]
    fn common_base_picks_deepest_candidate() {
        let f = fixture();
        let root = f.branches.create("root", None, None).unwrap();
        let mid = f.branches.create("mid", None, Some(root.id)).unwrap();
        let left = f.branches.create("left", None, Some(mid.id)).unwrap();
        let right = f.branches.create("right", None, Some(mid.id)).unwrap();

        // Both root and mid are common ancestors; mid is nearer.
        assert_eq!(
            f.resolver.common_base(left.id, right.id).unwrap(),
            Some(mid.id)
        );
    }

    #[test]
    fn disjoint_roots_have_no_base() {
        let f = fixture();
        let a = f.branches.create("a", None, None).unwrap();
        let b = f.branches.create("b", None, None).unwrap();

        assert_eq!(f.resolver.common_base(a.id, b.id).unwrap(), None);
    }

    #[test]
    fn visible_canonicals_spans_ancestors() {
        let f = fixture();
        let main = f.branches.create("main", None, None).unwrap();
        let feature = f.branches.create("feature", None, Some(main.id)).unwrap();

        let on_main = f
            .store
            .create(WriteRequest::new(main.id, "Doc", "k1"))
            .unwrap();
        let on_feature = f
            .store
            .create(WriteRequest::new(feature.id, "Doc", "k2"))
            .unwrap();

        let visible = f.resolver.visible_canonicals(feature.id).unwrap();
        assert!(visible.contains(&on_main.canonical_id));
        assert!(visible.contains(&on_feature.canonical_id));

        // Main does not see the feature-only object.
        let from_main = f.resolver.visible_canonicals(main.id).unwrap();
        assert!(!from_main.contains(&on_feature.canonical_id));
    }
}
