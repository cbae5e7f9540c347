use std::sync::Arc;

use strata_lineage::{Branch, BranchStore, InMemoryBranchStore, LineageResolver};
use strata_merge::{MergeEngine, MergeMode, MergeSummary};
use strata_provenance::{InMemoryProvenanceStore, ProvenanceStore, ProvenanceTrail};
use strata_store::{
    EventSink, InMemoryVersionStore, NullSink, ObjectStore, ObjectVersion, PatchRequest,
    PermissiveRegistry, SchemaRegistry, VersionStore, WriteRequest,
};
use strata_types::{BranchId, CanonicalId, VersionId};

use crate::error::GraphResult;

/// The assembled knowledge-graph core.
///
/// Owns an in-memory store set wired together: the object store, branch
/// store, lineage resolver, merge engine, and provenance recorder.
pub struct KnowledgeGraph {
    branches: Arc<InMemoryBranchStore>,
    store: Arc<ObjectStore<InMemoryVersionStore>>,
    resolver: LineageResolver<InMemoryBranchStore, InMemoryVersionStore>,
    provenance: Arc<InMemoryProvenanceStore>,
    engine: MergeEngine<InMemoryBranchStore, InMemoryVersionStore>,
}

impl KnowledgeGraph {
    /// Assemble a graph with a permissive schema registry and no event
    /// consumers.
    pub fn new() -> Self {
        Self::with_collaborators(Arc::new(PermissiveRegistry), Arc::new(NullSink))
    }

    /// Assemble a graph wired to an external schema registry and event
    /// sink.
    pub fn with_collaborators(
        schema: Arc<dyn SchemaRegistry>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let backend = Arc::new(InMemoryVersionStore::new());
        let store = Arc::new(ObjectStore::with_collaborators(
            Arc::clone(&backend),
            schema,
            events,
        ));
        let branches = Arc::new(InMemoryBranchStore::new());
        let provenance = Arc::new(InMemoryProvenanceStore::new());
        let resolver = LineageResolver::new(Arc::clone(&branches), backend);
        let engine = MergeEngine::new(
            Arc::clone(&branches),
            Arc::clone(&store),
            Arc::clone(&provenance) as Arc<dyn ProvenanceStore>,
        );
        Self {
            branches,
            store,
            resolver,
            provenance,
            engine,
        }
    }

    // ---- Branch operations ----

    /// Create a branch, optionally scoped to a project and forked from a
    /// parent.
    pub fn create_branch(
        &self,
        name: &str,
        project_id: Option<uuid::Uuid>,
        parent: Option<BranchId>,
    ) -> GraphResult<Branch> {
        Ok(self.branches.create(name, project_id, parent)?)
    }

    /// Read a branch by id.
    pub fn branch(&self, id: BranchId) -> GraphResult<Option<Branch>> {
        Ok(self.branches.get(&id)?)
    }

    /// List branches, optionally filtered by project.
    pub fn list_branches(&self, project_id: Option<uuid::Uuid>) -> GraphResult<Vec<Branch>> {
        Ok(self.branches.list(project_id)?)
    }

    // ---- Object operations ----

    /// Create a fresh canonical object at version 1.
    pub fn create_object(&self, request: WriteRequest) -> GraphResult<ObjectVersion> {
        Ok(self.store.create(request)?)
    }

    /// Read one version row by id.
    pub fn get_object(&self, id: VersionId) -> GraphResult<Option<ObjectVersion>> {
        Ok(self.store.backend().get(&id)?)
    }

    /// What the canonical object looks like on a branch, through lineage
    /// fallback. Absence is a valid answer.
    pub fn resolve(
        &self,
        branch_id: BranchId,
        canonical_id: CanonicalId,
    ) -> GraphResult<Option<ObjectVersion>> {
        Ok(self.resolver.resolve(branch_id, canonical_id)?)
    }

    /// Patch the version the caller read, producing version N+1 on the
    /// given branch.
    pub fn patch_object(
        &self,
        branch_id: BranchId,
        version_id: VersionId,
        patch: PatchRequest,
    ) -> GraphResult<ObjectVersion> {
        Ok(self.store.patch(branch_id, version_id, patch)?)
    }

    /// Soft-delete the object on the given branch.
    pub fn delete_object(
        &self,
        branch_id: BranchId,
        version_id: VersionId,
    ) -> GraphResult<ObjectVersion> {
        Ok(self.store.soft_delete(branch_id, version_id)?)
    }

    /// Every version row of a canonical object, oldest first, tombstones
    /// included.
    pub fn history(&self, canonical_id: CanonicalId) -> GraphResult<Vec<ObjectVersion>> {
        Ok(self.store.backend().versions_of(&canonical_id)?)
    }

    // ---- Merge operations ----

    /// Classify (and in execute mode, apply) a merge of `source` into
    /// `target`.
    pub fn merge(
        &self,
        target: BranchId,
        source: BranchId,
        mode: MergeMode,
    ) -> GraphResult<MergeSummary> {
        Ok(self.engine.merge(target, source, mode)?)
    }

    /// Reconstruct how a version was produced from recorded provenance.
    pub fn explain(&self, version_id: VersionId) -> GraphResult<ProvenanceTrail> {
        Ok(ProvenanceTrail::explain(&*self.provenance, version_id)?)
    }
}

impl Default for KnowledgeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_merge::MergeOutcome;
    use strata_provenance::ProvenanceRole;
    use strata_types::Properties;

    fn props(pairs: &[(&str, serde_json::Value)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// The full lifecycle: create on main, fork, diverge on disjoint
    /// paths, merge back, audit the merged version.
    #[test]
    fn branch_diverge_merge_audit() {
        let graph = KnowledgeGraph::new();
        let main = graph.create_branch("main", None, None).unwrap();
        let doc = graph
            .create_object(
                WriteRequest::new(main.id, "Doc", "k1")
                    .with_properties(props(&[("title", json!("A"))])),
            )
            .unwrap();

        let feature = graph
            .create_branch("feature", None, Some(main.id))
            .unwrap();

        // Diverge: body on feature, title on main.
        let on_feature = graph
            .patch_object(
                feature.id,
                doc.id,
                PatchRequest::properties(props(&[("body", json!("x"))])),
            )
            .unwrap();
        graph
            .patch_object(
                main.id,
                doc.id,
                PatchRequest::properties(props(&[("title", json!("B"))])),
            )
            .unwrap();

        // Each branch sees its own head.
        assert_eq!(
            graph
                .resolve(feature.id, doc.canonical_id)
                .unwrap()
                .unwrap()
                .id,
            on_feature.id
        );

        let summary = graph
            .merge(main.id, feature.id, MergeMode::Execute)
            .unwrap();
        assert_eq!(summary.fast_forward_count(), 1);
        assert!(!summary.has_conflicts());

        let merged = graph
            .resolve(main.id, doc.canonical_id)
            .unwrap()
            .expect("merged head should resolve");
        assert_eq!(
            merged.properties,
            props(&[("title", json!("B")), ("body", json!("x"))])
        );

        // The audit trail names every contributor.
        let trail = graph.explain(merged.id).unwrap();
        assert_eq!(trail.len(), 3);
        assert!(trail
            .chain
            .iter()
            .any(|e| e.role == ProvenanceRole::Source && e.parent == on_feature.id));

        // Full history is reconstructable: v1, two divergent v2s, merged v3.
        assert_eq!(graph.history(doc.canonical_id).unwrap().len(), 4);
    }

    #[test]
    fn conflicting_merge_reports_without_writing() {
        let graph = KnowledgeGraph::new();
        let main = graph.create_branch("main", None, None).unwrap();
        let doc = graph
            .create_object(
                WriteRequest::new(main.id, "Doc", "k1")
                    .with_properties(props(&[("title", json!("A"))])),
            )
            .unwrap();
        let feature = graph
            .create_branch("feature", None, Some(main.id))
            .unwrap();

        graph
            .patch_object(
                feature.id,
                doc.id,
                PatchRequest::properties(props(&[("title", json!("feature"))])),
            )
            .unwrap();
        let main_head = graph
            .patch_object(
                main.id,
                doc.id,
                PatchRequest::properties(props(&[("title", json!("main"))])),
            )
            .unwrap();

        let summary = graph
            .merge(main.id, feature.id, MergeMode::Execute)
            .unwrap();
        assert!(summary.has_conflicts());
        assert!(matches!(
            summary.objects[0].outcome,
            MergeOutcome::Conflict { .. }
        ));

        // Target head untouched; nothing to explain.
        let head = graph.resolve(main.id, doc.canonical_id).unwrap().unwrap();
        assert_eq!(head.id, main_head.id);
        assert!(graph.explain(head.id).unwrap().is_empty());
    }

    #[test]
    fn deleted_objects_vanish_from_resolution_but_not_history() {
        let graph = KnowledgeGraph::new();
        let main = graph.create_branch("main", None, None).unwrap();
        let doc = graph
            .create_object(WriteRequest::new(main.id, "Doc", "k1"))
            .unwrap();

        graph.delete_object(main.id, doc.id).unwrap();

        assert!(graph.resolve(main.id, doc.canonical_id).unwrap().is_none());
        let history = graph.history(doc.canonical_id).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[1].is_deleted());
    }

    #[test]
    fn branches_are_project_scoped() {
        let graph = KnowledgeGraph::new();
        let project = uuid::Uuid::now_v7();
        graph.create_branch("main", Some(project), None).unwrap();
        graph.create_branch("main", None, None).unwrap();

        assert_eq!(graph.list_branches(Some(project)).unwrap().len(), 1);
        assert_eq!(graph.list_branches(None).unwrap().len(), 2);
    }
}
