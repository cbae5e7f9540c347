//! The merge orchestrator.
//!
//! Classification is three-way: each side's changes are measured against
//! the base version — the nearest version both heads' supersedes chains
//! share. The measurement reuses the change summaries computed eagerly at
//! write time; only when a chain is broken does the engine fall back to a
//! direct diff. Without any base the engine fails safe to Conflict.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use strata_diff::{content_hash, diff_properties, ChangeSummary, PropertyPath};
use strata_lineage::{BranchStore, LineageResolver};
use strata_provenance::{MergeProvenanceEdge, ProvenanceRole, ProvenanceStore};
use strata_store::{ObjectChanged, ObjectStore, ObjectVersion, VersionStore};
use strata_types::{BranchId, Properties, VersionId};

use crate::apply::apply_paths;
use crate::error::{MergeError, MergeResult};
use crate::outcome::{MergeMode, MergeOutcome, MergeSummary, ObjectMerge};

/// Merges a source branch into a target branch.
pub struct MergeEngine<B, V: VersionStore> {
    branches: Arc<B>,
    store: Arc<ObjectStore<V>>,
    resolver: LineageResolver<B, V>,
    provenance: Arc<dyn ProvenanceStore>,
}

/// Internal classification result, carrying what execute needs.
enum Decision {
    Added,
    Unchanged,
    FastForward {
        base: ObjectVersion,
        source_changes: ChangeSummary,
    },
    Conflict {
        base: Option<ObjectVersion>,
        paths: Vec<PropertyPath>,
    },
}

/// A merged version ready to commit, with its event and provenance edges.
struct Staged {
    object_index: usize,
    version: ObjectVersion,
    event: ObjectChanged,
    edges: Vec<MergeProvenanceEdge>,
}

impl<B: BranchStore, V: VersionStore> MergeEngine<B, V> {
    /// Create an engine over the given stores.
    pub fn new(
        branches: Arc<B>,
        store: Arc<ObjectStore<V>>,
        provenance: Arc<dyn ProvenanceStore>,
    ) -> Self {
        let resolver = LineageResolver::new(Arc::clone(&branches), Arc::clone(store.backend()));
        Self {
            branches,
            store,
            resolver,
            provenance,
        }
    }

    /// Classify every canonical object reachable from either branch and,
    /// in execute mode, commit the applicable ones atomically.
    ///
    /// Conflicts are returned in the summary, never raised. Unknown
    /// branch ids raise `BranchNotFound`.
    pub fn merge(
        &self,
        target: BranchId,
        source: BranchId,
        mode: MergeMode,
    ) -> MergeResult<MergeSummary> {
        self.branches
            .get(&target)?
            .ok_or(MergeError::BranchNotFound(target))?;
        self.branches
            .get(&source)?
            .ok_or(MergeError::BranchNotFound(source))?;

        let base_branch = self.resolver.common_base(target, source)?;

        let mut canonicals = self.resolver.visible_canonicals(target)?;
        canonicals.extend(self.resolver.visible_canonicals(source)?);
        canonicals.sort();
        canonicals.dedup();

        let mut objects: Vec<ObjectMerge> = Vec::with_capacity(canonicals.len());
        let mut staged: Vec<Staged> = Vec::new();

        for canonical_id in canonicals {
            let target_head = self.resolver.resolve(target, canonical_id)?;
            let source_head = self.resolver.resolve(source, canonical_id)?;
            let decision = self.classify(target_head.as_ref(), source_head.as_ref())?;

            let (outcome, base_version) = match &decision {
                Decision::Added => (MergeOutcome::Added, None),
                Decision::Unchanged => (MergeOutcome::Unchanged, None),
                Decision::FastForward { base, .. } => {
                    (MergeOutcome::FastForward, Some(base.id))
                }
                Decision::Conflict { base, paths } => (
                    MergeOutcome::Conflict {
                        conflicting_paths: paths.clone(),
                    },
                    base.as_ref().map(|b| b.id),
                ),
            };

            let report = ObjectMerge {
                canonical_id,
                outcome,
                target_head: target_head.as_ref().map(|v| v.id),
                source_head: source_head.as_ref().map(|v| v.id),
                base_version,
                merged_version: None,
            };

            if mode == MergeMode::Execute {
                match (&decision, target_head.as_ref(), source_head.as_ref()) {
                    (Decision::Added, _, Some(s)) => {
                        staged.push(self.stage_added(objects.len(), target, s)?);
                    }
                    (Decision::FastForward { base, source_changes }, Some(t), Some(s)) => {
                        staged.push(self.stage_fast_forward(
                            objects.len(),
                            target,
                            t,
                            s,
                            base,
                            source_changes,
                        )?);
                    }
                    _ => {}
                }
            }

            objects.push(report);
        }

        if mode == MergeMode::Execute && !staged.is_empty() {
            // One atomic commit for every merged version, then the
            // provenance edges explaining them.
            let rows: Vec<ObjectVersion> = staged.iter().map(|s| s.version.clone()).collect();
            let events: Vec<ObjectChanged> = staged.iter().map(|s| s.event.clone()).collect();
            self.store.commit_batch(rows, events)?;
            self.provenance
                .record(staged.iter().flat_map(|s| s.edges.clone()).collect())?;

            for st in &staged {
                objects[st.object_index].merged_version = Some(st.version.id);
            }
        }

        let summary = MergeSummary {
            target_branch: target,
            source_branch: source,
            base_branch,
            mode,
            objects,
        };
        info!(
            target = %target,
            source = %source,
            mode = ?mode,
            added = summary.added_count(),
            fast_forwarded = summary.fast_forward_count(),
            conflicted = summary.conflict_count(),
            unchanged = summary.unchanged_count(),
            "merge complete"
        );
        Ok(summary)
    }

    fn classify(
        &self,
        target_head: Option<&ObjectVersion>,
        source_head: Option<&ObjectVersion>,
    ) -> MergeResult<Decision> {
        let (t, s) = match (target_head, source_head) {
            (None, Some(_)) => return Ok(Decision::Added),
            // Nothing to merge: the source never saw the object (or
            // deleted it — deletions do not propagate).
            (_, None) => return Ok(Decision::Unchanged),
            (Some(t), Some(s)) => (t, s),
        };

        if t.content_hash == s.content_hash {
            return Ok(Decision::Unchanged);
        }

        let Some(base) = self.base_version(t, s)? else {
            // Fail safe: without a base the change sets cannot be
            // measured, so the divergence is reported where the trees
            // disagree.
            let paths = diff_properties(&t.properties, &s.properties)?
                .paths()
                .cloned()
                .collect();
            return Ok(Decision::Conflict { base: None, paths });
        };

        let target_changes = self.changed_since(t, &base)?;
        let source_changes = self.changed_since(s, &base)?;

        if source_changes.is_empty() {
            // All divergence is on the target side; the source brings
            // nothing new.
            return Ok(Decision::Unchanged);
        }

        if target_changes.overlaps(&source_changes) {
            Ok(Decision::Conflict {
                paths: target_changes.overlapping_paths(&source_changes),
                base: Some(base),
            })
        } else {
            Ok(Decision::FastForward {
                base,
                source_changes,
            })
        }
    }

    /// The nearest version both heads' supersedes chains share.
    fn base_version(
        &self,
        target_head: &ObjectVersion,
        source_head: &ObjectVersion,
    ) -> MergeResult<Option<ObjectVersion>> {
        let versions = self.store.backend();

        let mut source_chain = HashSet::new();
        let mut current = Some(source_head.clone());
        while let Some(row) = current {
            source_chain.insert(row.id);
            current = match row.supersedes {
                Some(prev) => versions.get(&prev)?,
                None => None,
            };
        }

        let mut current = Some(target_head.clone());
        while let Some(row) = current {
            if source_chain.contains(&row.id) {
                return Ok(Some(row));
            }
            current = match row.supersedes {
                Some(prev) => versions.get(&prev)?,
                None => None,
            };
        }
        Ok(None)
    }

    /// Changed paths between `base` and `head`, accumulated from the
    /// precomputed per-version summaries along the supersedes chain.
    fn changed_since(
        &self,
        head: &ObjectVersion,
        base: &ObjectVersion,
    ) -> MergeResult<ChangeSummary> {
        if head.id == base.id {
            return Ok(ChangeSummary::new());
        }

        let versions = self.store.backend();
        let mut acc = ChangeSummary::new();
        let mut current = head.clone();
        loop {
            acc.extend(&current.change_summary);
            match current.supersedes {
                Some(prev) if prev == base.id => return Ok(acc),
                Some(prev) => match versions.get(&prev)? {
                    Some(row) => current = row,
                    None => break,
                },
                None => break,
            }
        }

        // The chain did not reach the base; measure directly instead.
        Ok(diff_properties(&base.properties, &head.properties)?)
    }

    /// Copy the source head onto the target branch.
    fn stage_added(
        &self,
        object_index: usize,
        target: BranchId,
        source_head: &ObjectVersion,
    ) -> MergeResult<Staged> {
        // The target may hold a tombstone chain for this canonical (the
        // resolver reports those as absence); number past it.
        let target_floor = self
            .store
            .backend()
            .head_on(&source_head.canonical_id, &target)?
            .map(|h| h.version)
            .unwrap_or(0);

        let version = ObjectVersion {
            id: VersionId::new(),
            canonical_id: source_head.canonical_id,
            branch_id: target,
            object_type: source_head.object_type.clone(),
            key: source_head.key.clone(),
            properties: source_head.properties.clone(),
            labels: source_head.labels.clone(),
            status: source_head.status.clone(),
            version: source_head.version.max(target_floor) + 1,
            content_hash: source_head.content_hash,
            // Identical tree to the source head it supersedes.
            change_summary: ChangeSummary::new(),
            supersedes: Some(source_head.id),
            created_at: Utc::now(),
            deleted_at: None,
        };

        // On the target branch the whole object is new; the event says so.
        let changed_paths = diff_properties(&Properties::new(), &version.properties)?
            .paths()
            .cloned()
            .collect();
        let event = ObjectChanged {
            version_id: version.id,
            canonical_id: version.canonical_id,
            branch_id: target,
            object_type: version.object_type.clone(),
            changed_paths,
        };

        let edges = vec![MergeProvenanceEdge::new(
            version.id,
            source_head.id,
            ProvenanceRole::Source,
        )];

        debug!(canonical = %version.canonical_id, "staged added object");
        Ok(Staged {
            object_index,
            version,
            event,
            edges,
        })
    }

    /// Apply the source's changed paths over the target head.
    fn stage_fast_forward(
        &self,
        object_index: usize,
        target: BranchId,
        target_head: &ObjectVersion,
        source_head: &ObjectVersion,
        base: &ObjectVersion,
        source_changes: &ChangeSummary,
    ) -> MergeResult<Staged> {
        let source_paths: Vec<PropertyPath> = source_changes.paths().cloned().collect();
        let merged = apply_paths(&target_head.properties, &source_head.properties, &source_paths);
        let summary = diff_properties(&target_head.properties, &merged)?;
        let hash = content_hash(&merged)?;

        let version = ObjectVersion {
            id: VersionId::new(),
            canonical_id: target_head.canonical_id,
            branch_id: target,
            object_type: target_head.object_type.clone(),
            key: target_head.key.clone(),
            properties: merged,
            labels: target_head.labels.clone(),
            status: target_head.status.clone(),
            version: target_head.version.max(source_head.version) + 1,
            content_hash: hash,
            change_summary: summary.clone(),
            supersedes: Some(target_head.id),
            created_at: Utc::now(),
            deleted_at: None,
        };

        let event = ObjectChanged {
            version_id: version.id,
            canonical_id: version.canonical_id,
            branch_id: target,
            object_type: version.object_type.clone(),
            changed_paths: summary.paths().cloned().collect(),
        };

        let mut edges = vec![
            MergeProvenanceEdge::new(version.id, target_head.id, ProvenanceRole::Target),
            MergeProvenanceEdge::new(version.id, source_head.id, ProvenanceRole::Source),
        ];
        // The base contributed only if it is a distinct row.
        if base.id != target_head.id && base.id != source_head.id {
            edges.push(MergeProvenanceEdge::new(
                version.id,
                base.id,
                ProvenanceRole::Base,
            ));
        }

        debug!(
            canonical = %version.canonical_id,
            applied = source_paths.len(),
            "staged fast-forward"
        );
        Ok(Staged {
            object_index,
            version,
            event,
            edges,
        })
    }
}
