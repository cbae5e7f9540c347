//! The object write path: create, patch, soft-delete.
//!
//! Every mutation validates against the schema registry, runs inside the
//! canonical object's serialization token, re-verifies staleness under
//! that token, computes the new row's content hash and change summary
//! eagerly, and publishes an object-changed event after the insert.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use strata_diff::{content_hash, diff_properties};
use strata_types::{merge_delta, BranchId, Properties, VersionId};

use crate::error::{StoreError, StoreResult};
use crate::events::{EventSink, NullSink, ObjectChanged};
use crate::keylock::KeyLocks;
use crate::object::{ObjectVersion, PatchRequest, WriteRequest};
use crate::schema::{PermissiveRegistry, SchemaRegistry};
use crate::traits::VersionStore;

/// High-level object store over a [`VersionStore`] backend.
pub struct ObjectStore<S: VersionStore> {
    backend: Arc<S>,
    schema: Arc<dyn SchemaRegistry>,
    events: Arc<dyn EventSink>,
    locks: KeyLocks,
}

impl<S: VersionStore> ObjectStore<S> {
    /// Create a store with a permissive schema registry and no event
    /// consumers.
    pub fn new(backend: Arc<S>) -> Self {
        Self::with_collaborators(backend, Arc::new(PermissiveRegistry), Arc::new(NullSink))
    }

    /// Create a store wired to external collaborators.
    pub fn with_collaborators(
        backend: Arc<S>,
        schema: Arc<dyn SchemaRegistry>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            backend,
            schema,
            events,
            locks: KeyLocks::new(),
        }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &Arc<S> {
        &self.backend
    }

    /// Create a fresh canonical object at version 1.
    ///
    /// Fails with `DuplicateKey` if a live object with the same
    /// (type, key) already exists on the branch; the backend re-verifies
    /// the key claim under its own write lock, so concurrent creates
    /// cannot both win.
    pub fn create(&self, request: WriteRequest) -> StoreResult<ObjectVersion> {
        self.schema
            .validate(&request.object_type, &request.properties)?;

        if let Some(existing) =
            self.backend
                .live_by_key(&request.branch_id, &request.object_type, &request.key)?
        {
            return Err(StoreError::DuplicateKey {
                object_type: existing.object_type,
                key: existing.key,
                branch_id: request.branch_id,
            });
        }

        let id = VersionId::new();
        let summary = diff_properties(&Properties::new(), &request.properties)?;
        let version = ObjectVersion {
            id,
            canonical_id: id.as_canonical(),
            branch_id: request.branch_id,
            object_type: request.object_type,
            key: request.key,
            content_hash: content_hash(&request.properties)?,
            change_summary: summary,
            properties: request.properties,
            labels: request.labels,
            status: request.status,
            version: 1,
            supersedes: None,
            created_at: Utc::now(),
            deleted_at: None,
        };

        self.backend.insert(version.clone())?;
        debug!(
            canonical = %version.canonical_id,
            branch = %version.branch_id,
            object_type = %version.object_type,
            "created object"
        );
        self.publish(&version);
        Ok(version)
    }

    /// Merge a delta into the version the caller read, inserting version
    /// N+1 on the request branch.
    ///
    /// Optimistic concurrency: the caller's `version_id` must still be the
    /// branch's head for the canonical object (checked again under the
    /// serialization token). A patch that changes nothing is skipped and
    /// returns the current head unchanged.
    pub fn patch(
        &self,
        branch_id: BranchId,
        version_id: VersionId,
        patch: PatchRequest,
    ) -> StoreResult<ObjectVersion> {
        let base = self
            .backend
            .get(&version_id)?
            .ok_or(StoreError::VersionNotFound(version_id))?;

        let merged = merge_delta(&base.properties, &patch.properties);
        self.schema.validate(&base.object_type, &merged)?;

        let canonical_id = base.canonical_id;
        self.locks.with_key(canonical_id, || {
            self.check_head(&base, branch_id, version_id)?;

            let hash = content_hash(&merged)?;
            if hash == base.content_hash && patch.labels.is_none() && patch.status.is_none() {
                // No-op: equal content hash, nothing else touched.
                return Ok(base.clone());
            }

            let summary = diff_properties(&base.properties, &merged)?;
            let version = ObjectVersion {
                id: VersionId::new(),
                canonical_id,
                branch_id,
                object_type: base.object_type.clone(),
                key: base.key.clone(),
                properties: merged.clone(),
                labels: patch.labels.clone().unwrap_or_else(|| base.labels.clone()),
                status: patch.status.clone().or_else(|| base.status.clone()),
                version: base.version + 1,
                content_hash: hash,
                change_summary: summary,
                supersedes: Some(base.id),
                created_at: Utc::now(),
                deleted_at: None,
            };

            self.backend.insert(version.clone())?;
            debug!(
                canonical = %canonical_id,
                branch = %branch_id,
                version = version.version,
                changed = version.change_summary.len(),
                "patched object"
            );
            self.publish(&version);
            Ok(version)
        })
    }

    /// Append a tombstone version, marking the object deleted on the
    /// request branch. Same staleness discipline as [`ObjectStore::patch`].
    pub fn soft_delete(
        &self,
        branch_id: BranchId,
        version_id: VersionId,
    ) -> StoreResult<ObjectVersion> {
        let base = self
            .backend
            .get(&version_id)?
            .ok_or(StoreError::VersionNotFound(version_id))?;

        let canonical_id = base.canonical_id;
        self.locks.with_key(canonical_id, || {
            self.check_head(&base, branch_id, version_id)?;

            // The tombstone's tree is empty: deletion reads as "every path
            // removed" to the diff engine and to re-indexing consumers.
            let summary = diff_properties(&base.properties, &Properties::new())?;
            let version = ObjectVersion {
                id: VersionId::new(),
                canonical_id,
                branch_id,
                object_type: base.object_type.clone(),
                key: base.key.clone(),
                properties: Properties::new(),
                labels: base.labels.clone(),
                status: base.status.clone(),
                version: base.version + 1,
                content_hash: content_hash(&Properties::new())?,
                change_summary: summary,
                supersedes: Some(base.id),
                created_at: Utc::now(),
                deleted_at: Some(Utc::now()),
            };

            self.backend.insert(version.clone())?;
            debug!(
                canonical = %canonical_id,
                branch = %branch_id,
                version = version.version,
                "soft-deleted object"
            );
            self.publish(&version);
            Ok(version)
        })
    }

    /// Commit merge-built versions in one atomic batch, then publish the
    /// prepared events. Used by the merge engine's execute path, which
    /// knows what each merged row means on the target branch better than
    /// the row's own change summary does.
    pub fn commit_batch(
        &self,
        versions: Vec<ObjectVersion>,
        events: Vec<ObjectChanged>,
    ) -> StoreResult<()> {
        self.backend.insert_batch(versions)?;
        for event in events {
            self.events.publish(event);
        }
        Ok(())
    }

    /// Staleness check, run under the canonical's serialization token:
    /// the caller's version must still be the head the branch sees.
    fn check_head(
        &self,
        base: &ObjectVersion,
        branch_id: BranchId,
        version_id: VersionId,
    ) -> StoreResult<()> {
        let canonical_id = base.canonical_id;
        match self.backend.head_on(&canonical_id, &branch_id)? {
            Some(head) if head.is_deleted() => Err(StoreError::Deleted {
                canonical_id,
                branch_id,
            }),
            Some(head) if head.id != version_id => Err(StoreError::StaleVersion {
                given: version_id,
                head: head.id,
                canonical_id,
                branch_id,
            }),
            Some(_) => Ok(()),
            None => {
                // First write on this branch: the caller must have read
                // the head of the branch the base row lives on.
                if base.is_deleted() {
                    return Err(StoreError::Deleted {
                        canonical_id,
                        branch_id: base.branch_id,
                    });
                }
                match self.backend.head_on(&canonical_id, &base.branch_id)? {
                    Some(own_head) if own_head.id == version_id => Ok(()),
                    Some(own_head) => Err(StoreError::StaleVersion {
                        given: version_id,
                        head: own_head.id,
                        canonical_id,
                        branch_id: base.branch_id,
                    }),
                    None => Err(StoreError::VersionNotFound(version_id)),
                }
            }
        }
    }

    fn publish(&self, version: &ObjectVersion) {
        self.events.publish(ObjectChanged {
            version_id: version.id,
            canonical_id: version.canonical_id,
            branch_id: version.branch_id,
            object_type: version.object_type.clone(),
            changed_paths: version.change_summary.paths().cloned().collect(),
        });
    }
}
