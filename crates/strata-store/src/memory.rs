use std::collections::HashMap;
use std::sync::RwLock;

use strata_types::{BranchId, CanonicalId, VersionId};

use crate::error::{StoreError, StoreResult};
use crate::object::ObjectVersion;
use crate::traits::VersionStore;

/// In-memory, HashMap-based version store.
///
/// Intended for tests and embedding. All rows are held in memory behind a
/// `RwLock`; rows are cloned on read. Batch inserts validate the whole
/// batch under one write-lock acquisition before applying anything, which
/// is this backend's equivalent of a database transaction.
pub struct InMemoryVersionStore {
    inner: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    by_id: HashMap<VersionId, ObjectVersion>,
    by_canonical: HashMap<CanonicalId, Vec<VersionId>>,
    heads: HashMap<(CanonicalId, BranchId), VersionId>,
    live_keys: HashMap<(BranchId, String, String), CanonicalId>,
}

impl InMemoryVersionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreState::default()),
        }
    }

    /// Number of version rows currently stored.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").by_id.len()
    }

    /// Returns `true` if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").by_id.is_empty()
    }

    fn validate(state: &StoreState, version: &ObjectVersion) -> StoreResult<()> {
        if state.by_id.contains_key(&version.id) {
            return Err(StoreError::Integrity(format!(
                "duplicate version row id {}",
                version.id
            )));
        }

        if let Some(head_id) = state.heads.get(&(version.canonical_id, version.branch_id)) {
            let head = &state.by_id[head_id];
            if version.version <= head.version {
                return Err(StoreError::Integrity(format!(
                    "non-monotonic append for {} on {}: version {} after head {}",
                    version.canonical_id, version.branch_id, version.version, head.version
                )));
            }
        }

        let key = (
            version.branch_id,
            version.object_type.clone(),
            version.key.clone(),
        );
        if !version.is_deleted() {
            if let Some(holder) = state.live_keys.get(&key) {
                if *holder != version.canonical_id {
                    return Err(StoreError::DuplicateKey {
                        object_type: version.object_type.clone(),
                        key: version.key.clone(),
                        branch_id: version.branch_id,
                    });
                }
            }
        }

        Ok(())
    }

    fn apply(state: &mut StoreState, version: ObjectVersion) {
        let key = (
            version.branch_id,
            version.object_type.clone(),
            version.key.clone(),
        );
        if version.is_deleted() {
            if state.live_keys.get(&key) == Some(&version.canonical_id) {
                state.live_keys.remove(&key);
            }
        } else {
            state.live_keys.insert(key, version.canonical_id);
        }

        state
            .heads
            .insert((version.canonical_id, version.branch_id), version.id);
        state
            .by_canonical
            .entry(version.canonical_id)
            .or_default()
            .push(version.id);
        state.by_id.insert(version.id, version);
    }
}

impl Default for InMemoryVersionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionStore for InMemoryVersionStore {
    fn insert(&self, version: ObjectVersion) -> StoreResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");
        Self::validate(&state, &version)?;
        Self::apply(&mut state, version);
        Ok(())
    }

    fn insert_batch(&self, versions: Vec<ObjectVersion>) -> StoreResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");

        // Validate the whole batch first so a failure applies nothing.
        let mut batch_pairs = Vec::with_capacity(versions.len());
        for version in &versions {
            Self::validate(&state, version)?;
            let pair = (version.canonical_id, version.branch_id);
            if batch_pairs.contains(&pair) {
                return Err(StoreError::Integrity(format!(
                    "batch contains two rows for {} on {}",
                    version.canonical_id, version.branch_id
                )));
            }
            batch_pairs.push(pair);
        }

        for version in versions {
            Self::apply(&mut state, version);
        }
        Ok(())
    }

    fn get(&self, id: &VersionId) -> StoreResult<Option<ObjectVersion>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.by_id.get(id).cloned())
    }

    fn head_on(
        &self,
        canonical_id: &CanonicalId,
        branch_id: &BranchId,
    ) -> StoreResult<Option<ObjectVersion>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .heads
            .get(&(*canonical_id, *branch_id))
            .map(|id| state.by_id[id].clone()))
    }

    fn live_by_key(
        &self,
        branch_id: &BranchId,
        object_type: &str,
        key: &str,
    ) -> StoreResult<Option<ObjectVersion>> {
        let state = self.inner.read().expect("lock poisoned");
        let lookup = (*branch_id, object_type.to_string(), key.to_string());
        let Some(canonical_id) = state.live_keys.get(&lookup) else {
            return Ok(None);
        };
        Ok(state
            .heads
            .get(&(*canonical_id, *branch_id))
            .map(|id| state.by_id[id].clone())
            .filter(|head| !head.is_deleted()))
    }

    fn canonicals_on(&self, branch_id: &BranchId) -> StoreResult<Vec<CanonicalId>> {
        let state = self.inner.read().expect("lock poisoned");
        let mut out: Vec<CanonicalId> = state
            .heads
            .keys()
            .filter(|(_, b)| b == branch_id)
            .map(|(c, _)| *c)
            .collect();
        out.sort();
        out.dedup();
        Ok(out)
    }

    fn versions_of(&self, canonical_id: &CanonicalId) -> StoreResult<Vec<ObjectVersion>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .by_canonical
            .get(canonical_id)
            .map(|ids| ids.iter().map(|id| state.by_id[id].clone()).collect())
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for InMemoryVersionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVersionStore")
            .field("row_count", &self.len())
            .finish()
    }
}
