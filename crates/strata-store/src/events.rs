//! Outbound object-changed events.
//!
//! Every successful write publishes an [`ObjectChanged`] event naming the
//! paths that changed, consumed by the external embedding/indexing
//! pipeline for selective re-embedding. Delivery is fire-and-forget from
//! the store's point of view.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use strata_diff::PropertyPath;
use strata_types::{BranchId, CanonicalId, VersionId};

/// Notification that a new object version was committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectChanged {
    /// The newly inserted version row.
    pub version_id: VersionId,
    /// Logical object identity.
    pub canonical_id: CanonicalId,
    /// Branch the write landed on.
    pub branch_id: BranchId,
    /// Domain type of the object.
    pub object_type: String,
    /// Paths changed relative to the superseded version.
    pub changed_paths: Vec<PropertyPath>,
}

/// Consumer boundary for object-changed events.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: ObjectChanged);
}

/// Sink that drops every event. The default when no pipeline is wired in.
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: ObjectChanged) {}
}

/// Sink that records events in memory, for tests and local inspection.
#[derive(Default)]
pub struct MemorySink {
    events: RwLock<Vec<ObjectChanged>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events published so far, in order.
    pub fn events(&self) -> Vec<ObjectChanged> {
        self.events.read().expect("lock poisoned").clone()
    }

    /// Number of events published so far.
    pub fn len(&self) -> usize {
        self.events.read().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing was published.
    pub fn is_empty(&self) -> bool {
        self.events.read().expect("lock poisoned").is_empty()
    }
}

impl EventSink for MemorySink {
    fn publish(&self, event: ObjectChanged) {
        self.events.write().expect("lock poisoned").push(event);
    }
}
