use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use strata_diff::ChangeSummary;
use strata_types::{BranchId, CanonicalId, ContentHash, Properties, VersionId};

/// One immutable object version row.
///
/// Rows are never mutated: a patch inserts the next `version` with
/// `supersedes` pointing at the row it was built from, and a soft delete
/// appends a tombstone carrying `deleted_at`. The full row set per
/// canonical id reconstructs the object's history across branches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectVersion {
    /// Row identifier.
    pub id: VersionId,
    /// Logical identity shared by all versions of this object.
    pub canonical_id: CanonicalId,
    /// Branch this row was written on.
    pub branch_id: BranchId,
    /// Domain type of the object (e.g. "Requirement", "Doc").
    pub object_type: String,
    /// Stable business key, unique per (object_type, branch) among live objects.
    pub key: String,
    /// Nested property tree.
    pub properties: Properties,
    /// Free-form labels.
    pub labels: Vec<String>,
    /// Lifecycle status (e.g. "draft", "approved").
    pub status: Option<String>,
    /// Monotonic version number along the supersedes chain.
    pub version: u64,
    /// Stable hash over the canonicalized property tree.
    pub content_hash: ContentHash,
    /// Paths changed relative to the superseded version (all additions
    /// for version 1).
    pub change_summary: ChangeSummary,
    /// The version this row was built from, if any.
    pub supersedes: Option<VersionId>,
    /// When this row was inserted.
    pub created_at: DateTime<Utc>,
    /// Tombstone marker; a set value means the object is deleted as of
    /// this version.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ObjectVersion {
    /// Returns `true` if this row is a tombstone.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for creating a fresh canonical object (version 1).
#[derive(Clone, Debug)]
pub struct WriteRequest {
    pub branch_id: BranchId,
    pub object_type: String,
    pub key: String,
    pub properties: Properties,
    pub labels: Vec<String>,
    pub status: Option<String>,
}

impl WriteRequest {
    /// Minimal request with empty properties and labels.
    pub fn new(branch_id: BranchId, object_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            branch_id,
            object_type: object_type.into(),
            key: key.into(),
            properties: Properties::new(),
            labels: Vec::new(),
            status: None,
        }
    }

    /// Attach properties.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Attach labels.
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Attach a lifecycle status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Input for patching an existing object.
///
/// `properties` is a top-level delta: present keys replace, explicit JSON
/// nulls remove. `labels` and `status` replace wholesale when given.
#[derive(Clone, Debug, Default)]
pub struct PatchRequest {
    pub properties: Properties,
    pub labels: Option<Vec<String>>,
    pub status: Option<String>,
}

impl PatchRequest {
    /// A patch that only touches properties.
    pub fn properties(delta: Properties) -> Self {
        Self {
            properties: delta,
            labels: None,
            status: None,
        }
    }
}
