use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use strata_types::VersionId;

/// How a parent version contributed to a merged version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvenanceRole {
    /// The head that was current on the target branch.
    Target,
    /// The head that was merged in from the source branch.
    Source,
    /// The common-ancestor version the change sets were measured against.
    Base,
}

impl fmt::Display for ProvenanceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Target => "target",
            Self::Source => "source",
            Self::Base => "base",
        };
        write!(f, "{s}")
    }
}

/// A recorded parent → child contribution produced by a merge execute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeProvenanceEdge {
    /// The merged version that was produced.
    pub child: VersionId,
    /// A prior version that contributed to it.
    pub parent: VersionId,
    /// The parent's role in the merge.
    pub role: ProvenanceRole,
    /// When the edge was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl MergeProvenanceEdge {
    /// Create an edge recorded now.
    pub fn new(child: VersionId, parent: VersionId, role: ProvenanceRole) -> Self {
        Self {
            child,
            parent,
            role,
            recorded_at: Utc::now(),
        }
    }
}
