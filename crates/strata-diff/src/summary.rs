//! Change summaries: the structured result of diffing two property trees.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_types::ContentHash;

use crate::path::PropertyPath;

/// How a path changed between two property trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// The path exists only in the newer tree.
    Added,
    /// The path exists only in the older tree.
    Removed,
    /// The path exists in both trees with different values.
    Changed,
}

/// A snapshot of a leaf value carried inside a change summary.
///
/// Small values are stored inline for audit readability. Oversized values
/// are replaced by their digest and byte length, bounding row size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueSummary {
    /// The value verbatim.
    Inline(Value),
    /// Digest of a value too large to store verbatim.
    Digest { hash: ContentHash, bytes: usize },
}

impl ValueSummary {
    /// Returns the inline value, if this summary carries one.
    pub fn as_inline(&self) -> Option<&Value> {
        match self {
            Self::Inline(value) => Some(value),
            Self::Digest { .. } => None,
        }
    }

    /// Returns `true` if the value was truncated to a digest.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Digest { .. })
    }
}

/// A single path-addressed difference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathChange {
    /// Where the change happened.
    pub path: PropertyPath,
    /// Added, removed, or changed.
    pub kind: ChangeKind,
    /// The value before the change (`None` for additions).
    pub before: Option<ValueSummary>,
    /// The value after the change (`None` for removals).
    pub after: Option<ValueSummary>,
}

/// The set of path-addressed differences between two property trees.
///
/// Computed eagerly on every write against the superseded version and
/// stored on the new version row, so merge classification reads
/// precomputed summaries instead of re-diffing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    /// The list of path changes.
    pub changes: Vec<PathChange>,
}

impl ChangeSummary {
    /// Create an empty change summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of added paths.
    pub fn additions(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.kind == ChangeKind::Added)
            .count()
    }

    /// Number of removed paths.
    pub fn removals(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.kind == ChangeKind::Removed)
            .count()
    }

    /// Number of modified paths.
    pub fn modifications(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.kind == ChangeKind::Changed)
            .count()
    }

    /// Iterator over the changed paths.
    pub fn paths(&self) -> impl Iterator<Item = &PropertyPath> {
        self.changes.iter().map(|c| &c.path)
    }

    /// Absorb another summary's changes (used when accumulating the
    /// changes of several consecutive versions).
    pub fn extend(&mut self, other: &ChangeSummary) {
        self.changes.extend(other.changes.iter().cloned());
    }

    /// Returns `true` if any path in `self` overlaps any path in `other`
    /// (equal, or one a prefix of the other). Overlapping summaries are
    /// what turns a divergent edit pair into a conflict.
    pub fn overlaps(&self, other: &ChangeSummary) -> bool {
        self.paths()
            .any(|a| other.paths().any(|b| a.overlaps(b)))
    }

    /// The paths shared (by overlap) between the two summaries, for
    /// conflict reporting.
    pub fn overlapping_paths(&self, other: &ChangeSummary) -> Vec<PropertyPath> {
        let mut out: Vec<PropertyPath> = self
            .paths()
            .filter(|a| other.paths().any(|b| a.overlaps(b)))
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        out
    }
}
