//! Merge result shapes: per-object outcomes and the overall summary.

use serde::{Deserialize, Serialize};

use strata_diff::PropertyPath;
use strata_types::{BranchId, CanonicalId, VersionId};

/// Whether a merge only classifies or also commits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeMode {
    /// Classify every object; write nothing.
    DryRun,
    /// Classify, then commit every Added/FastForward object atomically.
    Execute,
}

/// How one canonical object classified during a merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeOutcome {
    /// The object exists only on the source side; execute copies it onto
    /// the target branch.
    Added,
    /// Both sides diverged on disjoint property paths; execute applies
    /// the source's changes over the target head.
    FastForward,
    /// Divergent edits touched overlapping paths (or no base version was
    /// resolvable); never auto-applied.
    Conflict {
        /// The overlapping paths requiring human resolution.
        conflicting_paths: Vec<PropertyPath>,
    },
    /// Nothing to do: identical content on both sides, or nothing to
    /// merge from the source.
    Unchanged,
}

impl MergeOutcome {
    /// Returns `true` if execute mode writes a merged version for this
    /// outcome.
    pub fn is_applicable(&self) -> bool {
        matches!(self, Self::Added | Self::FastForward)
    }

    /// Short label for logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::FastForward => "fast_forward",
            Self::Conflict { .. } => "conflict",
            Self::Unchanged => "unchanged",
        }
    }
}

/// The classification of one canonical object, plus the version rows that
/// took part in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMerge {
    /// The object being classified.
    pub canonical_id: CanonicalId,
    /// The outcome.
    pub outcome: MergeOutcome,
    /// The head resolved on the target branch, if any.
    pub target_head: Option<VersionId>,
    /// The head resolved on the source branch, if any.
    pub source_head: Option<VersionId>,
    /// The common-ancestor version the change sets were measured against.
    pub base_version: Option<VersionId>,
    /// The version committed on the target branch (execute mode only).
    pub merged_version: Option<VersionId>,
}

/// The full result of a merge: per-object outcomes and counts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    /// The branch merged into.
    pub target_branch: BranchId,
    /// The branch merged from.
    pub source_branch: BranchId,
    /// The nearest common ancestor branch, when one exists.
    pub base_branch: Option<BranchId>,
    /// Dry-run or execute.
    pub mode: MergeMode,
    /// Per-object classifications.
    pub objects: Vec<ObjectMerge>,
}

impl MergeSummary {
    /// Number of objects classified Added.
    pub fn added_count(&self) -> usize {
        self.count(|o| matches!(o.outcome, MergeOutcome::Added))
    }

    /// Number of objects classified FastForward.
    pub fn fast_forward_count(&self) -> usize {
        self.count(|o| matches!(o.outcome, MergeOutcome::FastForward))
    }

    /// Number of objects classified Conflict.
    pub fn conflict_count(&self) -> usize {
        self.count(|o| matches!(o.outcome, MergeOutcome::Conflict { .. }))
    }

    /// Number of objects classified Unchanged.
    pub fn unchanged_count(&self) -> usize {
        self.count(|o| matches!(o.outcome, MergeOutcome::Unchanged))
    }

    /// Returns `true` if any object needs human resolution.
    pub fn has_conflicts(&self) -> bool {
        self.conflict_count() > 0
    }

    fn count(&self, f: impl Fn(&ObjectMerge) -> bool) -> usize {
        self.objects.iter().filter(|o| f(o)).count()
    }
}
