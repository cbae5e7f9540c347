//! Diff engine for the strata knowledge-graph core.
//!
//! Compares two property trees and produces a path-addressed change summary
//! plus a stable content hash over the canonicalized tree. The change
//! summary is computed eagerly on every write and consumed by the merge
//! engine, where the path-overlap test decides fast-forward versus conflict.
//!
//! # Key Types
//!
//! - [`PropertyPath`] — Slash-addressed location of a property leaf or subtree
//! - [`ChangeSummary`] / [`PathChange`] — Structured diff between two trees
//! - [`ValueSummary`] — Inline or digest-truncated snapshot of a leaf value
//! - [`TreeHasher`] — Domain-separated BLAKE3 hashing of canonical JSON

pub mod diff;
pub mod error;
pub mod hasher;
pub mod path;
pub mod summary;

pub use diff::{content_hash, diff_properties, MAX_INLINE_VALUE_BYTES};
pub use error::{DiffError, DiffResult};
pub use hasher::TreeHasher;
pub use path::PropertyPath;
pub use summary::{ChangeKind, ChangeSummary, PathChange, ValueSummary};
