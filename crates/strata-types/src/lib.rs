//! Foundation types for the strata knowledge-graph core.
//!
//! This crate provides the identifier, hash, and property-tree types used
//! throughout the strata workspace. Every other strata crate depends on
//! `strata-types`.
//!
//! # Key Types
//!
//! - [`CanonicalId`] — Logical object identity spanning all versions and branches
//! - [`VersionId`] — Identifier of one immutable object version row
//! - [`BranchId`] — Branch identifier
//! - [`ContentHash`] — 32-byte content hash over a canonicalized property tree
//! - [`Properties`] — Nested property tree (`BTreeMap<String, serde_json::Value>`)

pub mod error;
pub mod hash;
pub mod id;
pub mod properties;

pub use error::TypeError;
pub use hash::ContentHash;
pub use id::{BranchId, CanonicalId, VersionId};
pub use properties::{merge_delta, Properties};
