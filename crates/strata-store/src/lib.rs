//! Versioned object store for the strata knowledge-graph core.
//!
//! Objects are persisted as immutable version rows: every mutation inserts
//! a new row superseding the previous one, and soft deletion appends a
//! tombstone. The store enforces per-canonical write serialization and
//! optimistic concurrency, and computes each version's content hash and
//! change summary eagerly on write so merge classification never re-diffs.
//!
//! # Key Types
//!
//! - [`ObjectVersion`] — One immutable version row
//! - [`VersionStore`] — Storage backend trait
//! - [`InMemoryVersionStore`] — Backend for tests and embedding
//! - [`ObjectStore`] — The write path: create / patch / soft-delete
//! - [`SchemaRegistry`] / [`EventSink`] — External collaborator seams

pub mod error;
pub mod events;
pub mod keylock;
pub mod memory;
pub mod object;
pub mod schema;
pub mod store;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use events::{EventSink, MemorySink, NullSink, ObjectChanged};
pub use keylock::KeyLocks;
pub use memory::InMemoryVersionStore;
pub use object::{ObjectVersion, PatchRequest, WriteRequest};
pub use schema::{PermissiveRegistry, SchemaRegistry, SchemaViolation};
pub use store::ObjectStore;
pub use traits::VersionStore;
