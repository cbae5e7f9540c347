//! Schema-registry collaborator seam.
//!
//! Shape/type validation is owned by an external schema registry; this
//! crate only defines the boundary it is invoked through. Validation runs
//! before any row is persisted, and a rejection aborts the write.

use strata_types::Properties;

/// A schema-registry rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("schema rejected {object_type:?}: {reason}")]
pub struct SchemaViolation {
    pub object_type: String,
    pub reason: String,
}

/// Pre-commit shape/type validation boundary.
pub trait SchemaRegistry: Send + Sync {
    /// Validate an object's properties against its type's schema.
    fn validate(&self, object_type: &str, properties: &Properties) -> Result<(), SchemaViolation>;
}

/// Registry that accepts every write. The default when no external
/// registry is wired in.
pub struct PermissiveRegistry;

impl SchemaRegistry for PermissiveRegistry {
    fn validate(&self, _object_type: &str, _properties: &Properties) -> Result<(), SchemaViolation> {
        Ok(())
    }
}
