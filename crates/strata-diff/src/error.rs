//! Error types for the diff crate.

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A path string could not be parsed.
    #[error("invalid property path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Serialization of a value for hashing failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
