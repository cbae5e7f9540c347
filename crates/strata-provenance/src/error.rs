use strata_types::VersionId;

/// Errors raised by provenance recording.
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    /// An edge between this child and parent was already recorded. The
    /// store is append-only, so re-recording is always a caller bug.
    #[error("provenance edge already recorded: {child} -> {parent}")]
    DuplicateEdge { child: VersionId, parent: VersionId },
}

/// Convenience alias for provenance results.
pub type Result<T> = std::result::Result<T, ProvenanceError>;
