//! Domain-level error taxonomy for the similarity pipeline.
//!
//! Only two classes of failure reach the caller of a check run: a missing
//! target submission (no report row is ever created) and a storage write
//! the report store rejected. Everything else is either recorded on the
//! report itself or absorbed per-peer.

/// Fatal errors of one pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] simcheck_store::StorageError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, CheckError>;
