//! Storage trait definitions for simcheck
//!
//! These traits define the persistence boundary of the similarity pipeline:
//! - `SubmissionDirectory`: read-only lookup of event submissions
//! - `ReportStore`: plagiarism report lifecycle persistence
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// A code submission entered into a competitive event.
///
/// Owned by the surrounding application; the pipeline only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Submission identifier
    pub id: String,
    /// Event this submission belongs to
    pub event_id: String,
    /// Repository locator handed to the materializer
    pub repo_url: String,
}

/// Read-only directory of event submissions.
#[async_trait]
pub trait SubmissionDirectory: Send + Sync {
    /// Look up a submission by id. Returns `None` if absent.
    async fn get_submission(&self, id: &str) -> StorageResult<Option<Submission>>;

    /// All other submissions in the event, excluding `excluding`.
    async fn list_peers(
        &self,
        event_id: &str,
        excluding: &str,
    ) -> StorageResult<Vec<Submission>>;
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Unique identifier for a plagiarism report
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl ReportId {
    /// Generate a new random ReportId
    pub fn new() -> Self {
        ReportId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of comparing the target submission against one peer.
///
/// Every peer in scope yields exactly one entry; a failed comparison
/// records `similarity = 0.0`, never an absent entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// The peer submission compared against
    pub other_submission_id: String,
    /// The peer's repository locator
    pub other_repo_url: String,
    /// Similarity score in [0, 1]
    pub similarity: f64,
    /// Opaque payload from the oracle, when one scored this pair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Status of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Completed,
    Failed,
}

/// Persisted record of one similarity-check run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlagiarismReport {
    pub id: ReportId,
    pub event_id: String,
    pub submission_id: String,
    pub repo_url: String,
    pub status: ReportStatus,
    /// Sorted non-increasing by `similarity`; written in full exactly once,
    /// at completion.
    pub similarities: Vec<SimilarityResult>,
    /// Captured failure message when `status` is `Failed`
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Plagiarism report persistence.
///
/// Guarantees:
/// - A report is created in `Pending` and transitions exactly once to
///   `Completed` or `Failed` (terminal).
/// - `similarities` is only ever written in full, as the final sorted set.
/// - Terminal reports are immutable.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Create a new `Pending` report, returning its unique ID.
    async fn create_report(
        &self,
        event_id: &str,
        submission_id: &str,
        repo_url: &str,
    ) -> StorageResult<ReportId>;

    /// Mark a report `Completed` with its full, sorted similarity set.
    /// Fails if the report is not `Pending`.
    async fn complete_report(
        &self,
        id: &ReportId,
        similarities: Vec<SimilarityResult>,
    ) -> StorageResult<()>;

    /// Mark a report `Failed` with the captured error.
    /// Fails if the report is not `Pending`.
    async fn fail_report(&self, id: &ReportId, error: &str) -> StorageResult<()>;

    /// Retrieve a report by ID.
    async fn get_report(&self, id: &ReportId) -> StorageResult<PlagiarismReport>;

    /// List all reports for an event.
    async fn list_reports(&self, event_id: &str) -> StorageResult<Vec<PlagiarismReport>>;
}
