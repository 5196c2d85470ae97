//! Trait contract tests for SubmissionDirectory and ReportStore.
//!
//! These tests verify the behavioral contracts of the storage traits
//! using in-memory fakes. Any conforming implementation must pass these.

use simcheck_store::fakes::{MemoryReportStore, MemorySubmissionDirectory};
use simcheck_store::storage_traits::*;
use simcheck_store::StorageError;

fn submission(id: &str, event_id: &str, repo_url: &str) -> Submission {
    Submission {
        id: id.to_string(),
        event_id: event_id.to_string(),
        repo_url: repo_url.to_string(),
    }
}

fn entry(id: &str, similarity: f64) -> SimilarityResult {
    SimilarityResult {
        other_submission_id: id.to_string(),
        other_repo_url: format!("https://git.example/{id}"),
        similarity,
        details: None,
    }
}

// ===========================================================================
// SubmissionDirectory contract tests
// ===========================================================================

#[tokio::test]
async fn directory_get_returns_registered_submission() {
    let dir = MemorySubmissionDirectory::new();
    dir.insert(submission("s1", "e1", "https://git.example/a"));

    let found = dir.get_submission("s1").await.unwrap();
    assert_eq!(found, Some(submission("s1", "e1", "https://git.example/a")));
}

#[tokio::test]
async fn directory_get_absent_returns_none() {
    let dir = MemorySubmissionDirectory::new();
    assert_eq!(dir.get_submission("missing").await.unwrap(), None);
}

#[tokio::test]
async fn directory_peers_exclude_target_and_other_events() {
    let dir = MemorySubmissionDirectory::with_submissions([
        submission("s1", "e1", "https://git.example/a"),
        submission("s2", "e1", "https://git.example/b"),
        submission("s3", "e1", "https://git.example/c"),
        submission("s4", "e2", "https://git.example/d"),
    ]);

    let peers = dir.list_peers("e1", "s1").await.unwrap();
    let ids: Vec<&str> = peers.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s2", "s3"]);
}

#[tokio::test]
async fn directory_peers_empty_event() {
    let dir = MemorySubmissionDirectory::new();
    dir.insert(submission("s1", "e1", "https://git.example/a"));

    let peers = dir.list_peers("e1", "s1").await.unwrap();
    assert!(peers.is_empty());
}

// ===========================================================================
// ReportStore contract tests
// ===========================================================================

#[tokio::test]
async fn report_created_pending_and_empty() {
    let store = MemoryReportStore::new();
    let id = store
        .create_report("e1", "s1", "https://git.example/a")
        .await
        .unwrap();

    let report = store.get_report(&id).await.unwrap();
    assert_eq!(report.status, ReportStatus::Pending);
    assert!(report.similarities.is_empty());
    assert!(report.error.is_none());
    assert!(report.completed_at.is_none());
    assert_eq!(report.event_id, "e1");
    assert_eq!(report.submission_id, "s1");
}

#[tokio::test]
async fn report_complete_stores_full_sorted_set() {
    let store = MemoryReportStore::new();
    let id = store
        .create_report("e1", "s1", "https://git.example/a")
        .await
        .unwrap();

    let similarities = vec![entry("s2", 0.9), entry("s3", 0.1)];
    store.complete_report(&id, similarities.clone()).await.unwrap();

    let report = store.get_report(&id).await.unwrap();
    assert_eq!(report.status, ReportStatus::Completed);
    assert_eq!(report.similarities, similarities);
    assert!(report.completed_at.is_some());
}

#[tokio::test]
async fn report_fail_records_error() {
    let store = MemoryReportStore::new();
    let id = store
        .create_report("e1", "s1", "https://git.example/a")
        .await
        .unwrap();

    store.fail_report(&id, "clone timed out").await.unwrap();

    let report = store.get_report(&id).await.unwrap();
    assert_eq!(report.status, ReportStatus::Failed);
    assert_eq!(report.error.as_deref(), Some("clone timed out"));
    assert!(report.similarities.is_empty());
}

#[tokio::test]
async fn report_terminal_state_is_immutable() {
    let store = MemoryReportStore::new();
    let id = store
        .create_report("e1", "s1", "https://git.example/a")
        .await
        .unwrap();
    store.complete_report(&id, vec![]).await.unwrap();

    let err = store.complete_report(&id, vec![entry("s2", 0.5)]).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidReportState { .. }));

    let err = store.fail_report(&id, "too late").await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidReportState { .. }));

    // The original completion is untouched
    let report = store.get_report(&id).await.unwrap();
    assert_eq!(report.status, ReportStatus::Completed);
    assert!(report.similarities.is_empty());
    assert!(report.error.is_none());
}

#[tokio::test]
async fn report_failed_cannot_complete() {
    let store = MemoryReportStore::new();
    let id = store
        .create_report("e1", "s1", "https://git.example/a")
        .await
        .unwrap();
    store.fail_report(&id, "unreachable").await.unwrap();

    let err = store.complete_report(&id, vec![]).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidReportState { .. }));
}

#[tokio::test]
async fn report_get_unknown_fails() {
    let store = MemoryReportStore::new();
    let err = store.get_report(&ReportId::new()).await.unwrap_err();
    assert!(matches!(err, StorageError::ReportNotFound { .. }));
}

#[tokio::test]
async fn reruns_create_independent_reports() {
    let store = MemoryReportStore::new();
    let first = store
        .create_report("e1", "s1", "https://git.example/a")
        .await
        .unwrap();
    let second = store
        .create_report("e1", "s1", "https://git.example/a")
        .await
        .unwrap();

    assert_ne!(first, second);
    store.complete_report(&first, vec![entry("s2", 0.3)]).await.unwrap();

    // The second run's report is unaffected by the first one's completion
    let report = store.get_report(&second).await.unwrap();
    assert_eq!(report.status, ReportStatus::Pending);
}

#[tokio::test]
async fn list_reports_filters_by_event() {
    let store = MemoryReportStore::new();
    let a = store
        .create_report("e1", "s1", "https://git.example/a")
        .await
        .unwrap();
    store
        .create_report("e2", "s9", "https://git.example/z")
        .await
        .unwrap();

    let reports = store.list_reports("e1").await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, a);
}
