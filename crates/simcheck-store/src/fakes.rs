//! In-memory fakes for storage traits (testing and one-shot CLI runs)
//!
//! Provides `MemorySubmissionDirectory` and `MemoryReportStore` that satisfy
//! the trait contracts without any external dependencies.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StorageError;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemorySubmissionDirectory
// ---------------------------------------------------------------------------

/// In-memory submission directory backed by a `Vec<Submission>`.
#[derive(Debug, Default)]
pub struct MemorySubmissionDirectory {
    submissions: Mutex<Vec<Submission>>,
}

impl MemorySubmissionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory pre-populated with the given submissions.
    pub fn with_submissions(submissions: impl IntoIterator<Item = Submission>) -> Self {
        Self {
            submissions: Mutex::new(submissions.into_iter().collect()),
        }
    }

    /// Register one submission.
    pub fn insert(&self, submission: Submission) {
        self.submissions.lock().unwrap().push(submission);
    }
}

#[async_trait]
impl SubmissionDirectory for MemorySubmissionDirectory {
    async fn get_submission(&self, id: &str) -> StorageResult<Option<Submission>> {
        let submissions = self.submissions.lock().unwrap();
        Ok(submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn list_peers(
        &self,
        event_id: &str,
        excluding: &str,
    ) -> StorageResult<Vec<Submission>> {
        let submissions = self.submissions.lock().unwrap();
        Ok(submissions
            .iter()
            .filter(|s| s.event_id == event_id && s.id != excluding)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryReportStore
// ---------------------------------------------------------------------------

/// In-memory report store backed by a `HashMap<report id, PlagiarismReport>`.
///
/// Enforces the lifecycle contract: only `Pending` reports may transition,
/// and each transitions at most once.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: Mutex<HashMap<String, PlagiarismReport>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn terminal_write<F>(&self, id: &ReportId, apply: F) -> StorageResult<()>
    where
        F: FnOnce(&mut PlagiarismReport),
    {
        let mut reports = self.reports.lock().unwrap();
        let report = reports
            .get_mut(&id.0)
            .ok_or_else(|| StorageError::ReportNotFound {
                report_id: id.0.clone(),
            })?;
        if report.status != ReportStatus::Pending {
            return Err(StorageError::InvalidReportState {
                report_id: id.0.clone(),
                status: format!("{:?}", report.status),
                expected: "Pending".to_string(),
            });
        }
        apply(report);
        report.completed_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn create_report(
        &self,
        event_id: &str,
        submission_id: &str,
        repo_url: &str,
    ) -> StorageResult<ReportId> {
        let id = ReportId::new();
        let report = PlagiarismReport {
            id: id.clone(),
            event_id: event_id.to_string(),
            submission_id: submission_id.to_string(),
            repo_url: repo_url.to_string(),
            status: ReportStatus::Pending,
            similarities: Vec::new(),
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        let mut reports = self.reports.lock().unwrap();
        reports.insert(id.0.clone(), report);
        Ok(id)
    }

    async fn complete_report(
        &self,
        id: &ReportId,
        similarities: Vec<SimilarityResult>,
    ) -> StorageResult<()> {
        self.terminal_write(id, |report| {
            report.status = ReportStatus::Completed;
            report.similarities = similarities;
        })
    }

    async fn fail_report(&self, id: &ReportId, error: &str) -> StorageResult<()> {
        self.terminal_write(id, |report| {
            report.status = ReportStatus::Failed;
            report.error = Some(error.to_string());
        })
    }

    async fn get_report(&self, id: &ReportId) -> StorageResult<PlagiarismReport> {
        let reports = self.reports.lock().unwrap();
        reports
            .get(&id.0)
            .cloned()
            .ok_or_else(|| StorageError::ReportNotFound {
                report_id: id.0.clone(),
            })
    }

    async fn list_reports(&self, event_id: &str) -> StorageResult<Vec<PlagiarismReport>> {
        let reports = self.reports.lock().unwrap();
        let mut matching: Vec<PlagiarismReport> = reports
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }
}
