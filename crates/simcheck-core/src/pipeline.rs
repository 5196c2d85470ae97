//! Pipeline orchestration: one target submission against its event peers.
//!
//! The orchestrator owns the report lifecycle. A report is created in
//! `Pending` before any comparison work, and written exactly once more:
//! `Failed` when the target itself cannot be fetched or fingerprinted,
//! `Completed` with the full ranked result set otherwise. Per-peer failures
//! never abort the batch; each failing peer records a zero score.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn, Instrument};

use simcheck_store::{
    ReportId, ReportStore, SimilarityResult, Submission, SubmissionDirectory,
};

use crate::error::{CheckError, Result};
use crate::fingerprint::{fingerprint_checkout, Fingerprint, VECTOR_DIMS};
use crate::materialize::{MaterializeError, RepoMaterializer};
use crate::metrics::{Counter, METRICS};
use crate::obs::{
    check_span, emit_check_completed, emit_check_failed, emit_check_started, emit_peer_scored,
};
use crate::similarity::{ScoreOutcome, SimilarityProvider};

/// Tuning knobs for one pipeline instance.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Fingerprint vector dimension.
    pub vector_dims: usize,
    /// Upper bound on simultaneous peer comparisons. Each comparison may
    /// clone a repository, so this bounds disk and process usage.
    pub max_concurrent_clones: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            vector_dims: VECTOR_DIMS,
            max_concurrent_clones: 4,
        }
    }
}

/// Orchestrates one similarity check: target fetch, fingerprint, bounded
/// peer fan-out, ranked report persistence.
pub struct PlagiarismPipeline {
    materializer: Arc<dyn RepoMaterializer>,
    provider: Arc<dyn SimilarityProvider>,
    submissions: Arc<dyn SubmissionDirectory>,
    reports: Arc<dyn ReportStore>,
    config: CheckConfig,
}

impl PlagiarismPipeline {
    pub fn new(
        materializer: Arc<dyn RepoMaterializer>,
        provider: Arc<dyn SimilarityProvider>,
        submissions: Arc<dyn SubmissionDirectory>,
        reports: Arc<dyn ReportStore>,
        config: CheckConfig,
    ) -> Self {
        Self {
            materializer,
            provider,
            submissions,
            reports,
            config,
        }
    }

    /// Run a plagiarism check for one submission against its event peers.
    ///
    /// Returns the id of the persisted report once it has reached a
    /// terminal state. A target that cannot be fetched yields a `Failed`
    /// report, not an `Err`; errors are reserved for a missing submission
    /// (no report row is created) and for storage failures (the report may
    /// be left `Pending` and must be treated as abandoned).
    ///
    /// Re-running for the same submission creates a new, independent
    /// report instance.
    pub async fn run(&self, event_id: &str, submission_id: &str) -> Result<ReportId> {
        let target = self
            .submissions
            .get_submission(submission_id)
            .await?
            .ok_or_else(|| CheckError::SubmissionNotFound(submission_id.to_string()))?;

        let report_id = self
            .reports
            .create_report(event_id, submission_id, &target.repo_url)
            .await?;
        let span = check_span(&report_id.0);
        self.run_report(report_id, target, event_id, submission_id)
            .instrument(span)
            .await
    }

    /// Everything between report creation and its terminal write.
    async fn run_report(
        &self,
        report_id: ReportId,
        target: Submission,
        event_id: &str,
        submission_id: &str,
    ) -> Result<ReportId> {
        emit_check_started(&report_id.0, event_id, submission_id);
        METRICS.record(Counter::ChecksStarted);

        let fingerprint = match self.fingerprint_target(&target.repo_url).await {
            Ok(fingerprint) => fingerprint,
            Err(err) => {
                self.reports.fail_report(&report_id, &err.to_string()).await?;
                emit_check_failed(&report_id.0, &err);
                return Ok(report_id);
            }
        };
        if fingerprint.skipped_files > 0 {
            warn!(
                skipped = fingerprint.skipped_files,
                "unreadable files skipped while fingerprinting target"
            );
        }

        let peers = self.submissions.list_peers(event_id, submission_id).await?;
        let mut similarities = self
            .compare_peers(Arc::new(fingerprint), target.repo_url.clone(), peers)
            .await;

        // Stable sort: tied peers keep their enumeration order.
        similarities.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let top = similarities.first().map(|s| s.similarity).unwrap_or(0.0);
        self.reports
            .complete_report(&report_id, similarities.clone())
            .await?;
        emit_check_completed(&report_id.0, similarities.len(), top);
        METRICS.flush();
        Ok(report_id)
    }

    async fn fingerprint_target(&self, repo_url: &str) -> std::result::Result<Fingerprint, MaterializeError> {
        let checkout = self.materializer.materialize(repo_url).await?;
        debug!(repo = %repo_url, files = checkout.file_count(), "target materialized");
        Ok(fingerprint_checkout(&checkout, self.config.vector_dims).await)
    }

    /// Compare the target fingerprint against every peer concurrently,
    /// bounded by the configured clone limit.
    ///
    /// Exactly one result per peer comes back, in peer enumeration order; a
    /// provider error or a panicked task degrades that peer to a zero score.
    async fn compare_peers(
        &self,
        target: Arc<Fingerprint>,
        target_repo: String,
        peers: Vec<Submission>,
    ) -> Vec<SimilarityResult> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_clones));
        let mut tasks: Vec<(String, String, JoinHandle<SimilarityResult>)> =
            Vec::with_capacity(peers.len());

        for peer in peers {
            let provider = Arc::clone(&self.provider);
            let permits = Arc::clone(&semaphore);
            let target = Arc::clone(&target);
            let target_repo = target_repo.clone();
            let peer_id = peer.id.clone();
            let peer_url = peer.repo_url.clone();

            let task = tokio::spawn(async move {
                // The semaphore is never closed; an acquire failure would
                // only degrade this peer to a zero score.
                let _permit = permits.acquire_owned().await;

                let outcome = match provider.score(&target, &target_repo, &peer.repo_url).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        warn!(peer = %peer.id, error = %err, "comparison failed, recording zero");
                        ScoreOutcome {
                            similarity: 0.0,
                            details: None,
                        }
                    }
                };
                METRICS.record(Counter::PeersCompared);
                emit_peer_scored(&peer.id, outcome.similarity);

                SimilarityResult {
                    other_submission_id: peer.id,
                    other_repo_url: peer.repo_url,
                    // A similarity is always defined; NaN from a misbehaving
                    // provider degrades to zero.
                    similarity: if outcome.similarity.is_nan() {
                        0.0
                    } else {
                        outcome.similarity
                    },
                    details: outcome.details,
                }
            });

            tasks.push((peer_id, peer_url, task));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (peer_id, peer_url, task) in tasks {
            match task.await {
                Ok(result) => results.push(result),
                Err(err) => {
                    warn!(peer = %peer_id, error = %err, "comparison task panicked, recording zero");
                    results.push(SimilarityResult {
                        other_submission_id: peer_id,
                        other_repo_url: peer_url,
                        similarity: 0.0,
                        details: None,
                    });
                }
            }
        }
        results
    }
}
