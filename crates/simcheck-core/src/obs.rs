//! Structured observability hooks for check lifecycle events.
//!
//! This module provides:
//! - Check-scoped tracing spans via [`check_span`]
//! - Emission functions for key lifecycle events: start, peer scored,
//!   completion, failure
//!
//! Events are emitted at `info!` level; filter with `RUST_LOG`.

use tracing::{info, Span};

/// Span covering one pipeline run, tagged with the report id.
///
/// Attach with `tracing::Instrument` so the span follows the check future
/// across await points and spawned work stays `Send`.
pub fn check_span(report_id: &str) -> Span {
    tracing::info_span!("simcheck.check", report_id = %report_id)
}

/// Emit event: check started for a submission.
pub fn emit_check_started(report_id: &str, event_id: &str, submission_id: &str) {
    info!(
        event = "check.started",
        report_id = %report_id,
        event_id = %event_id,
        submission_id = %submission_id,
    );
}

/// Emit event: one peer comparison finished.
pub fn emit_peer_scored(peer_id: &str, similarity: f64) {
    info!(event = "check.peer_scored", peer_id = %peer_id, similarity = similarity);
}

/// Emit event: check completed with its ranked result set.
pub fn emit_check_completed(report_id: &str, peers: usize, top_similarity: f64) {
    info!(
        event = "check.completed",
        report_id = %report_id,
        peers = peers,
        top_similarity = top_similarity,
    );
}

/// Emit event: check failed on the target side (warning level).
pub fn emit_check_failed(report_id: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "check.failed", report_id = %report_id, error = %error);
}
