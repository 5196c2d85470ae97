//! Error types for simcheck-store

use thiserror::Error;

/// Errors that can occur in the report persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Report not found
    #[error("Report not found: {report_id}")]
    ReportNotFound { report_id: String },

    /// A terminal report was written to, or a transition was attempted
    /// from the wrong state
    #[error("Report {report_id} is {status}, expected {expected}")]
    InvalidReportState {
        report_id: String,
        status: String,
        expected: String,
    },

    /// Submission not found
    #[error("Submission not found: {submission_id}")]
    SubmissionNotFound { submission_id: String },

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Backend rejected or could not service a read/write
    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_report_state_display() {
        let err = StorageError::InvalidReportState {
            report_id: "report-1".to_string(),
            status: "Completed".to_string(),
            expected: "Pending".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("report-1"));
        assert!(msg.contains("Completed"));
        assert!(msg.contains("Pending"));
    }

    #[test]
    fn test_report_not_found_display() {
        let err = StorageError::ReportNotFound {
            report_id: "missing".to_string(),
        };
        assert!(err.to_string().contains("Report not found"));
    }
}
