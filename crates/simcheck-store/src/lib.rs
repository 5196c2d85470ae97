//! Simcheck-Store: Persistence Boundary for the Similarity Pipeline
//!
//! This crate defines the storage contracts the pipeline runs against.
//! The concrete document store lives in the surrounding application; here
//! we specify only the shapes and lifecycle guarantees it must honor.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: report lifecycle integrity and submission lookup.
//!
//! ## Key Components
//!
//! - `SubmissionDirectory`: read-only lookup of event submissions
//! - `ReportStore`: Pending -> Completed|Failed report lifecycle
//! - `fakes`: in-memory implementations for tests and one-shot CLI runs

mod error;
pub mod fakes;
pub mod storage_traits;

pub use error::StorageError;
pub use storage_traits::{
    PlagiarismReport, ReportId, ReportStatus, ReportStore, SimilarityResult, StorageResult,
    Submission, SubmissionDirectory,
};
