//! Simcheck Core Library
//!
//! Content-similarity detection for code submissions in competitive
//! events: materialize a repository, fingerprint its tracked content,
//! score it against every peer in the event (oracle first when one is
//! configured, local cosine otherwise), and persist a ranked report.

pub mod error;
pub mod fingerprint;
pub mod materialize;
pub mod metrics;
pub mod obs;
pub mod pipeline;
pub mod similarity;
pub mod telemetry;

pub use error::{CheckError, Result};

pub use fingerprint::{
    cosine_similarity, expand_vector, fingerprint_checkout, Fingerprint, VECTOR_DIMS,
};

pub use materialize::{
    Checkout, GitMaterializer, MaterializeError, RepoMaterializer, DEFAULT_CLONE_TIMEOUT,
};

pub use pipeline::{CheckConfig, PlagiarismPipeline};

pub use similarity::{
    FallbackSimilarity, LocalSimilarity, OracleClient, ScoreError, ScoreOutcome,
    SimilarityProvider, DEFAULT_ORACLE_TIMEOUT,
};

pub use simcheck_store::{
    PlagiarismReport, ReportId, ReportStatus, ReportStore, SimilarityResult, Submission,
    SubmissionDirectory,
};

pub use metrics::{Counter, METRICS};
pub use obs::{
    check_span, emit_check_completed, emit_check_failed, emit_check_started, emit_peer_scored,
};
pub use telemetry::init_tracing;

/// simcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
