//! Similarity providers: oracle-first scoring with local cosine fallback.
//!
//! Whether an oracle is configured is decided once, at wiring time: with an
//! endpoint, the pipeline gets `FallbackSimilarity(OracleClient, LocalSimilarity)`;
//! without one, `LocalSimilarity` alone. The scorer itself carries no
//! conditional branching.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::fingerprint::{cosine_similarity, fingerprint_checkout, Fingerprint};
use crate::materialize::RepoMaterializer;
use crate::metrics::{Counter, METRICS};

/// Default upper bound on a single oracle request.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised by a similarity provider.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("oracle request failed: {0}")]
    OracleTransport(#[from] reqwest::Error),

    #[error("oracle returned status {status}")]
    OracleStatus { status: u16 },
}

/// A scored pair, as produced by one provider.
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    /// Similarity in [0, 1]
    pub similarity: f64,
    /// Opaque structured payload, present only on the oracle path
    pub details: Option<serde_json::Value>,
}

/// Capability for scoring the similarity of two repositories.
///
/// `target` is the already-computed fingerprint of `target_repo`, so local
/// providers only pay for materializing the peer side.
#[async_trait]
pub trait SimilarityProvider: Send + Sync {
    async fn score(
        &self,
        target: &Fingerprint,
        target_repo: &str,
        peer_repo: &str,
    ) -> Result<ScoreOutcome, ScoreError>;
}

// ---------------------------------------------------------------------------
// LocalSimilarity
// ---------------------------------------------------------------------------

/// Scores a pair by materializing and fingerprinting the peer fresh, then
/// taking the cosine of the two fingerprint vectors.
///
/// Failure isolation is this provider's defining property: a peer that
/// cannot be cloned scores `0.0`, it never raises.
pub struct LocalSimilarity {
    materializer: Arc<dyn RepoMaterializer>,
    dims: usize,
}

impl LocalSimilarity {
    pub fn new(materializer: Arc<dyn RepoMaterializer>, dims: usize) -> Self {
        Self { materializer, dims }
    }
}

#[async_trait]
impl SimilarityProvider for LocalSimilarity {
    async fn score(
        &self,
        target: &Fingerprint,
        _target_repo: &str,
        peer_repo: &str,
    ) -> Result<ScoreOutcome, ScoreError> {
        let checkout = match self.materializer.materialize(peer_repo).await {
            Ok(checkout) => checkout,
            Err(err) => {
                warn!(repo = %peer_repo, error = %err, "peer fetch failed, scoring zero");
                return Ok(ScoreOutcome {
                    similarity: 0.0,
                    details: None,
                });
            }
        };

        let peer = fingerprint_checkout(&checkout, self.dims).await;
        let similarity = cosine_similarity(&target.vector, &peer.vector);
        debug!(repo = %peer_repo, similarity, "local cosine computed");
        Ok(ScoreOutcome {
            similarity,
            details: None,
        })
    }
}

// ---------------------------------------------------------------------------
// OracleClient
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct OracleRequest<'a> {
    #[serde(rename = "repoA")]
    repo_a: &'a str,
    #[serde(rename = "repoB")]
    repo_b: &'a str,
}

#[derive(Debug, Deserialize)]
struct OracleResponse {
    score: f64,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

/// Client for an external similarity oracle.
///
/// Submits `{repoA, repoB}` and expects `{score, details?}`. Transport
/// failures, timeouts, non-2xx statuses, and malformed payloads all
/// surface as [`ScoreError`]; the caller decides what failure means.
pub struct OracleClient {
    endpoint: String,
    http: reqwest::Client,
}

impl OracleClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("simcheck/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }
}

#[async_trait]
impl SimilarityProvider for OracleClient {
    async fn score(
        &self,
        _target: &Fingerprint,
        target_repo: &str,
        peer_repo: &str,
    ) -> Result<ScoreOutcome, ScoreError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&OracleRequest {
                repo_a: target_repo,
                repo_b: peer_repo,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScoreError::OracleStatus {
                status: response.status().as_u16(),
            });
        }

        let body: OracleResponse = response.json().await?;
        debug!(peer = %peer_repo, score = body.score, "oracle scored pair");
        Ok(ScoreOutcome {
            similarity: body.score,
            details: body.details,
        })
    }
}

// ---------------------------------------------------------------------------
// FallbackSimilarity
// ---------------------------------------------------------------------------

/// Tries a primary provider first and falls back on any error.
///
/// This is how the oracle composes in front of local scoring: an
/// unreachable or misbehaving oracle degrades the pair to a local cosine
/// comparison, never to a pipeline failure.
pub struct FallbackSimilarity {
    primary: Arc<dyn SimilarityProvider>,
    fallback: Arc<dyn SimilarityProvider>,
}

impl FallbackSimilarity {
    pub fn new(primary: Arc<dyn SimilarityProvider>, fallback: Arc<dyn SimilarityProvider>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SimilarityProvider for FallbackSimilarity {
    async fn score(
        &self,
        target: &Fingerprint,
        target_repo: &str,
        peer_repo: &str,
    ) -> Result<ScoreOutcome, ScoreError> {
        match self.primary.score(target, target_repo, peer_repo).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(peer = %peer_repo, error = %err, "primary scorer failed, falling back");
                METRICS.record(Counter::OracleFallbacks);
                self.fallback.score(target, target_repo, peer_repo).await
            }
        }
    }
}
