//! simcheck - repository similarity checks for competitive events
//!
//! ## Commands
//!
//! - `check`: run a full plagiarism check for one submission against its
//!   event peers, from a roster file
//! - `compare`: score two repositories directly (local cosine)
//! - `fingerprint`: materialize and fingerprint a single repository

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};

use simcheck_core::{
    cosine_similarity, fingerprint_checkout, init_tracing, CheckConfig, FallbackSimilarity,
    GitMaterializer, LocalSimilarity, OracleClient, PlagiarismPipeline, RepoMaterializer,
    ReportStatus, ReportStore, SimilarityProvider,
};
use simcheck_store::fakes::{MemoryReportStore, MemorySubmissionDirectory};
use simcheck_store::Submission;

#[derive(Parser)]
#[command(name = "simcheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Repository similarity checks for competitive events", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a plagiarism check for one submission against its event peers
    Check {
        /// Path to the event roster (JSON array of {id, event_id, repo_url})
        #[arg(short, long)]
        roster: PathBuf,

        /// Event to check within
        #[arg(short, long)]
        event: String,

        /// Target submission id
        #[arg(short, long)]
        target: String,

        /// Similarity oracle endpoint; local cosine only when omitted
        #[arg(long, env = "SIMCHECK_ORACLE_URL")]
        oracle_url: Option<String>,

        /// Oracle request timeout in seconds
        #[arg(long, default_value = "10")]
        oracle_timeout: u64,

        /// Repository clone timeout in seconds
        #[arg(long, default_value = "120")]
        clone_timeout: u64,

        /// Maximum simultaneous peer clones
        #[arg(long, default_value = "4")]
        max_clones: usize,
    },

    /// Score two repositories directly with the local cosine path
    Compare {
        /// First repository URL
        repo_a: String,

        /// Second repository URL
        repo_b: String,

        /// Repository clone timeout in seconds
        #[arg(long, default_value = "120")]
        clone_timeout: u64,
    },

    /// Materialize and fingerprint a single repository
    Fingerprint {
        /// Repository URL
        repo_url: String,

        /// Repository clone timeout in seconds
        #[arg(long, default_value = "120")]
        clone_timeout: u64,
    },
}

#[derive(Serialize)]
struct FingerprintOutput {
    repo_url: String,
    digest: String,
    file_count: usize,
    skipped_files: usize,
    vector_dims: usize,
}

fn load_roster(path: &PathBuf) -> Result<Vec<Submission>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster file {}", path.display()))?;
    let submissions: Vec<Submission> =
        serde_json::from_str(&raw).context("roster is not a JSON array of submissions")?;
    Ok(submissions)
}

async fn run_check(
    roster: PathBuf,
    event: String,
    target: String,
    oracle_url: Option<String>,
    oracle_timeout: u64,
    clone_timeout: u64,
    max_clones: usize,
) -> Result<()> {
    let submissions = load_roster(&roster)?;
    info!(count = submissions.len(), "roster loaded");

    let materializer: Arc<dyn RepoMaterializer> =
        Arc::new(GitMaterializer::new(Duration::from_secs(clone_timeout)));
    let config = CheckConfig {
        max_concurrent_clones: max_clones,
        ..CheckConfig::default()
    };

    let local = Arc::new(LocalSimilarity::new(
        Arc::clone(&materializer),
        config.vector_dims,
    ));
    let provider: Arc<dyn SimilarityProvider> = match oracle_url {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "similarity oracle configured");
            let oracle = Arc::new(OracleClient::new(
                endpoint,
                Duration::from_secs(oracle_timeout),
            ));
            Arc::new(FallbackSimilarity::new(oracle, local))
        }
        None => local,
    };

    let directory = Arc::new(MemorySubmissionDirectory::with_submissions(submissions));
    let reports = Arc::new(MemoryReportStore::new());

    let pipeline = PlagiarismPipeline::new(
        materializer,
        provider,
        directory,
        Arc::clone(&reports) as Arc<dyn ReportStore>,
        config,
    );

    let report_id = pipeline.run(&event, &target).await?;
    let report = reports.get_report(&report_id).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.status == ReportStatus::Failed {
        bail!(
            "check failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

async fn run_compare(repo_a: String, repo_b: String, clone_timeout: u64) -> Result<()> {
    let materializer = GitMaterializer::new(Duration::from_secs(clone_timeout));
    let dims = CheckConfig::default().vector_dims;

    let left = materializer.materialize(&repo_a).await?;
    let right = materializer.materialize(&repo_b).await?;
    let fp_left = fingerprint_checkout(&left, dims).await;
    let fp_right = fingerprint_checkout(&right, dims).await;

    let similarity = cosine_similarity(&fp_left.vector, &fp_right.vector);
    println!(
        "{}",
        serde_json::json!({
            "repo_a": repo_a,
            "repo_b": repo_b,
            "similarity": similarity,
        })
    );
    Ok(())
}

async fn run_fingerprint(repo_url: String, clone_timeout: u64) -> Result<()> {
    let materializer = GitMaterializer::new(Duration::from_secs(clone_timeout));
    let dims = CheckConfig::default().vector_dims;

    let checkout = materializer.materialize(&repo_url).await?;
    let fingerprint = fingerprint_checkout(&checkout, dims).await;

    let output = FingerprintOutput {
        repo_url,
        digest: fingerprint.digest_hex(),
        file_count: checkout.file_count(),
        skipped_files: fingerprint.skipped_files,
        vector_dims: fingerprint.vector.len(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Check {
            roster,
            event,
            target,
            oracle_url,
            oracle_timeout,
            clone_timeout,
            max_clones,
        } => {
            run_check(
                roster,
                event,
                target,
                oracle_url,
                oracle_timeout,
                clone_timeout,
                max_clones,
            )
            .await
        }
        Commands::Compare {
            repo_a,
            repo_b,
            clone_timeout,
        } => run_compare(repo_a, repo_b, clone_timeout).await,
        Commands::Fingerprint {
            repo_url,
            clone_timeout,
        } => run_fingerprint(repo_url, clone_timeout).await,
    }
}
