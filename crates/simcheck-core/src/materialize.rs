//! Repository materialization: ephemeral, isolated working copies.
//!
//! Fetching is abstracted behind the [`RepoMaterializer`] capability so the
//! pipeline and the local scorer never depend on a concrete mechanism; tests
//! substitute an in-memory fake. The real implementation shells out to git
//! for a shallow, single-snapshot clone.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

/// Default upper bound on a single repository fetch.
pub const DEFAULT_CLONE_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors raised while obtaining a working copy.
#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("i/o failure while materializing: {0}")]
    Io(#[from] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("fetch of {repo_url} timed out after {seconds}s")]
    Timeout { repo_url: String, seconds: u64 },
}

/// An isolated, ephemeral working copy of one repository.
///
/// A checkout that owns its temporary directory releases the storage when
/// dropped, on every exit path. `files` holds the tracked paths in
/// canonical (lexicographic) order.
pub struct Checkout {
    /// Tracked file paths relative to the checkout root, sorted.
    pub files: Vec<String>,
    root: PathBuf,
    _workdir: Option<TempDir>,
}

impl Checkout {
    /// A checkout owning its working area; storage is released on drop.
    pub fn owned(mut files: Vec<String>, workdir: TempDir) -> Self {
        files.sort();
        let root = workdir.path().to_path_buf();
        Self {
            files,
            root,
            _workdir: Some(workdir),
        }
    }

    /// A checkout over a directory the caller owns (fixtures, fakes).
    pub fn borrowed(mut files: Vec<String>, root: impl Into<PathBuf>) -> Self {
        files.sort();
        Self {
            files,
            root: root.into(),
            _workdir: None,
        }
    }

    /// Root directory of the working copy.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Capability for fetching a repository into an isolated working copy.
///
/// Every call acquires a fresh, exclusively-owned working area; no content
/// is cached or shared across calls. A failed fetch never yields a partial
/// file list.
#[async_trait]
pub trait RepoMaterializer: Send + Sync {
    async fn materialize(&self, repo_url: &str) -> Result<Checkout, MaterializeError>;
}

/// Materializer backed by the git CLI.
///
/// Performs `git clone --depth 1` into a temporary directory and enumerates
/// tracked files with `git ls-files`. Both subprocess calls run under the
/// configured timeout; a hung remote surfaces as
/// [`MaterializeError::Timeout`].
pub struct GitMaterializer {
    clone_timeout: Duration,
}

impl GitMaterializer {
    pub fn new(clone_timeout: Duration) -> Self {
        Self { clone_timeout }
    }

    async fn run_git(
        &self,
        repo_url: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<String, MaterializeError> {
        let mut cmd = Command::new("git");
        cmd.args(args).kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = match tokio::time::timeout(self.clone_timeout, cmd.output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(MaterializeError::Timeout {
                    repo_url: repo_url.to_string(),
                    seconds: self.clone_timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(MaterializeError::Git {
                command: args.first().unwrap_or(&"git").to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Default for GitMaterializer {
    fn default() -> Self {
        Self::new(DEFAULT_CLONE_TIMEOUT)
    }
}

#[async_trait]
impl RepoMaterializer for GitMaterializer {
    async fn materialize(&self, repo_url: &str) -> Result<Checkout, MaterializeError> {
        let workdir = TempDir::new()?;
        let dest = workdir.path().to_string_lossy().to_string();

        self.run_git(
            repo_url,
            &["clone", "--depth", "1", "--quiet", repo_url, &dest],
            None,
        )
        .await?;

        let listing = self
            .run_git(repo_url, &["ls-files"], Some(workdir.path()))
            .await?;
        let files: Vec<String> = listing.lines().map(str::to_string).collect();

        debug!(repo = %repo_url, files = files.len(), "repository materialized");
        Ok(Checkout::owned(files, workdir))
    }
}
