//! Dataset publishing boundary.
//!
//! The pipeline's obligation ends at handing a closed dataset path to a
//! [`DatasetPublisher`]. Versioning and remote sync happen behind that trait:
//!
//! | Publisher | What it does |
//! |-----------|--------------|
//! | [`DvcPublisher`] | `dvc init -f`, configure the default remote, `dvc add`, `dvc push` |
//! | [`GitPublisher`] | commit the `.dvc` pointer file and push it |
//! | [`VersionedPublisher`] | DVC then Git, the full publish step |
//! | [`NoopPublisher`] | used when no `publish` section is configured |
//!
//! External tools are driven through [`tokio::process::Command`]; a non-zero
//! exit becomes [`PublishError::Failed`] with the captured stderr.

use crate::config::PublishConfig;
use crate::error::PublishError;
use crate::utils::truncate_for_log;
use chrono::Utc;
use itertools::Itertools;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Hands a finished dataset file to durable, versioned storage.
pub trait DatasetPublisher {
    /// Version and upload the closed file at `dataset`.
    ///
    /// # Arguments
    ///
    /// * `dataset` - Path returned by the write stage, absolute or relative to
    ///   the process working directory.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when a tool cannot be started or exits non-zero.
    async fn publish(&self, dataset: &Path) -> Result<(), PublishError>;
}

/// The tools run in the configured workdir, so a relative dataset path must be
/// anchored to the process working directory first.
fn resolve_dataset(dataset: &Path) -> Result<PathBuf, PublishError> {
    std::path::absolute(dataset).map_err(|source| PublishError::DatasetPath {
        path: dataset.to_path_buf(),
        source,
    })
}

/// Runs one external program in a fixed working directory.
#[derive(Debug, Clone)]
struct Tool {
    program: String,
    workdir: PathBuf,
}

impl Tool {
    fn new(program: &str, workdir: &Path) -> Self {
        Self {
            program: program.to_string(),
            workdir: workdir.to_path_buf(),
        }
    }

    #[instrument(level = "debug", skip_all, fields(program = %self.program))]
    async fn run<I, S>(&self, args: I) -> Result<String, PublishError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let rendered = args.iter().map(|a| a.to_string_lossy()).join(" ");
        debug!(args = %rendered, "Running command");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.workdir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| PublishError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PublishError::Failed {
                program: self.program.clone(),
                args: rendered,
                status: output.status,
                stderr: truncate_for_log(String::from_utf8_lossy(&output.stderr).trim(), 500),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Tracks the dataset with DVC and pushes it to the configured remote.
#[derive(Debug, Clone)]
pub struct DvcPublisher {
    dvc: Tool,
    remote_name: String,
    remote_url: String,
}

impl DvcPublisher {
    pub fn new(config: &PublishConfig) -> Self {
        Self {
            dvc: Tool::new(&config.dvc_program, &config.workdir),
            remote_name: config.dvc_remote_name.clone(),
            remote_url: config.dvc_remote_url.clone(),
        }
    }
}

impl DatasetPublisher for DvcPublisher {
    #[instrument(level = "info", skip_all, fields(dataset = %dataset.display()))]
    async fn publish(&self, dataset: &Path) -> Result<(), PublishError> {
        let dataset = resolve_dataset(dataset)?;
        // Re-initialising an existing DVC project is harmless; only warn.
        if let Err(e) = self.dvc.run(["init", "-f"]).await {
            warn!(error = %e, "dvc init failed; assuming project already initialised");
        }
        self.dvc
            .run(["remote", "add", "-d", "-f", self.remote_name.as_str(), self.remote_url.as_str()])
            .await?;
        self.dvc.run([OsStr::new("add"), dataset.as_os_str()]).await?;
        self.dvc.run(["push"]).await?;
        info!(remote = %self.remote_name, "Pushed dataset to DVC remote");
        Ok(())
    }
}

/// Commits the DVC pointer file of the dataset and pushes it.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    git: Tool,
    remote_url: String,
    branch: String,
    commit_message: String,
}

impl GitPublisher {
    pub fn new(config: &PublishConfig) -> Self {
        Self {
            git: Tool::new(&config.git_program, &config.workdir),
            remote_url: config.git_remote_url.clone(),
            branch: config.git_branch.clone(),
            commit_message: config.commit_message.clone(),
        }
    }

    /// `articles.csv` is tracked through `articles.csv.dvc`.
    pub fn pointer_file(dataset: &Path) -> PathBuf {
        let mut pointer = dataset.as_os_str().to_owned();
        pointer.push(".dvc");
        PathBuf::from(pointer)
    }

    /// `git diff --cached --quiet` exits 1 when the index differs from `HEAD`.
    async fn has_staged_changes(&self) -> Result<bool, PublishError> {
        match self.git.run(["diff", "--cached", "--quiet"]).await {
            Ok(_) => Ok(false),
            Err(PublishError::Failed { .. }) => Ok(true),
            Err(e) => Err(e),
        }
    }

    async fn ensure_origin(&self) -> Result<(), PublishError> {
        if self.git.run(["remote", "get-url", "origin"]).await.is_ok() {
            self.git
                .run(["remote", "set-url", "origin", self.remote_url.as_str()])
                .await?;
        } else {
            self.git
                .run(["remote", "add", "origin", self.remote_url.as_str()])
                .await?;
        }
        Ok(())
    }
}

impl DatasetPublisher for GitPublisher {
    #[instrument(level = "info", skip_all, fields(dataset = %dataset.display()))]
    async fn publish(&self, dataset: &Path) -> Result<(), PublishError> {
        let pointer = Self::pointer_file(&resolve_dataset(dataset)?);
        let message = format!(
            "{} ({})",
            self.commit_message,
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
        );

        self.git.run(["init"]).await?;
        self.git.run([OsStr::new("add"), pointer.as_os_str()]).await?;
        if self.has_staged_changes().await? {
            self.git.run(["commit", "-m", message.as_str()]).await?;
        } else {
            // Unchanged data, or a retry after a commit whose push failed.
            info!(pointer = %pointer.display(), "Pointer unchanged; skipping commit");
        }
        self.ensure_origin().await?;
        self.git
            .run(["push", "-u", "origin", self.branch.as_str()])
            .await?;
        info!(branch = %self.branch, "Pushed dataset pointer to Git remote");
        Ok(())
    }
}

/// DVC first, then Git: the pointer file only exists after `dvc add`.
#[derive(Debug, Clone)]
pub struct VersionedPublisher {
    pub dvc: DvcPublisher,
    pub git: GitPublisher,
}

impl VersionedPublisher {
    pub fn new(config: &PublishConfig) -> Self {
        Self {
            dvc: DvcPublisher::new(config),
            git: GitPublisher::new(config),
        }
    }
}

impl DatasetPublisher for VersionedPublisher {
    async fn publish(&self, dataset: &Path) -> Result<(), PublishError> {
        self.dvc.publish(dataset).await?;
        self.git.publish(dataset).await
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl DatasetPublisher for NoopPublisher {
    async fn publish(&self, dataset: &Path) -> Result<(), PublishError> {
        info!(dataset = %dataset.display(), "Publishing not configured; dataset left in place");
        Ok(())
    }
}

/// Publisher chosen from configuration.
#[derive(Debug, Clone)]
pub enum Publisher {
    Versioned(VersionedPublisher),
    Noop(NoopPublisher),
}

impl Publisher {
    pub fn from_config(config: Option<&PublishConfig>) -> Self {
        match config {
            Some(config) => Publisher::Versioned(VersionedPublisher::new(config)),
            None => Publisher::Noop(NoopPublisher),
        }
    }
}

impl DatasetPublisher for Publisher {
    async fn publish(&self, dataset: &Path) -> Result<(), PublishError> {
        match self {
            Publisher::Versioned(p) => p.publish(dataset).await,
            Publisher::Noop(p) => p.publish(dataset).await,
        }
    }
}
