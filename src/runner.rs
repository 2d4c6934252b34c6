use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::attachments;
use crate::config::RunnerConfig;
use crate::error::RunError;
use crate::reporter;
use crate::sandbox::{SandboxBackend, SandboxHandle, SandboxSpec};
use crate::tasks::{SubmissionTask, Verdict};

const SUCCESS_MSG: &str = "Congratulations! You have successfully completed the assignment";
const TIMEOUT_MSG: &str = "Timeout";

/// Per-run staging directory, removed on drop.
///
/// Owning cleanup in a guard keeps the "directory is gone on every exit path"
/// invariant out of the orchestrator's control flow entirely, early returns
/// and panics included.
struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    fn create(root: &Path, submission_id: i64) -> std::io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let path = root.join(format!("submission_{submission_id}"));
        // Plain create_dir: an existing directory means a concurrent run is
        // using the same submission id, which must fail loudly.
        std::fs::create_dir(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            log::error!("Error while removing dir {}: {e}", self.path.display());
        }
    }
}

/// Runs one submission end to end: fetch files, execute in a sandbox, report
/// the verdict.
///
/// The backend is injected so many runner instances can coexist and tests can
/// substitute a fake; one runner serves any number of concurrent runs.
pub struct SubmissionRunner {
    backend: Arc<dyn SandboxBackend>,
    http_client: reqwest::Client,
    staging_root: PathBuf,
    run_timeout: Duration,
    download_timeout: Duration,
}

impl SubmissionRunner {
    pub fn new(backend: Arc<dyn SandboxBackend>, config: RunnerConfig) -> Self {
        Self {
            backend,
            http_client: reqwest::Client::new(),
            staging_root: config.staging_root(),
            run_timeout: config.run_timeout(),
            download_timeout: config.download_timeout(),
        }
    }

    /// Single-attempt grading pipeline.
    ///
    /// Steps run strictly in order; the first error wins. The staging
    /// directory is removed and the sandbox (once created) is stopped no
    /// matter which step fails.
    pub async fn run_submission(&self, task: &SubmissionTask) -> Result<(), RunError> {
        task.validate().map_err(RunError::InvalidTask)?;

        let staging = StagingDir::create(&self.staging_root, task.submission_id)?;

        attachments::fetch_all(
            &self.http_client,
            staging.path(),
            &task.files,
            self.download_timeout,
        )
        .await?;

        let spec = SandboxSpec {
            image: task.container.clone(),
            part_id: task.part_id.clone(),
            mount_dir: staging.path().to_path_buf(),
            name: sandbox_name(task.submission_id),
        };
        let sandbox = self.backend.create(&spec).await?;

        let outcome = async {
            self.backend.start(&sandbox).await?;
            self.resolve_verdict(&sandbox).await
        }
        .await;

        // Best-effort, unconditional once the sandbox exists: after a timeout
        // it may still be running, and this is what actually halts it.
        if let Err(e) = self.backend.stop(&sandbox).await {
            log::warn!("Can't stop sandbox {}: {e}", sandbox.id);
        }

        let verdict = outcome?;
        log::info!(
            "Submission {} resolved: pass={}",
            task.submission_id,
            verdict.pass
        );

        reporter::send_results(
            &self.http_client,
            &task.webhook_url,
            &task.access_token,
            &verdict,
        )
        .await
    }

    /// Races sandbox completion against the run timeout.
    ///
    /// Exit 0 passes; a nonzero exit fails with the sandbox's captured stdout
    /// as diagnostics; the timer firing first fails with a timeout marker.
    /// A backend error while waiting or fetching logs fails the run with no
    /// verdict.
    async fn resolve_verdict(&self, sandbox: &SandboxHandle) -> Result<Verdict, RunError> {
        tokio::select! {
            waited = self.backend.wait_not_running(sandbox) => match waited? {
                0 => Ok(Verdict {
                    pass: true,
                    text: SUCCESS_MSG.to_string(),
                }),
                status => {
                    log::debug!("Sandbox {} exited with status {status}", sandbox.id);
                    let output = self.backend.stdout_logs(sandbox).await?;
                    Ok(Verdict {
                        pass: false,
                        text: output,
                    })
                }
            },
            _ = tokio::time::sleep(self.run_timeout) => Ok(Verdict {
                pass: false,
                text: TIMEOUT_MSG.to_string(),
            }),
        }
    }
}

/// Deterministic prefix for operational debugging, random suffix so a retried
/// submission can't collide with a still-terminating predecessor of the same
/// name.
fn sandbox_name(submission_id: i64) -> String {
    format!(
        "run_submission_{submission_id}_{}",
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_dir_removed_on_drop() {
        let root = std::env::temp_dir().join("grader-runner-test-staging");
        let staging = StagingDir::create(&root, 9001).unwrap();
        let path = staging.path().to_path_buf();
        assert!(path.is_dir());

        std::fs::write(path.join("main.go"), "package main").unwrap();
        drop(staging);
        assert!(!path.exists());
    }

    #[test]
    fn test_staging_dir_rejects_duplicate_run() {
        let root = std::env::temp_dir().join("grader-runner-test-staging-dup");
        let first = StagingDir::create(&root, 9002).unwrap();
        assert!(StagingDir::create(&root, 9002).is_err());
        drop(first);
    }

    #[test]
    fn test_sandbox_names_are_distinct_per_run() {
        let a = sandbox_name(5);
        let b = sandbox_name(5);
        assert!(a.starts_with("run_submission_5_"));
        assert_ne!(a, b);
    }
}
