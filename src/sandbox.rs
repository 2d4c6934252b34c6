mod docker;

pub use docker::DockerBackend;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// In-sandbox path the staging directory is bind-mounted at; the entrypoint
/// scripts baked into grading images expect submission files there.
pub const SUBMISSION_FILES_DIR: &str = "/app/src";

/// Everything needed to create one sandbox for one run.
#[derive(Debug, Clone)]
pub struct SandboxSpec {
    /// Image reference of the grading environment.
    pub image: String,
    /// Selects the entrypoint script; the sandbox runs `sh <part_id>.sh`.
    pub part_id: String,
    /// Host staging directory holding the fetched submission files.
    pub mount_dir: PathBuf,
    /// Container name, derived from the submission id plus a run nonce.
    pub name: String,
}

/// Opaque reference to a created sandbox, valid until `stop`.
#[derive(Debug, Clone)]
pub struct SandboxHandle {
    pub id: String,
}

#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("sandbox backend error: {0}")]
    Backend(String),

    #[error("sandbox wait ended without a status")]
    WaitEnded,
}

/// Boundary to the container runtime.
///
/// One implementation talks to a real Docker daemon; tests substitute a fake.
/// A single backend instance is shared by all concurrent runs, so
/// implementations must be safe for concurrent use.
#[async_trait]
pub trait SandboxBackend: Send + Sync {
    /// Creates a sandbox: no network, fixed non-root user, staging directory
    /// mounted read/write at [`SUBMISSION_FILES_DIR`].
    async fn create(&self, spec: &SandboxSpec) -> Result<SandboxHandle, SandboxError>;

    async fn start(&self, sandbox: &SandboxHandle) -> Result<(), SandboxError>;

    /// Blocks until the sandbox is no longer running, returning its exit
    /// status code.
    async fn wait_not_running(&self, sandbox: &SandboxHandle) -> Result<i64, SandboxError>;

    /// Full captured standard output of the sandbox.
    async fn stdout_logs(&self, sandbox: &SandboxHandle) -> Result<String, SandboxError>;

    /// Immediate termination, zero grace period. The run is already decided
    /// when this is called, so there is nothing to wait for.
    async fn stop(&self, sandbox: &SandboxHandle) -> Result<(), SandboxError>;
}
