use thiserror::Error;

use crate::sandbox::SandboxError;

/// Everything that can end a grading run early.
///
/// One run produces at most one of these; the orchestrator never retries.
/// Cleanup (staging removal, sandbox stop) happens regardless of the variant.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("invalid submission task: {0}")]
    InvalidTask(String),

    #[error("can't download submission file: {0}")]
    AttachmentDownload(String),

    #[error("can't create staging directory: {0}")]
    Staging(#[from] std::io::Error),

    #[error(transparent)]
    Infrastructure(#[from] SandboxError),

    #[error("can't send submission results: {0}")]
    SendResults(String),
}
