use std::path::Path;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::RunError;
use crate::tasks::SubmissionFile;

/// Downloads every submission file into the staging directory before the
/// sandbox starts.
///
/// One download task per file, joined fail-fast: the first failure cancels
/// the token, siblings that have not started yet bail out, and that first
/// error becomes the operation's error. Partial files are left behind for the
/// caller's staging cleanup to sweep up.
pub async fn fetch_all(
    client: &reqwest::Client,
    dir: &Path,
    files: &[SubmissionFile],
    timeout: Duration,
) -> Result<(), RunError> {
    let token = CancellationToken::new();
    let mut downloads = JoinSet::new();

    for file in files {
        let client = client.clone();
        let token = token.clone();
        let url = file.url.clone();
        let dest = dir.join(&file.name);

        downloads.spawn(async move {
            if token.is_cancelled() {
                return Err(RunError::AttachmentDownload(
                    "cancelled by sibling failure".to_string(),
                ));
            }
            fetch_one(&client, &url, &dest, timeout).await
        });
    }

    let mut first_error = None;
    while let Some(joined) = downloads.join_next().await {
        let result = match joined {
            Ok(result) => result,
            Err(e) => Err(RunError::AttachmentDownload(format!(
                "download task failed: {e}"
            ))),
        };

        if let Err(e) = result {
            token.cancel();
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        None => Ok(()),
        Some(e) => Err(e),
    }
}

async fn fetch_one(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    timeout: Duration,
) -> Result<(), RunError> {
    let mut dest_file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| RunError::AttachmentDownload(format!("{}: {e}", dest.display())))?;

    let mut response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| RunError::AttachmentDownload(format!("{url}: {e}")))?;

    if !response.status().is_success() {
        log::warn!("Cannot get submission file: {url:?} ({})", response.status());
        return Err(RunError::AttachmentDownload(format!(
            "{url}: status {}",
            response.status()
        )));
    }

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| RunError::AttachmentDownload(format!("{url}: {e}")))?
    {
        dest_file
            .write_all(&chunk)
            .await
            .map_err(|e| RunError::AttachmentDownload(format!("{}: {e}", dest.display())))?;
    }

    dest_file
        .flush()
        .await
        .map_err(|e| RunError::AttachmentDownload(format!("{}: {e}", dest.display())))?;

    Ok(())
}
