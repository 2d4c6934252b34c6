use std::time::Duration;

use reqwest::StatusCode;

use crate::error::RunError;
use crate::tasks::Verdict;

/// Outbound webhook POSTs get one attempt, bounded by this timeout. Retrying
/// is the assignment service's call, not ours.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(60);

/// Delivers the verdict to the caller-supplied webhook.
///
/// The body is the verdict as `{"pass": bool, "text": string}` with the raw
/// access token in the `Authorization` header. Anything but a 200 is a
/// delivery failure.
pub async fn send_results(
    client: &reqwest::Client,
    webhook_url: &str,
    access_token: &str,
    verdict: &Verdict,
) -> Result<(), RunError> {
    let response = client
        .post(webhook_url)
        .timeout(WEBHOOK_TIMEOUT)
        .header(reqwest::header::AUTHORIZATION, access_token)
        .json(verdict)
        .send()
        .await
        .map_err(|e| RunError::SendResults(e.to_string()))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(RunError::SendResults(format!(
            "webhook {webhook_url:?} returned {status}"
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| RunError::SendResults(e.to_string()))?;
    log::info!("Webhook {webhook_url:?} response {status}\n{body}");

    Ok(())
}
