//! Text-generation collaborator trait

use super::{CompletionRequest, LlmError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A collaborator that turns a message list into the text of its top choice.
///
/// Implementations return the raw (untrimmed) text; framing, trimming and
/// error classification happen in the role layer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

/// Shared handle to a text generator
pub type SharedGenerator = Arc<dyn TextGenerator>;

/// Build an HTTP client whose requests give up after `timeout_secs`
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Send a JSON body and decode the JSON answer.
///
/// The request is owned by the returned future: dropping it closes the
/// connection.
pub(crate) async fn post_json(
    request: reqwest::RequestBuilder,
    body: &Value,
) -> Result<Value, LlmError> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(LlmError::from_status(status.as_u16(), retry_after, message));
    }

    Ok(response.json().await?)
}
