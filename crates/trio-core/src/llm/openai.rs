//! OpenAI-compatible text-generation provider
//!
//! Talks to any `/chat/completions` endpoint (OpenAI, Groq, local proxies).

use super::generator::{http_client, post_json};
use super::{CompletionRequest, LlmError, TextGenerator};
use async_trait::async_trait;

/// Provider for OpenAI-compatible chat completion APIs
pub struct OpenAiCompatibleProvider {
    /// API key
    api_key: String,

    /// Base URL, e.g. `https://api.openai.com/v1`
    base_url: String,

    /// HTTP client with the configured timeout
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider against `base_url`
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(timeout_secs),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleProvider {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": request.model,
            "messages": request.wire_messages(),
            "temperature": 0.7
        });

        let json = post_json(
            self.client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key)),
            &body,
        )
        .await?;
        extract_choice_text(&json)
    }
}

/// Text of the first choice in a chat completion response
fn extract_choice_text(json: &serde_json::Value) -> Result<String, LlmError> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(LlmError::Api {
            status: 500,
            message: message.to_string(),
        });
    }

    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or(LlmError::EmptyResponse)
}
