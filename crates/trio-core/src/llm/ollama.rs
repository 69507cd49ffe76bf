//! Ollama text-generation provider
//!
//! Connects to a local Ollama instance (`/api/chat`, non-streaming).

use super::generator::{http_client, post_json};
use super::{CompletionRequest, LlmError, TextGenerator};
use async_trait::async_trait;

/// Ollama provider for local LLM inference
pub struct OllamaProvider {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client with the configured timeout
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(timeout_secs),
        }
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new("http://localhost:11434", 120)
    }
}

#[async_trait]
impl TextGenerator for OllamaProvider {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = serde_json::json!({
            "model": request.model,
            "messages": request.wire_messages(),
            "stream": false
        });

        let json = post_json(self.client.post(&url), &body).await?;

        if let Some(error) = json.get("error").and_then(|e| e.as_str()) {
            return Err(LlmError::Api {
                status: 500,
                message: error.to_string(),
            });
        }

        json.get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .ok_or(LlmError::EmptyResponse)
    }
}
