//! Gemini (Google AI) text-generation provider
//!
//! Connects to Google's `generateContent` endpoint and returns the first
//! candidate's text.

use super::generator::{http_client, post_json};
use super::{CompletionRequest, LlmError, MessageRole, TextGenerator};
use async_trait::async_trait;

/// Gemini provider for Google AI
pub struct GeminiProvider {
    /// API key
    api_key: String,

    /// Base URL for the API
    base_url: String,

    /// HTTP client with the configured timeout
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(api_key: &str, timeout_secs: u64) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            client: http_client(timeout_secs),
        }
    }

    /// Create with a specific base URL
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key
        );
        let body = build_gemini_body(&request);

        let json = post_json(self.client.post(&url), &body).await?;
        extract_gemini_text(&json)
    }
}

/// Convert messages to Gemini format
fn build_gemini_body(request: &CompletionRequest) -> serde_json::Value {
    let mut contents: Vec<serde_json::Value> = Vec::new();
    let mut system_instruction: Option<String> = None;

    for msg in &request.messages {
        let role = match msg.role {
            MessageRole::System => {
                // Gemini uses system_instruction instead of a system role in contents
                system_instruction = Some(msg.content.clone());
                continue;
            }
            MessageRole::Assistant => "model",
            MessageRole::User => "user",
        };

        contents.push(serde_json::json!({
            "role": role,
            "parts": [{ "text": msg.content }]
        }));
    }

    let mut body = serde_json::json!({ "contents": contents });
    if let Some(instruction) = system_instruction {
        body["system_instruction"] = serde_json::json!({
            "parts": [{ "text": instruction }]
        });
    }
    body
}

/// Pull the first candidate's text out of a `generateContent` response
pub(crate) fn extract_gemini_text(json: &serde_json::Value) -> Result<String, LlmError> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(LlmError::Api {
            status: error.get("code").and_then(|c| c.as_u64()).unwrap_or(500) as u16,
            message: message.to_string(),
        });
    }

    let parts = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or(LlmError::EmptyResponse)?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(text)
    }
}
