//! Responder role
//!
//! Frames input with the role prompt and makes exactly one collaborator call.

use super::{RoleContext, RoleDescriptor};
use crate::llm::{ChatMessage, CompletionRequest, SharedGenerator};
use crate::{Result, TrioError};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// A role bound to the collaborator that answers for it
#[derive(Clone)]
pub struct Responder {
    descriptor: RoleDescriptor,
    generator: SharedGenerator,
    timeout: Duration,
}

impl Responder {
    pub fn new(descriptor: RoleDescriptor, generator: SharedGenerator) -> Self {
        Self {
            descriptor,
            generator,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound on a single collaborator call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &RoleDescriptor {
        &self.descriptor
    }

    /// Build the single-message request for `input`
    pub fn frame(&self, input: &str, context: Option<&RoleContext>) -> CompletionRequest {
        let mut content = String::from(self.descriptor.prompt());

        if let Some(context) = context {
            for (key, value) in context.iter() {
                content.push_str(&format!("\n\n{}:\n{}", key, value));
            }
        }

        content.push_str(&format!("\n\nInput:\n{}", input));

        CompletionRequest::new(self.descriptor.model(), vec![ChatMessage::user(content)])
    }

    /// Invoke the role once.
    ///
    /// Empty input fails with `InvalidInput` before any collaborator call.
    /// The answer is trimmed; a blank answer is `EmptyCompletion`.
    pub async fn invoke(&self, input: &str, context: Option<&RoleContext>) -> Result<String> {
        if input.trim().is_empty() {
            return Err(TrioError::invalid_input(format!(
                "Role '{}' needs non-empty input",
                self.name()
            )));
        }

        let request = self.frame(input, context);
        tracing::debug!(role = %self.name(), model = %self.descriptor.model(), "Invoking role");

        let text = match tokio::time::timeout(self.timeout, self.generator.generate(request)).await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::warn!(role = %self.name(), error = %e, "Role call failed");
                return Err(e.into());
            }
            Err(_) => {
                tracing::warn!(role = %self.name(), timeout = ?self.timeout, "Role call timed out");
                return Err(TrioError::unavailable(format!(
                    "Role '{}' timed out after {:?}",
                    self.name(),
                    self.timeout
                )));
            }
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TrioError::empty_completion(format!(
                "Role '{}' returned no content",
                self.name()
            )));
        }

        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, OllamaProvider};
    use crate::test_support::{silent_http_server, ScriptedGenerator};
    use crate::ErrorKind;
    use std::sync::Arc;

    fn responder(fake: &Arc<ScriptedGenerator>) -> Responder {
        let descriptor = RoleDescriptor::new("fun", "test/fun", "Be funny.");
        Responder::new(descriptor, fake.clone())
    }

    #[tokio::test]
    async fn test_empty_input_skips_collaborator() {
        let fake = Arc::new(ScriptedGenerator::new().reply("test/fun", "ha"));
        let err = responder(&fake).invoke("   ", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(fake.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_output_is_trimmed() {
        let fake = Arc::new(ScriptedGenerator::new().reply("test/fun", "\n  ha ha  \n"));
        let out = responder(&fake).invoke("tell a joke", None).await.unwrap();
        assert_eq!(out, "ha ha");
        assert_eq!(fake.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_completion_is_empty_completion() {
        let fake = Arc::new(ScriptedGenerator::new().reply("test/fun", "   "));
        let err = responder(&fake).invoke("joke", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCompletion);
    }

    #[tokio::test]
    async fn test_transport_failure_is_unavailable() {
        let fake = Arc::new(
            ScriptedGenerator::new().fail("test/fun", LlmError::Connection("refused".into())),
        );
        let err = responder(&fake).invoke("joke", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_unavailable() {
        let fake = Arc::new(
            ScriptedGenerator::new()
                .reply("test/fun", "late")
                .delay("test/fun", Duration::from_secs(60)),
        );
        let err = responder(&fake)
            .with_timeout(Duration::from_secs(5))
            .invoke("joke", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);
    }

    #[tokio::test]
    async fn test_timeout_closes_provider_connection() {
        let (url, closed) = silent_http_server().await;
        let provider = Arc::new(OllamaProvider::new(&url, 60));
        let descriptor = RoleDescriptor::new("fun", "llama3", "Be funny.");

        let err = Responder::new(descriptor, provider)
            .with_timeout(Duration::from_millis(300))
            .invoke("joke", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);

        let closed = tokio::time::timeout(Duration::from_secs(5), closed).await;
        assert!(closed.is_ok(), "connection stayed open after the role timed out");
    }

    #[test]
    fn test_frame_prepends_prompt_and_context() {
        let fake = Arc::new(ScriptedGenerator::new());
        let context = RoleContext::new().with("personality", "user");
        let request = responder(&fake).frame("Ship on Friday?", Some(&context));

        assert_eq!(request.model, "test/fun");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(
            request.messages[0],
            ChatMessage::user("Be funny.\n\npersonality:\nuser\n\nInput:\nShip on Friday?")
        );
    }
}
