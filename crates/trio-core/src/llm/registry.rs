//! Provider registry for routing model identifiers to providers

use super::{
    CompletionRequest, GeminiProvider, LlmError, OllamaProvider, OpenAiCompatibleProvider,
    SharedGenerator, TextGenerator,
};
use crate::config::TrioConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for managing multiple text-generation providers
///
/// Model identifiers take the form `provider/model`
/// (`gemini/gemini-2.5-flash`, `groq/llama-3.3-70b-versatile`). Identifiers
/// whose prefix is not a registered provider are sent whole to the default
/// provider.
pub struct ProviderRegistry {
    /// All registered providers
    providers: HashMap<String, SharedGenerator>,

    /// Provider for identifiers without a known prefix
    default_provider: String,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new(default_provider: &str) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.to_string(),
        }
    }

    /// Create a registry from configuration
    ///
    /// Hosted providers without an API key are skipped.
    pub fn from_config(config: &TrioConfig) -> Self {
        let mut registry = Self::new(&config.llm.default_provider);
        let timeout = config.llm.timeout;

        for (id, provider) in config.llm.providers.iter().filter(|(_, p)| p.enabled) {
            let api_key = provider.api_key.as_deref().unwrap_or_default();
            let generator: SharedGenerator = match id.as_str() {
                "ollama" => Arc::new(OllamaProvider::new(
                    provider
                        .base_url
                        .as_deref()
                        .unwrap_or("http://localhost:11434"),
                    timeout,
                )),
                _ if api_key.is_empty() => {
                    tracing::debug!(provider = %id, "Skipping provider without API key");
                    continue;
                }
                "gemini" => {
                    let mut gemini = GeminiProvider::new(api_key, timeout);
                    if let Some(url) = provider.base_url.as_deref() {
                        gemini = gemini.with_base_url(url);
                    }
                    Arc::new(gemini)
                }
                _ => match provider.base_url.as_deref() {
                    Some(url) => Arc::new(OpenAiCompatibleProvider::new(url, api_key, timeout)),
                    None => {
                        tracing::warn!(provider = %id, "Provider has no base_url, skipping");
                        continue;
                    }
                },
            };
            registry.register(id, generator);
        }

        registry
    }

    /// Register a provider
    pub fn register(&mut self, id: &str, provider: SharedGenerator) {
        self.providers.insert(id.to_string(), provider);
    }

    /// Get a provider by ID
    pub fn get(&self, id: &str) -> Option<SharedGenerator> {
        self.providers.get(id).cloned()
    }

    /// Get all registered provider IDs, sorted
    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Resolve a model identifier to its provider and the bare model name
    pub fn resolve<'a>(&self, model: &'a str) -> Result<(SharedGenerator, &'a str), LlmError> {
        let (provider_id, bare_model) = match model.split_once('/') {
            Some((prefix, rest)) if self.providers.contains_key(prefix) => (prefix, rest),
            _ => (self.default_provider.as_str(), model),
        };

        let provider = self.get(provider_id).ok_or_else(|| {
            LlmError::ProviderUnavailable(format!(
                "Provider '{}' is not configured (model '{}')",
                provider_id, model
            ))
        })?;

        Ok((provider, bare_model))
    }
}

#[async_trait]
impl TextGenerator for ProviderRegistry {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let (provider, model) = self.resolve(&request.model)?;
        let routed = CompletionRequest::new(model, request.messages);
        provider.generate(routed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use crate::test_support::ScriptedGenerator;

    fn registry_with(fake: Arc<ScriptedGenerator>) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new("gemini");
        registry.register("gemini", fake.clone());
        registry.register("groq", fake);
        registry
    }

    #[tokio::test]
    async fn test_prefix_routes_and_strips() {
        let fake = Arc::new(ScriptedGenerator::new().reply("llama-3.3-70b-versatile", "ok"));
        let registry = registry_with(fake.clone());

        let request = CompletionRequest::new(
            "groq/llama-3.3-70b-versatile",
            vec![ChatMessage::user("hi")],
        );
        assert_eq!(registry.generate(request).await.unwrap(), "ok");
        assert_eq!(fake.calls_for("llama-3.3-70b-versatile"), 1);
    }

    #[tokio::test]
    async fn test_bare_model_uses_default_provider() {
        let fake = Arc::new(ScriptedGenerator::new().reply("gemini-2.5-flash", "bare"));
        let registry = registry_with(fake);

        let request = CompletionRequest::new("gemini-2.5-flash", vec![ChatMessage::user("hi")]);
        assert_eq!(registry.generate(request).await.unwrap(), "bare");
    }

    #[test]
    fn test_unknown_default_provider() {
        let registry = ProviderRegistry::new("openai");
        assert!(matches!(
            registry.resolve("gpt-4o"),
            Err(LlmError::ProviderUnavailable(_))
        ));
    }

    #[test]
    fn test_from_config_skips_keyless_hosted_providers() {
        let mut config = TrioConfig::default();
        for provider in config.llm.providers.values_mut() {
            provider.enabled = true;
            provider.api_key = None;
        }
        config
            .llm
            .providers
            .get_mut("groq")
            .unwrap()
            .api_key = Some("gsk_test".to_string());

        let registry = ProviderRegistry::from_config(&config);
        assert_eq!(registry.provider_ids(), vec!["groq", "ollama"]);
    }
}
