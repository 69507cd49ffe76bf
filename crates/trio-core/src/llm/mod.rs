//! LLM integration module
//!
//! Text-generation collaborators behind one async trait.
//!
//! Supported providers:
//! - Gemini (Google AI)
//! - OpenAI-compatible chat completions (OpenAI, Groq)
//! - Ollama (local inference)

mod error;
mod gemini;
mod generator;
mod message;
mod ollama;
mod openai;
mod registry;

pub use error::LlmError;
pub use generator::{SharedGenerator, TextGenerator};
pub use message::{ChatMessage, CompletionRequest, MessageRole};
pub use registry::ProviderRegistry;

pub(crate) use gemini::extract_gemini_text;
pub(crate) use generator::{http_client, post_json};

// Provider implementations
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatibleProvider;
