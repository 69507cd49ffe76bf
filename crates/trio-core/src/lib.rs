//! Trio Core - Backend library for Trio
//!
//! This crate provides the UI-agnostic backend functionality:
//! - Responder roles (discussion personas and SDLC stages)
//! - Fan-out discussion and the bounded produce/validate/fix cycle
//! - LLM providers (Gemini, OpenAI-compatible, Ollama)
//! - Speech transcription and synthesis
//! - Session artifact store
//! - Configuration loading
//!
//! Any front end (CLI, HTTP) consumes this crate through `OrchestrationService`.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐            ┌──────────────────────┐        ┌──────────────┐
//! │  CLI / HTTP   │ ─────────→ │ OrchestrationService │ ─────→ │  Responders  │ ──→ LLM
//! └───────────────┘            └──────────────────────┘        └──────────────┘
//!                                        │
//!                                        ▼
//!                                 SessionContext
//! ```
//!
//! # Example
//!
//! ```ignore
//! use trio_core::{load_config, OrchestrationService};
//!
//! let config = load_config(&std::env::current_dir()?)?;
//! let service = OrchestrationService::from_config(&config)?;
//!
//! let response = service.discuss("Should I learn Rust?").await?;
//! for answer in &response.responses {
//!     println!("{}: {:?}", answer.role, answer.output);
//! }
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod orchestration;
pub mod roles;
pub mod session;
pub mod speech;

#[cfg(test)]
mod test_support;

pub use error::{ErrorKind, Result, TrioError};

// Re-export config types
pub use config::{load_config, TrioConfig};

// Re-export LLM types
pub use llm::{
    ChatMessage, CompletionRequest, GeminiProvider, LlmError, OllamaProvider,
    OpenAiCompatibleProvider, ProviderRegistry, SharedGenerator, TextGenerator,
};

// Re-export role types
pub use roles::{Responder, RoleContext, RoleDescriptor};

// Re-export orchestration types
pub use orchestration::{
    AggregateResponse, AudioDiscussion, CycleOutcome, CycleReport, FanOutAggregator,
    InvocationResult, OrchestrationService, RetestReport, RetryCoordinator,
};

// Re-export session types
pub use session::{ArtifactKey, Session, SessionContext, SessionKey, SessionService};

// Re-export speech types
pub use speech::{GeminiSynthesizer, GeminiTranscriber, Synthesizer, Transcriber};

/// Get the crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
