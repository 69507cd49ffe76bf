//! Server state management

use std::sync::Arc;
use trio_core::{
    GeminiSynthesizer, GeminiTranscriber, OrchestrationService, SessionService, Synthesizer,
    Transcriber, TrioConfig,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: TrioConfig,
    pub orchestration: Arc<OrchestrationService>,
    pub sessions: Arc<SessionService>,
    pub transcriber: Arc<dyn Transcriber>,
    pub synthesizer: Arc<dyn Synthesizer>,
}

impl AppState {
    /// Build every collaborator from configuration
    pub fn new(config: TrioConfig) -> trio_core::Result<Self> {
        let orchestration = OrchestrationService::from_config(&config)?;
        let transcriber = Arc::new(GeminiTranscriber::from_config(&config));
        let synthesizer = Arc::new(GeminiSynthesizer::from_config(&config));
        Ok(Self::with_parts(
            config,
            orchestration,
            transcriber,
            synthesizer,
        ))
    }

    /// Assemble state from explicit parts
    pub fn with_parts(
        config: TrioConfig,
        orchestration: OrchestrationService,
        transcriber: Arc<dyn Transcriber>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            config,
            orchestration: Arc::new(orchestration),
            sessions: Arc::new(SessionService::new()),
            transcriber,
            synthesizer,
        }
    }
}
