//! Orchestration service
//!
//! Facade over the discussion aggregator and the SDLC cycle, shared by the
//! CLI and the HTTP server.

use super::aggregator::FanOutAggregator;
use super::coordinator::{RetryCoordinator, SentinelMatcher};
use super::types::{AggregateResponse, CycleReport, RetestReport};
use crate::config::TrioConfig;
use crate::llm::{ProviderRegistry, SharedGenerator};
use crate::roles::{Responder, RoleContext, RoleDescriptor};
use crate::session::{ArtifactKey, SessionContext};
use crate::speech::Transcriber;
use crate::{Result, TrioError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Transcript of a spoken input together with the discussion it started
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDiscussion {
    pub transcript: String,
    pub discussion: AggregateResponse,
}

/// Entry point for every orchestrated operation
pub struct OrchestrationService {
    discussion: FanOutAggregator,
    planner: Responder,
    tester: Responder,
    fixer: Responder,
    coordinator: RetryCoordinator,
}

impl OrchestrationService {
    /// Build from configuration, routing models through a provider registry
    pub fn from_config(config: &TrioConfig) -> Result<Self> {
        let registry = ProviderRegistry::from_config(config);
        tracing::info!(providers = ?registry.provider_ids(), "Providers registered");
        Self::with_generator(config, Arc::new(registry))
    }

    /// Build with an explicit text generator
    pub fn with_generator(config: &TrioConfig, generator: SharedGenerator) -> Result<Self> {
        let sentinel = &config.sdlc.success_sentinel;
        let timeout = Duration::from_secs(config.llm.timeout);
        let role = |name: &str| -> Result<Responder> {
            let descriptor = RoleDescriptor::builtin(name, &config.role_model(name), sentinel)
                .ok_or_else(|| TrioError::config(format!("Unknown role '{}'", name)))?;
            Ok(Responder::new(descriptor, generator.clone()).with_timeout(timeout))
        };

        let members = config
            .discussion
            .roles
            .iter()
            .map(|name| role(name))
            .collect::<Result<Vec<_>>>()?;
        let discussion = FanOutAggregator::new(members)?.with_context(
            RoleContext::new().with("personality", config.discussion.personality.clone()),
        );

        let fixer = role("fixer")?;
        let tester = role("tester")?;
        let coordinator = RetryCoordinator::new(
            role("coder")?,
            tester.clone(),
            fixer.clone(),
            SentinelMatcher::new(sentinel),
            config.sdlc.max_iterations,
        );

        Ok(Self {
            discussion,
            planner: role("planner")?,
            tester,
            fixer,
            coordinator,
        })
    }

    /// Ask every discussion role about `input`
    pub async fn discuss(&self, input: &str) -> Result<AggregateResponse> {
        self.discussion.aggregate(input).await
    }

    /// Turn a request into a PRD and store it in the session
    pub async fn plan(&self, session: &SessionContext, request: &str) -> Result<String> {
        let prd = self.planner.invoke(request, None).await?;
        session.set(ArtifactKey::Prd, prd.clone());
        Ok(prd)
    }

    /// Plan, then run the produce/validate/fix cycle
    pub async fn run_sdlc(&self, session: &SessionContext, request: &str) -> Result<CycleReport> {
        self.plan(session, request).await?;
        let report = self.coordinator.run(session).await?;
        tracing::info!(
            outcome = ?report.outcome,
            iterations = report.iterations,
            invocations = report.invocations,
            role_errors = report.role_errors,
            "SDLC cycle finished"
        );
        Ok(report)
    }

    /// One tester pass over the latest code
    pub async fn retest(&self, session: &SessionContext) -> Result<RetestReport> {
        let code = session.require(ArtifactKey::Code)?;
        let verdict = self.tester.invoke(&code, None).await?;
        session.set(ArtifactKey::TestResult, verdict.clone());

        Ok(RetestReport {
            passed: self.coordinator.matcher().matches(&verdict),
            verdict,
        })
    }

    /// One fixer pass over the latest code and findings; returns the new code
    pub async fn fix_again(&self, session: &SessionContext) -> Result<String> {
        let code = session.require(ArtifactKey::Code)?;
        let findings = session.require(ArtifactKey::TestResult)?;
        let context = RoleContext::new().with("test_result", findings);

        let fixed = self.fixer.invoke(&code, Some(&context)).await?;
        session.set(ArtifactKey::Code, fixed.clone());
        Ok(fixed)
    }

    /// Transcribe an audio file, keep the transcript, then discuss it
    pub async fn discuss_audio(
        &self,
        session: &SessionContext,
        transcriber: &dyn Transcriber,
        audio_path: &Path,
    ) -> Result<AudioDiscussion> {
        let transcript = transcriber.transcribe(audio_path).await?;
        session.set(ArtifactKey::Transcript, transcript.clone());
        let discussion = self.discuss(&transcript).await?;

        Ok(AudioDiscussion {
            transcript,
            discussion,
        })
    }
}
