//! Bounded retry coordinator
//!
//! Runs producer → validator → fixer until the validator emits the success
//! sentinel or the validation budget is spent.
//!
//! ```text
//!   Produce ──Produced──▶ Validate ──passed──────────────▶ Succeeded
//!                           ▲   │
//!                       Fixed   ├─failed, count < max──▶ Fix
//!                           │   │
//!                           └── Fix
//!                               └─failed, count == max─▶ Exhausted
//! ```

use super::types::{CycleOutcome, CycleReport, ErrorDetail};
use crate::roles::{Responder, RoleContext};
use crate::session::{ArtifactKey, SessionContext};
use crate::{Result, TrioError};
use serde::{Deserialize, Serialize};

/// Stage of a retry cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStage {
    Produce,
    Validate,
    Fix,
    Succeeded,
    Exhausted,
}

impl CycleStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CycleStage::Succeeded | CycleStage::Exhausted)
    }
}

/// Something that happened in the current stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEvent {
    /// The producer yielded an artifact
    Produced,
    /// The validator finished; `passed` if the sentinel was seen
    Validated { passed: bool },
    /// The fixer finished (successfully or not)
    Fixed,
}

/// State of one cycle instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleState {
    stage: CycleStage,
    /// Validation passes performed; `0 <= count <= max`
    count: u32,
    max: u32,
    /// Validator and fixer failures absorbed by the cycle
    role_errors: u32,
    last_error: Option<ErrorDetail>,
    invocations: u32,
}

impl CycleState {
    /// Fresh cycle in `Produce`; `max` is clamped to at least 1
    pub fn new(max: u32) -> Self {
        Self {
            stage: CycleStage::Produce,
            count: 0,
            max: max.max(1),
            role_errors: 0,
            last_error: None,
            invocations: 0,
        }
    }

    pub fn stage(&self) -> CycleStage {
        self.stage
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn invocations(&self) -> u32 {
        self.invocations
    }

    pub fn role_errors(&self) -> u32 {
        self.role_errors
    }

    /// Sanitised detail of the most recent absorbed failure
    pub fn last_error(&self) -> Option<&ErrorDetail> {
        self.last_error.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Count one role invocation against the `1 + 2*max` budget
    pub fn record_invocation(&mut self) {
        self.invocations += 1;
    }

    pub fn record_error(&mut self, error: &TrioError) {
        self.role_errors += 1;
        self.last_error = Some(ErrorDetail::from(error));
    }

    /// Apply an event. Terminal states and out-of-stage events are rejected
    /// and leave the state untouched.
    pub fn advance(&mut self, event: CycleEvent) -> Result<CycleStage> {
        let next = match (self.stage, event) {
            (stage, _) if stage.is_terminal() => {
                return Err(TrioError::invalid_operation(format!(
                    "Cycle already finished ({:?})",
                    stage
                )));
            }
            (CycleStage::Produce, CycleEvent::Produced) => {
                self.count = 1;
                CycleStage::Validate
            }
            (CycleStage::Validate, CycleEvent::Validated { passed: true }) => CycleStage::Succeeded,
            (CycleStage::Validate, CycleEvent::Validated { passed: false }) => {
                if self.count < self.max {
                    CycleStage::Fix
                } else {
                    CycleStage::Exhausted
                }
            }
            (CycleStage::Fix, CycleEvent::Fixed) => {
                self.count += 1;
                CycleStage::Validate
            }
            (stage, event) => {
                return Err(TrioError::invalid_operation(format!(
                    "Event {:?} is not valid in stage {:?}",
                    event, stage
                )));
            }
        };

        tracing::info!(from = ?self.stage, to = ?next, count = self.count, "Cycle transition");
        self.stage = next;
        Ok(next)
    }
}

/// Decides whether a validator verdict signals success.
///
/// Both sides are whitespace-normalised; the match is a case-sensitive
/// substring test, so an exact sentinel line also matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelMatcher {
    sentinel: String,
}

impl SentinelMatcher {
    pub fn new(sentinel: &str) -> Self {
        Self {
            sentinel: normalize_whitespace(sentinel),
        }
    }

    pub fn matches(&self, verdict: &str) -> bool {
        !self.sentinel.is_empty() && normalize_whitespace(verdict).contains(&self.sentinel)
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drives the produce/validate/fix cycle against a session
pub struct RetryCoordinator {
    producer: Responder,
    validator: Responder,
    fixer: Responder,
    matcher: SentinelMatcher,
    max_iterations: u32,
}

impl RetryCoordinator {
    pub fn new(
        producer: Responder,
        validator: Responder,
        fixer: Responder,
        matcher: SentinelMatcher,
        max_iterations: u32,
    ) -> Self {
        Self {
            producer,
            validator,
            fixer,
            matcher,
            max_iterations,
        }
    }

    pub fn matcher(&self) -> &SentinelMatcher {
        &self.matcher
    }

    /// Run one full cycle over the session's PRD.
    ///
    /// Writes `code` after production and after each successful fix, and
    /// `test_result` after each validation. A producer failure aborts the
    /// run; validator and fixer failures are recorded and count as a failed
    /// pass.
    pub async fn run(&self, session: &SessionContext) -> Result<CycleReport> {
        let prd = session.require(ArtifactKey::Prd)?;
        let mut state = CycleState::new(self.max_iterations);

        state.record_invocation();
        let mut code = match self.producer.invoke(&prd, None).await {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!(role = %self.producer.name(), error = %e, "Producer failed");
                return Err(e);
            }
        };
        session.set(ArtifactKey::Code, code.clone());
        state.advance(CycleEvent::Produced)?;

        while !state.is_terminal() {
            match state.stage() {
                CycleStage::Validate => {
                    let passed = self.validate(&code, session, &mut state).await;
                    state.advance(CycleEvent::Validated { passed })?;
                }
                CycleStage::Fix => {
                    if let Some(fixed) = self.fix(&code, session, &mut state).await {
                        code = fixed;
                        session.set(ArtifactKey::Code, code.clone());
                    }
                    state.advance(CycleEvent::Fixed)?;
                }
                other => {
                    return Err(TrioError::invalid_operation(format!(
                        "Unexpected cycle stage {:?}",
                        other
                    )))
                }
            }
        }

        Ok(self.report(&state, code))
    }

    async fn validate(
        &self,
        code: &str,
        session: &SessionContext,
        state: &mut CycleState,
    ) -> bool {
        state.record_invocation();
        match self.validator.invoke(code, None).await {
            Ok(verdict) => {
                let passed = self.matcher.matches(&verdict);
                session.set(ArtifactKey::TestResult, verdict);
                passed
            }
            Err(e) => {
                tracing::warn!(role = %self.validator.name(), error = %e, "Validator failed");
                session.set(ArtifactKey::TestResult, e.user_message());
                state.record_error(&e);
                false
            }
        }
    }

    async fn fix(
        &self,
        code: &str,
        session: &SessionContext,
        state: &mut CycleState,
    ) -> Option<String> {
        let findings = session
            .get(ArtifactKey::TestResult)
            .unwrap_or_else(|| "No findings recorded.".to_string());
        let context = RoleContext::new().with("test_result", findings);

        state.record_invocation();
        match self.fixer.invoke(code, Some(&context)).await {
            Ok(fixed) => Some(fixed),
            Err(e) => {
                tracing::warn!(role = %self.fixer.name(), error = %e, "Fixer failed, keeping previous code");
                state.record_error(&e);
                None
            }
        }
    }

    fn report(&self, state: &CycleState, code: String) -> CycleReport {
        let (outcome, message) = match state.stage() {
            CycleStage::Succeeded => (
                CycleOutcome::Succeeded,
                format!("Tests passed after {} validation pass(es).", state.count()),
            ),
            _ => (
                CycleOutcome::Exhausted,
                TrioError::RetryBudgetExhausted {
                    attempts: state.count(),
                }
                .user_message(),
            ),
        };

        CycleReport {
            outcome,
            iterations: state.count(),
            invocations: state.invocations(),
            message,
            code,
            role_errors: state.role_errors(),
            last_error: state.last_error().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::roles::RoleDescriptor;
    use crate::test_support::ScriptedGenerator;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const SENTINEL: &str = "U EE A E A U EE EE A E";

    fn role(fake: &Arc<ScriptedGenerator>, name: &str) -> Responder {
        let descriptor = RoleDescriptor::new(name, format!("test/{}", name), name.to_string());
        Responder::new(descriptor, fake.clone())
    }

    fn coordinator(fake: &Arc<ScriptedGenerator>, max: u32) -> RetryCoordinator {
        RetryCoordinator::new(
            role(fake, "coder"),
            role(fake, "tester"),
            role(fake, "fixer"),
            SentinelMatcher::new(SENTINEL),
            max,
        )
    }

    fn session_with_prd() -> SessionContext {
        let session = SessionContext::new();
        session.set(ArtifactKey::Prd, "Build a library app");
        session
    }

    #[test]
    fn test_state_machine_happy_path() {
        let mut state = CycleState::new(3);
        assert_eq!(state.advance(CycleEvent::Produced).unwrap(), CycleStage::Validate);
        assert_eq!(state.count(), 1);
        assert_eq!(
            state.advance(CycleEvent::Validated { passed: false }).unwrap(),
            CycleStage::Fix
        );
        assert_eq!(state.advance(CycleEvent::Fixed).unwrap(), CycleStage::Validate);
        assert_eq!(state.count(), 2);
        assert_eq!(
            state.advance(CycleEvent::Validated { passed: true }).unwrap(),
            CycleStage::Succeeded
        );
    }

    #[test]
    fn test_terminal_state_rejects_events() {
        let mut state = CycleState::new(1);
        state.advance(CycleEvent::Produced).unwrap();
        assert_eq!(
            state.advance(CycleEvent::Validated { passed: false }).unwrap(),
            CycleStage::Exhausted
        );

        let before = state.clone();
        for event in [
            CycleEvent::Produced,
            CycleEvent::Validated { passed: true },
            CycleEvent::Fixed,
        ] {
            assert!(state.advance(event).is_err());
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_succeeded_rejects_events() {
        let mut state = CycleState::new(3);
        state.advance(CycleEvent::Produced).unwrap();
        assert_eq!(
            state.advance(CycleEvent::Validated { passed: true }).unwrap(),
            CycleStage::Succeeded
        );

        let before = state.clone();
        for event in [
            CycleEvent::Produced,
            CycleEvent::Validated { passed: false },
            CycleEvent::Fixed,
        ] {
            let err = state.advance(event).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        }
        assert_eq!(state, before);
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn test_out_of_stage_event_rejected() {
        let mut state = CycleState::new(3);
        assert!(state.advance(CycleEvent::Fixed).is_err());
        assert_eq!(state.stage(), CycleStage::Produce);
    }

    #[test]
    fn test_count_never_exceeds_max() {
        let mut state = CycleState::new(3);
        state.advance(CycleEvent::Produced).unwrap();
        while !state.is_terminal() {
            match state.stage() {
                CycleStage::Validate => {
                    state.advance(CycleEvent::Validated { passed: false }).unwrap();
                }
                CycleStage::Fix => {
                    state.advance(CycleEvent::Fixed).unwrap();
                }
                _ => unreachable!(),
            }
            assert!(state.count() <= state.max());
        }
        assert_eq!(state.stage(), CycleStage::Exhausted);
        assert_eq!(state.count(), 3);
    }

    #[test]
    fn test_sentinel_matching() {
        let matcher = SentinelMatcher::new(SENTINEL);
        assert!(matcher.matches(SENTINEL));
        assert!(matcher.matches("All good.\nU  EE A E A U EE EE A E\n"));
        assert!(!matcher.matches("u ee a e a u ee ee a e"));
        assert!(!matcher.matches("Line 3: missing import"));
        assert!(!SentinelMatcher::new("  ").matches("anything"));
    }

    #[tokio::test]
    async fn test_success_on_second_validation() {
        let fake = Arc::new(
            ScriptedGenerator::new()
                .reply("test/coder", "{\"main.py\": \"v1\"}")
                .reply("test/tester", "Line 1: syntax error")
                .reply("test/tester", SENTINEL)
                .reply("test/fixer", "{\"main.py\": \"v2\"}"),
        );
        let session = session_with_prd();

        let report = coordinator(&fake, 3).run(&session).await.unwrap();

        assert_eq!(report.outcome, CycleOutcome::Succeeded);
        assert_eq!(report.iterations, 2);
        assert_eq!(report.invocations, 4);
        assert_eq!(report.code, "{\"main.py\": \"v2\"}");
        assert_eq!(fake.calls_for("test/tester"), 2);
        assert_eq!(fake.calls_for("test/fixer"), 1);
        assert_eq!(session.get(ArtifactKey::Code).as_deref(), Some("{\"main.py\": \"v2\"}"));
        assert_eq!(session.get(ArtifactKey::TestResult).as_deref(), Some(SENTINEL));
    }

    #[tokio::test]
    async fn test_exhausted_after_max_validations() {
        let raw_verdict = "Traceback: NameError in models/book.py";
        let fake = Arc::new(
            ScriptedGenerator::new()
                .reply("test/coder", "{}")
                .reply("test/tester", raw_verdict)
                .reply("test/fixer", "{\"fixed\": true}"),
        );
        let session = session_with_prd();

        let report = coordinator(&fake, 3).run(&session).await.unwrap();

        assert_eq!(report.outcome, CycleOutcome::Exhausted);
        assert_eq!(report.iterations, 3);
        assert_eq!(fake.calls_for("test/tester"), 3);
        assert_eq!(fake.calls_for("test/fixer"), 2);
        assert!(report.invocations <= 1 + 2 * 3);
        assert!(!report.message.contains(raw_verdict));
    }

    #[tokio::test]
    async fn test_missing_prd_is_invalid_input() {
        let fake = Arc::new(ScriptedGenerator::new());
        let err = coordinator(&fake, 3)
            .run(&SessionContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("No PRD found"));
        assert_eq!(fake.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_producer_failure_aborts() {
        let fake = Arc::new(
            ScriptedGenerator::new().fail("test/coder", LlmError::Connection("down".into())),
        );
        let err = coordinator(&fake, 3)
            .run(&session_with_prd())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);
        assert_eq!(fake.calls_for("test/tester"), 0);
    }

    #[tokio::test]
    async fn test_failing_validator_counts_as_failed_pass() {
        let fake = Arc::new(
            ScriptedGenerator::new()
                .reply("test/coder", "{}")
                .fail("test/tester", LlmError::Timeout)
                .reply("test/fixer", "{}"),
        );
        let report = coordinator(&fake, 2).run(&session_with_prd()).await.unwrap();
        assert_eq!(report.outcome, CycleOutcome::Exhausted);
        assert_eq!(report.iterations, 2);
        assert_eq!(report.invocations, 4);
        assert_eq!(report.role_errors, 2);
        assert_eq!(
            report.last_error.map(|e| e.kind),
            Some(ErrorKind::CollaboratorUnavailable)
        );
    }

    #[tokio::test]
    async fn test_failing_fixer_is_reported() {
        let fake = Arc::new(
            ScriptedGenerator::new()
                .reply("test/coder", "{}")
                .reply("test/tester", "broken")
                .fail("test/fixer", LlmError::Connection("10.0.0.7:443 refused".into())),
        );
        let report = coordinator(&fake, 3).run(&session_with_prd()).await.unwrap();

        assert_eq!(report.outcome, CycleOutcome::Exhausted);
        assert_eq!(report.role_errors, 2);
        let detail = report.last_error.clone().unwrap();
        assert_eq!(detail.kind, ErrorKind::CollaboratorUnavailable);
        assert!(!detail.message.contains("10.0.0.7"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["role_errors"], 2);
        assert_eq!(json["last_error"]["kind"], "collaborator_unavailable");
    }

    #[tokio::test]
    async fn test_clean_run_has_no_errors() {
        let fake = Arc::new(
            ScriptedGenerator::new()
                .reply("test/coder", "{}")
                .reply("test/tester", SENTINEL),
        );
        let report = coordinator(&fake, 3).run(&session_with_prd()).await.unwrap();

        assert_eq!(report.role_errors, 0);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("last_error").is_none());
    }

    #[tokio::test]
    async fn test_failing_fixer_keeps_previous_code() {
        let fake = Arc::new(
            ScriptedGenerator::new()
                .reply("test/coder", "{\"v\": 1}")
                .reply("test/tester", "broken")
                .reply("test/tester", SENTINEL)
                .fail("test/fixer", LlmError::EmptyResponse),
        );
        let session = session_with_prd();
        let report = coordinator(&fake, 3).run(&session).await.unwrap();

        assert!(report.succeeded());
        assert_eq!(report.code, "{\"v\": 1}");
        assert_eq!(session.get(ArtifactKey::Code).as_deref(), Some("{\"v\": 1}"));
    }

    #[tokio::test]
    async fn test_fixer_receives_findings() {
        let fake = Arc::new(
            ScriptedGenerator::new()
                .reply("test/coder", "{}")
                .reply("test/tester", "missing main()")
                .reply("test/tester", SENTINEL)
                .reply("test/fixer", "{\"main\": 1}"),
        );
        coordinator(&fake, 3).run(&session_with_prd()).await.unwrap();

        let fixer_request = fake
            .requests()
            .into_iter()
            .find(|r| r.model == "test/fixer")
            .unwrap();
        assert!(fixer_request.messages[0]
            .content
            .contains("test_result:\nmissing main()"));
    }
}
