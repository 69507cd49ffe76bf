//! Interactive session
//!
//! Turns one prompt line into one JSON reply against a bootstrapped session.

use crate::commands::{help_text, SlashCommand, SlashCommandParser};
use serde::Serialize;
use std::sync::Arc;
use trio_core::{OrchestrationService, Session, Synthesizer, Transcriber, TrioError};

/// What the prompt loop should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this text
    Output(String),
    /// Nothing to print
    Nothing,
    /// Leave the loop
    Quit,
}

/// One interactive session bound to its collaborators
pub struct Repl {
    service: Arc<OrchestrationService>,
    session: Arc<Session>,
    transcriber: Arc<dyn Transcriber>,
    synthesizer: Arc<dyn Synthesizer>,
}

impl Repl {
    pub fn new(
        service: Arc<OrchestrationService>,
        session: Arc<Session>,
        transcriber: Arc<dyn Transcriber>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            service,
            session,
            transcriber,
            synthesizer,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handle one line of input
    pub async fn handle_line(&self, line: &str) -> Reply {
        let line = line.trim();
        if line.is_empty() {
            return Reply::Nothing;
        }

        match SlashCommandParser::parse(line) {
            None => render(self.service.discuss(line).await),
            Some(Err(e)) => Reply::Output(format!("{} (try /help)", e)),
            Some(Ok(cmd)) => self.execute(cmd).await,
        }
    }

    async fn execute(&self, cmd: SlashCommand) -> Reply {
        let context = self.session.context();
        match cmd {
            SlashCommand::Sdlc { request } => {
                render(self.service.run_sdlc(context, &request).await)
            }
            SlashCommand::Retest => render(self.service.retest(context).await),
            SlashCommand::Fix => render(
                self.service
                    .fix_again(context)
                    .await
                    .map(|code| serde_json::json!({ "code": code })),
            ),
            SlashCommand::Show { artifact } => match context.get(artifact) {
                Some(value) => Reply::Output(value),
                None => Reply::Output(artifact.missing_guidance().to_string()),
            },
            SlashCommand::Listen { path } => render(
                self.service
                    .discuss_audio(context, self.transcriber.as_ref(), &path)
                    .await,
            ),
            SlashCommand::Say {
                personality,
                output,
                text,
            } => render(
                self.synthesizer
                    .synthesize(&personality, &text, &output)
                    .await
                    .map(|path| path.display().to_string()),
            ),
            SlashCommand::Help => Reply::Output(help_text().to_string()),
            SlashCommand::Quit => Reply::Quit,
        }
    }
}

/// Pretty JSON for a result; errors become `{"error": {kind, message}}`
fn render<T: Serialize>(result: trio_core::Result<T>) -> Reply {
    let value = match result {
        Ok(value) => serde_json::to_value(value).map_err(TrioError::from),
        Err(e) => Err(e),
    };

    let json = match value {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "Command failed");
            serde_json::json!({
                "error": { "kind": e.kind(), "message": e.user_message() }
            })
        }
    };

    Reply::Output(serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};
    use trio_core::config::{RoleConfig, DEFAULT_SUCCESS_SENTINEL};
    use trio_core::roles::BUILTIN_ROLES;
    use trio_core::{
        ArtifactKey, CompletionRequest, LlmError, SessionKey, SessionService, TextGenerator,
        TrioConfig,
    };

    struct RoleEcho;

    #[async_trait]
    impl TextGenerator for RoleEcho {
        async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
            match request.model.as_str() {
                "test/planner" => Ok("PRD".to_string()),
                "test/coder" => Ok("{}".to_string()),
                "test/tester" => Ok(DEFAULT_SUCCESS_SENTINEL.to_string()),
                other => Ok(format!("reply from {}", other)),
            }
        }
    }

    struct Unused;

    #[async_trait]
    impl Transcriber for Unused {
        async fn transcribe(&self, _audio_path: &Path) -> trio_core::Result<String> {
            Err(TrioError::unavailable("offline"))
        }
    }

    #[async_trait]
    impl Synthesizer for Unused {
        async fn synthesize(
            &self,
            _personality: &str,
            _text: &str,
            output_path: &Path,
        ) -> trio_core::Result<PathBuf> {
            Ok(output_path.to_path_buf())
        }
    }

    fn repl() -> Repl {
        let mut config = TrioConfig::default();
        for name in BUILTIN_ROLES {
            config
                .roles
                .insert(name.to_string(), RoleConfig::new(format!("test/{}", name)));
        }
        let service = OrchestrationService::with_generator(&config, Arc::new(RoleEcho)).unwrap();
        let sessions = SessionService::new();
        let session =
            sessions.create_session(SessionKey::new("chat", "user1", "session1").unwrap());
        Repl::new(Arc::new(service), session, Arc::new(Unused), Arc::new(Unused))
    }

    fn output(reply: Reply) -> serde_json::Value {
        match reply {
            Reply::Output(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_plain_text_is_discussed() {
        let json = output(repl().handle_line("hello").await);
        assert_eq!(json["responses"][1]["role"], "fun");
        assert_eq!(json["responses"][1]["output"], "reply from test/fun");
    }

    #[tokio::test]
    async fn test_sdlc_then_show() {
        let repl = repl();
        let report = output(repl.handle_line("/sdlc Build a todo app").await);
        assert_eq!(report["outcome"], "succeeded");

        assert_eq!(
            repl.handle_line("/show prd").await,
            Reply::Output("PRD".to_string())
        );
        assert_eq!(
            repl.session().context().get(ArtifactKey::Code).as_deref(),
            Some("{}")
        );
    }

    #[tokio::test]
    async fn test_errors_are_rendered() {
        let json = output(repl().handle_line("/listen clip.wav").await);
        assert_eq!(json["error"]["kind"], "collaborator_unavailable");
    }

    #[tokio::test]
    async fn test_blank_and_quit() {
        let repl = repl();
        assert_eq!(repl.handle_line("   ").await, Reply::Nothing);
        assert_eq!(repl.handle_line("/quit").await, Reply::Quit);
    }
}
