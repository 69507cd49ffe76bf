//! Slash command parser
//!
//! Parses prompt lines starting with "/" into structured commands. Any other
//! line is discussion input.

use std::path::PathBuf;
use thiserror::Error;
use trio_core::ArtifactKey;

/// A command typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    /// Plan and run the SDLC cycle for a request
    Sdlc { request: String },
    /// One more tester pass over the stored code
    Retest,
    /// One more fixer pass over the stored code
    Fix,
    /// Print a stored artifact
    Show { artifact: ArtifactKey },
    /// Transcribe an audio file and discuss it
    Listen { path: PathBuf },
    /// Speak text into a WAV file
    Say {
        personality: String,
        output: PathBuf,
        text: String,
    },
    Help,
    Quit,
}

/// Errors that can occur during slash command parsing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Empty command (just "/")
    #[error("Empty command")]
    Empty,

    /// Unknown command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Missing required argument
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// Invalid argument format
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Parser for slash commands
pub struct SlashCommandParser;

impl SlashCommandParser {
    /// Parse a line into a slash command
    ///
    /// Returns `None` if the input doesn't start with "/"
    /// Returns `Some(Ok(...))` if parsing succeeds
    /// Returns `Some(Err(...))` if parsing fails
    pub fn parse(input: &str) -> Option<Result<SlashCommand, ParseError>> {
        let trimmed = input.trim();
        let rest = trimmed.strip_prefix('/')?;
        Some(Self::parse_command(rest))
    }

    fn parse_command(input: &str) -> Result<SlashCommand, ParseError> {
        let input = input.trim_start();
        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };
        if cmd.is_empty() {
            return Err(ParseError::Empty);
        }

        match cmd.to_lowercase().as_str() {
            "sdlc" | "build" => {
                if rest.is_empty() {
                    return Err(ParseError::MissingArgument("request".to_string()));
                }
                Ok(SlashCommand::Sdlc {
                    request: rest.to_string(),
                })
            }
            "retest" | "test" => Ok(SlashCommand::Retest),
            "fix" => Ok(SlashCommand::Fix),
            "show" => {
                let name = rest
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| ParseError::MissingArgument("artifact name".to_string()))?;
                let artifact = name.parse().map_err(ParseError::InvalidArgument)?;
                Ok(SlashCommand::Show { artifact })
            }
            "listen" => {
                if rest.is_empty() {
                    return Err(ParseError::MissingArgument("audio file path".to_string()));
                }
                Ok(SlashCommand::Listen {
                    path: PathBuf::from(rest),
                })
            }
            "say" => Self::parse_say(rest),
            "help" | "h" | "?" => Ok(SlashCommand::Help),
            "quit" | "exit" | "q" => Ok(SlashCommand::Quit),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }

    /// `/say <personality> <output.wav> <text...>`
    fn parse_say(rest: &str) -> Result<SlashCommand, ParseError> {
        let mut parts = rest.splitn(3, char::is_whitespace);
        let personality = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ParseError::MissingArgument("personality".to_string()))?;
        let output = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ParseError::MissingArgument("output file".to_string()))?;
        let text = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ParseError::MissingArgument("text".to_string()))?;

        Ok(SlashCommand::Say {
            personality: personality.to_string(),
            output: PathBuf::from(output),
            text: text.to_string(),
        })
    }
}

/// Help text printed by `/help`
pub fn help_text() -> &'static str {
    r#"Type anything to hear from every discussion role.

Commands:
  /sdlc <request>                    Plan, code, test and fix until the tests pass
  /retest                            Run the tester again on the stored code
  /fix                               Run the fixer again on the stored code
  /show <prd|code|test_result|transcript>
                                     Print a stored artifact
  /listen <audio file>               Transcribe audio and discuss it
  /say <personality> <out.wav> <text>
                                     Speak text into a WAV file
  /help                              Show this help
  /quit                              Exit"#
}
