//! Trio - group discussion and SDLC orchestration from the terminal
//!
//! Features:
//! - Three personas answering every message concurrently
//! - Plan, code, test and fix cycle with a bounded retry budget
//! - Speech in (transcription) and speech out (WAV synthesis)
//! - Optional HTTP server (feature `web`)

pub mod commands;
pub mod repl;

// Re-export commonly used types
pub use commands::{ParseError, SlashCommand, SlashCommandParser};
pub use repl::{Repl, Reply};
