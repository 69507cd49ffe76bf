//! Session management
//!
//! An ephemeral key-value store per (app, user, session) through which
//! roles read and write artifacts such as the PRD, generated code and test
//! verdicts.

mod context;
mod service;

pub use context::{ArtifactKey, SessionContext};
pub use service::{Session, SessionKey, SessionService};
