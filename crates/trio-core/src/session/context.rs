//! Session context - per-session artifact store

use crate::{Result, TrioError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Typed names of the artifacts roles exchange through a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKey {
    /// Product requirements document written by the planner
    Prd,
    /// Generated code (JSON map of file name to contents)
    Code,
    /// Latest tester verdict
    TestResult,
    /// Latest speech transcript
    Transcript,
}

impl ArtifactKey {
    pub const ALL: [ArtifactKey; 4] = [
        ArtifactKey::Prd,
        ArtifactKey::Code,
        ArtifactKey::TestResult,
        ArtifactKey::Transcript,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKey::Prd => "prd",
            ArtifactKey::Code => "code",
            ArtifactKey::TestResult => "test_result",
            ArtifactKey::Transcript => "transcript",
        }
    }

    /// Guidance returned when a role needs this artifact and it is missing
    pub fn missing_guidance(&self) -> &'static str {
        match self {
            ArtifactKey::Prd => "No PRD found in session. Please run the planner first.",
            ArtifactKey::Code => "No code found in session. Please run the coder first.",
            ArtifactKey::TestResult => {
                "No test result found in session. Please run the tester first."
            }
            ArtifactKey::Transcript => "No transcript found in session.",
        }
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prd" => Ok(ArtifactKey::Prd),
            "code" => Ok(ArtifactKey::Code),
            "test_result" | "test-result" | "tests" => Ok(ArtifactKey::TestResult),
            "transcript" => Ok(ArtifactKey::Transcript),
            _ => Err(format!("Unknown artifact: {}", s)),
        }
    }
}

/// Artifact store scoped to one session.
///
/// Last write wins. The lock is only held inside `get`/`set`, never while a
/// role is talking to its collaborator.
#[derive(Debug, Default)]
pub struct SessionContext {
    artifacts: RwLock<HashMap<ArtifactKey, String>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an artifact; `None` means missing
    pub fn get(&self, key: ArtifactKey) -> Option<String> {
        self.artifacts.read().get(&key).cloned()
    }

    /// Write an artifact, replacing any previous value
    pub fn set(&self, key: ArtifactKey, value: impl Into<String>) {
        self.artifacts.write().insert(key, value.into());
    }

    /// Read an artifact a role depends on, failing with guidance if missing
    pub fn require(&self, key: ArtifactKey) -> Result<String> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| TrioError::invalid_input(key.missing_guidance()))
    }
}
