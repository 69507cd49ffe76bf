//! Error types for Trio Core
//!
//! Every collaborator failure is folded into this taxonomy before it reaches
//! a caller. Raw transport errors never cross a role boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for Trio Core operations
pub type Result<T> = std::result::Result<T, TrioError>;

/// Unified error type for Trio Core
#[derive(Error, Debug)]
pub enum TrioError {
    /// Empty or malformed caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transport failure or timeout talking to a generation, transcription
    /// or synthesis service
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// The collaborator answered but produced no usable content
    #[error("Empty completion: {0}")]
    EmptyCompletion(String),

    /// The retry cycle ran out of attempts without a success verdict
    #[error("Retry budget exhausted after {attempts} attempts")]
    RetryBudgetExhausted { attempts: u32 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Serializable category of a [`TrioError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    CollaboratorUnavailable,
    EmptyCompletion,
    RetryBudgetExhausted,
    Internal,
}

impl TrioError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        TrioError::InvalidInput(msg.into())
    }

    /// Create a collaborator unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        TrioError::CollaboratorUnavailable(msg.into())
    }

    /// Create an empty completion error
    pub fn empty_completion(msg: impl Into<String>) -> Self {
        TrioError::EmptyCompletion(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        TrioError::Config(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        TrioError::NotFound(msg.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        TrioError::InvalidOperation(msg.into())
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrioError::InvalidInput(_) => ErrorKind::InvalidInput,
            TrioError::CollaboratorUnavailable(_) => ErrorKind::CollaboratorUnavailable,
            TrioError::EmptyCompletion(_) => ErrorKind::EmptyCompletion,
            TrioError::RetryBudgetExhausted { .. } => ErrorKind::RetryBudgetExhausted,
            _ => ErrorKind::Internal,
        }
    }

    /// Message safe to show to an end user.
    ///
    /// Collaborator details (URLs, status bodies) stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            TrioError::InvalidInput(msg) => msg.clone(),
            TrioError::CollaboratorUnavailable(_) => {
                "The model service is unavailable right now. Please try again.".to_string()
            }
            TrioError::EmptyCompletion(_) => "The model returned an empty answer.".to_string(),
            TrioError::RetryBudgetExhausted { attempts } => format!(
                "Tests were still failing after {} attempts. The latest code is kept in the session.",
                attempts
            ),
            TrioError::NotFound(msg) => format!("Not found: {}", msg),
            _ => "Internal error".to_string(),
        }
    }
}

impl From<serde_json::Error> for TrioError {
    fn from(err: serde_json::Error) -> Self {
        TrioError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for TrioError {
    fn from(err: toml::de::Error) -> Self {
        TrioError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            TrioError::invalid_input("x").kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            TrioError::unavailable("x").kind(),
            ErrorKind::CollaboratorUnavailable
        );
        assert_eq!(
            TrioError::RetryBudgetExhausted { attempts: 3 }.kind(),
            ErrorKind::RetryBudgetExhausted
        );
        assert_eq!(TrioError::config("x").kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_user_message_hides_transport_detail() {
        let err = TrioError::unavailable("POST https://host/v1 failed: 503 upstream");
        assert!(!err.user_message().contains("https://host"));
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::EmptyCompletion).unwrap();
        assert_eq!(json, "\"empty_completion\"");
    }
}
