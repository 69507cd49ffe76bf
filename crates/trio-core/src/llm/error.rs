//! LLM error types

use std::fmt;

/// Error type for LLM operations
#[derive(Debug, Clone)]
pub enum LlmError {
    /// Network/connection error
    Connection(String),

    /// API error (authentication, server error, etc.)
    Api { status: u16, message: String },

    /// Provider not registered, disabled or missing credentials
    ProviderUnavailable(String),

    /// Request timeout
    Timeout,

    /// Invalid request (bad parameters)
    InvalidRequest(String),

    /// Rate limited
    RateLimited { retry_after: Option<u64> },

    /// The provider answered without any text content
    EmptyResponse,

    /// Internal error
    Internal(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Connection(msg) => write!(f, "Connection error: {}", msg),
            LlmError::Api { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            LlmError::ProviderUnavailable(provider) => {
                write!(f, "Provider unavailable: {}", provider)
            }
            LlmError::Timeout => write!(f, "Request timed out"),
            LlmError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            LlmError::RateLimited { retry_after } => {
                if let Some(seconds) = retry_after {
                    write!(f, "Rate limited, retry after {} seconds", seconds)
                } else {
                    write!(f, "Rate limited")
                }
            }
            LlmError::EmptyResponse => write!(f, "Response contained no text"),
            LlmError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    /// Classify a non-success HTTP status
    pub(crate) fn from_status(status: u16, retry_after: Option<u64>, message: String) -> Self {
        match status {
            429 => LlmError::RateLimited { retry_after },
            401 | 403 => LlmError::Api {
                status,
                message: "Authentication failed".to_string(),
            },
            _ => LlmError::Api { status, message },
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::Internal(format!("Malformed response: {}", err))
        } else {
            LlmError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Internal(format!("JSON error: {}", err))
    }
}

impl From<LlmError> for crate::TrioError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyResponse => crate::TrioError::EmptyCompletion(err.to_string()),
            LlmError::InvalidRequest(msg) => crate::TrioError::InvalidInput(msg),
            LlmError::Internal(msg) => crate::TrioError::CollaboratorUnavailable(msg),
            other => crate::TrioError::CollaboratorUnavailable(other.to_string()),
        }
    }
}
