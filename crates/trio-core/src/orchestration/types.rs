//! Orchestration result types

use crate::{ErrorKind, TrioError};
use serde::{Deserialize, Serialize};

/// Error recorded against a single role invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&TrioError> for ErrorDetail {
    fn from(err: &TrioError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

/// Outcome of dispatching input to one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    /// Role name
    pub role: String,
    /// Whether the role produced text
    pub success: bool,
    /// Raw text output, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Error detail, present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl InvocationResult {
    pub fn from_result(role: &str, result: crate::Result<String>) -> Self {
        match result {
            Ok(output) => Self {
                role: role.to_string(),
                success: true,
                output: Some(output),
                error: None,
            },
            Err(err) => Self {
                role: role.to_string(),
                success: false,
                output: None,
                error: Some(ErrorDetail::from(&err)),
            },
        }
    }
}

/// Responses of every role in declared order, under the `"responses"` key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResponse {
    pub responses: Vec<InvocationResult>,
}

impl AggregateResponse {
    /// Result for a role by name
    pub fn get(&self, role: &str) -> Option<&InvocationResult> {
        self.responses.iter().find(|r| r.role == role)
    }

    /// Role names in response order
    pub fn roles(&self) -> Vec<&str> {
        self.responses.iter().map(|r| r.role.as_str()).collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.responses.iter().all(|r| r.success)
    }
}

/// Terminal outcome of a retry cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleOutcome {
    Succeeded,
    Exhausted,
}

/// What the caller learns from a finished cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Validation passes performed
    pub iterations: u32,
    /// Role invocations made by the cycle
    pub invocations: u32,
    /// Summary for the end user
    pub message: String,
    /// Latest code artifact
    pub code: String,
    /// Validator and fixer failures absorbed by the cycle
    #[serde(default)]
    pub role_errors: u32,
    /// Most recent of those failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ErrorDetail>,
}

impl CycleReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == CycleOutcome::Succeeded
    }

    /// `Exhausted` becomes `RetryBudgetExhausted`
    pub fn into_result(self) -> crate::Result<CycleReport> {
        match self.outcome {
            CycleOutcome::Succeeded => Ok(self),
            CycleOutcome::Exhausted => Err(TrioError::RetryBudgetExhausted {
                attempts: self.iterations,
            }),
        }
    }
}

/// Result of a single tester pass outside the cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetestReport {
    pub passed: bool,
    pub verdict: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_envelope_shape() {
        let aggregate = AggregateResponse {
            responses: vec![
                InvocationResult::from_result("fun", Ok("ha".to_string())),
                InvocationResult::from_result(
                    "rational",
                    Err(TrioError::unavailable("connect refused")),
                ),
            ],
        };

        let json = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "responses": [
                    { "role": "fun", "success": true, "output": "ha" },
                    {
                        "role": "rational",
                        "success": false,
                        "error": {
                            "kind": "collaborator_unavailable",
                            "message": "The model service is unavailable right now. Please try again."
                        }
                    }
                ]
            })
        );
    }

    #[test]
    fn test_exhausted_report_into_error() {
        let report = CycleReport {
            outcome: CycleOutcome::Exhausted,
            iterations: 3,
            invocations: 6,
            message: "summary".to_string(),
            code: "{}".to_string(),
            role_errors: 0,
            last_error: None,
        };
        assert!(matches!(
            report.into_result(),
            Err(TrioError::RetryBudgetExhausted { attempts: 3 })
        ));
    }
}
