//! API route handlers

mod sessions;
mod speech;

pub use sessions::{
    create_session, fix_again, get_artifact, list_sessions, listen, retest, run_sdlc,
};
pub use speech::{speech_to_text, text_to_speech};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use trio_core::TrioError;

use crate::state::AppState;

/// HTTP status for an orchestration error
pub(crate) fn error_status(err: &TrioError) -> StatusCode {
    match err {
        TrioError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TrioError::NotFound(_) => StatusCode::NOT_FOUND,
        TrioError::CollaboratorUnavailable(_) | TrioError::EmptyCompletion(_) => {
            StatusCode::BAD_GATEWAY
        }
        TrioError::RetryBudgetExhausted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{error: {kind, message}}` response, logged with the full error
pub(crate) fn error_response(err: TrioError) -> (StatusCode, Json<serde_json::Value>) {
    let status = error_status(&err);
    if status.is_server_error() {
        tracing::warn!(error = %err, "Request failed");
    } else {
        tracing::debug!(error = %err, "Request rejected");
    }

    (
        status,
        Json(serde_json::json!({
            "error": {
                "kind": err.kind(),
                "message": err.user_message()
            }
        })),
    )
}

/// 200 with the serialised value
pub(crate) fn ok_json<T: serde::Serialize>(value: T) -> (StatusCode, Json<serde_json::Value>) {
    match serde_json::to_value(value) {
        Ok(json) => (StatusCode::OK, Json(json)),
        Err(e) => error_response(e.into()),
    }
}

// ========== Discussion Routes ==========

#[derive(Deserialize)]
pub struct DiscussRequest {
    input: String,
}

/// Fan the input out to every discussion role
pub async fn discuss(
    State(state): State<AppState>,
    Json(req): Json<DiscussRequest>,
) -> impl IntoResponse {
    match state.orchestration.discuss(&req.input).await {
        Ok(response) => ok_json(response),
        Err(e) => error_response(e),
    }
}
