//! Session and SDLC routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use trio_core::{ArtifactKey, Session, SessionKey, TrioError};

use super::{error_response, ok_json};
use crate::state::AppState;

type SessionPath = Path<(String, String, String)>;

fn lookup(
    state: &AppState,
    (app, user, session): &(String, String, String),
) -> trio_core::Result<Arc<Session>> {
    let key = SessionKey::new(app, user, session)?;
    state.sessions.require_session(&key)
}

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    app_name: String,
    user_id: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// Create (or reuse) a session; a missing session id is generated
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let key = match req.session_id.as_deref() {
        Some(id) => SessionKey::new(&req.app_name, &req.user_id, id),
        None => SessionKey::generate(&req.app_name, &req.user_id),
    };

    match key {
        Ok(key) => {
            let session = state.sessions.create_session(key);
            (
                StatusCode::CREATED,
                Json(serde_json::json!({ "session": session.key() })),
            )
        }
        Err(e) => error_response(e),
    }
}

/// List live sessions
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "sessions": state.sessions.list() }))
}

#[derive(Deserialize)]
pub struct SdlcRequest {
    request: String,
}

/// Plan, then run the produce/validate/fix cycle
pub async fn run_sdlc(
    State(state): State<AppState>,
    Path(ids): SessionPath,
    Json(req): Json<SdlcRequest>,
) -> impl IntoResponse {
    let session = match lookup(&state, &ids) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    match state
        .orchestration
        .run_sdlc(session.context(), &req.request)
        .await
    {
        Ok(report) => ok_json(report),
        Err(e) => error_response(e),
    }
}

/// One more tester pass over the stored code
pub async fn retest(State(state): State<AppState>, Path(ids): SessionPath) -> impl IntoResponse {
    let session = match lookup(&state, &ids) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    match state.orchestration.retest(session.context()).await {
        Ok(report) => ok_json(report),
        Err(e) => error_response(e),
    }
}

/// One more fixer pass over the stored code and findings
pub async fn fix_again(State(state): State<AppState>, Path(ids): SessionPath) -> impl IntoResponse {
    let session = match lookup(&state, &ids) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    match state.orchestration.fix_again(session.context()).await {
        Ok(code) => (StatusCode::OK, Json(serde_json::json!({ "code": code }))),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
pub struct ListenRequest {
    audio_file_path: String,
}

/// Transcribe spoken input and discuss it
pub async fn listen(
    State(state): State<AppState>,
    Path(ids): SessionPath,
    Json(req): Json<ListenRequest>,
) -> impl IntoResponse {
    let session = match lookup(&state, &ids) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    let result = state
        .orchestration
        .discuss_audio(
            session.context(),
            state.transcriber.as_ref(),
            std::path::Path::new(&req.audio_file_path),
        )
        .await;

    match result {
        Ok(discussion) => ok_json(discussion),
        Err(e) => error_response(e),
    }
}

/// Read one artifact from a session
pub async fn get_artifact(
    State(state): State<AppState>,
    Path((app, user, session, key)): Path<(String, String, String, String)>,
) -> impl IntoResponse {
    let key: ArtifactKey = match key.parse() {
        Ok(key) => key,
        Err(e) => return error_response(TrioError::invalid_input(e)),
    };
    let session = match lookup(&state, &(app, user, session)) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    match session.context().get(key) {
        Some(value) => (
            StatusCode::OK,
            Json(serde_json::json!({ "key": key, "value": value })),
        ),
        None => error_response(TrioError::not_found(key.missing_guidance())),
    }
}
