//! Speech tool routes
//!
//! Both endpoints answer with a bare JSON string: the transcript or output
//! path on success, an error message otherwise.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use std::path::Path;

use super::error_status;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SttRequest {
    audio_file_path: String,
}

#[derive(Deserialize)]
pub struct TtsRequest {
    personality: String,
    output_file_path: String,
    text: String,
}

fn failure(err: trio_core::TrioError) -> (StatusCode, Json<String>) {
    tracing::warn!(error = %err, "Speech request failed");
    (error_status(&err), Json(err.user_message()))
}

/// Transcribe an audio file
pub async fn speech_to_text(
    State(state): State<AppState>,
    Json(req): Json<SttRequest>,
) -> impl IntoResponse {
    match state
        .transcriber
        .transcribe(Path::new(&req.audio_file_path))
        .await
    {
        Ok(text) => (StatusCode::OK, Json(text)),
        Err(e) => failure(e),
    }
}

/// Speak text into a WAV file
pub async fn text_to_speech(
    State(state): State<AppState>,
    Json(req): Json<TtsRequest>,
) -> impl IntoResponse {
    match state
        .synthesizer
        .synthesize(&req.personality, &req.text, Path::new(&req.output_file_path))
        .await
    {
        Ok(path) => (StatusCode::OK, Json(path.display().to_string())),
        Err(e) => failure(e),
    }
}
