//! Speech-to-text
//!
//! Sends the audio inline to Gemini's `generateContent` together with strict
//! transcription instructions.

use crate::config::TrioConfig;
use crate::llm::{extract_gemini_text, http_client, post_json};
use crate::{Result, TrioError};
use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use std::path::Path;

const TRANSCRIPTION_PROMPT: &str = r#"
You are a speech-to-text transcription assistant.
Your only task is to convert spoken audio into written text as accurately as possible.
- Do not add or remove words.
- Do not summarize, interpret, or rephrase.
- Preserve the speaker's exact wording, including filler words (uh, um, ah) if clearly audible.
- Maintain punctuation only where it helps readability (.,!?).
- If you are unsure about a word, transcribe it as [inaudible] instead of guessing.
- Do not include any commentary, explanation, or extra text.
Only return the clean transcribed text.
"#;

/// Turns an audio file into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

/// Gemini-backed transcriber
pub struct GeminiTranscriber {
    api_key: Option<String>,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiTranscriber {
    pub fn new(api_key: Option<String>, model: &str, timeout_secs: u64) -> Self {
        Self {
            api_key,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: model.to_string(),
            client: http_client(timeout_secs),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn from_config(config: &TrioConfig) -> Self {
        let transcriber = Self::new(
            config.speech_api_key().map(str::to_string),
            &config.speech.transcription_model,
            config.llm.timeout,
        );
        match config.get_provider("gemini").and_then(|p| p.base_url.as_deref()) {
            Some(url) => transcriber.with_base_url(url),
            None => transcriber,
        }
    }
}

/// MIME type Gemini expects for an audio file, by extension
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp3") => "audio/mp3",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("aac") => "audio/aac",
        Some("aiff") | Some("aif") => "audio/aiff",
        _ => "audio/wav",
    }
}

fn build_transcription_body(mime_type: &str, data: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "text": TRANSCRIPTION_PROMPT },
                { "inline_data": { "mime_type": mime_type, "data": data } }
            ]
        }]
    })
}

/// Trim the model's answer; blank or the literal "None" means nothing was heard
fn clean_transcript(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "None" {
        return Err(TrioError::empty_completion(
            "No text could be extracted from the audio",
        ));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl Transcriber for GeminiTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        if audio_path.as_os_str().is_empty() {
            return Err(TrioError::invalid_input("Audio file path is empty"));
        }
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| TrioError::config("Gemini API key is not configured"))?;

        let audio = tokio::fs::read(audio_path).await.map_err(|e| {
            TrioError::invalid_input(format!(
                "Cannot read audio file {}: {}",
                audio_path.display(),
                e
            ))
        })?;
        let data = base64::engine::general_purpose::STANDARD.encode(&audio);
        let body = build_transcription_body(mime_type_for(audio_path), &data);

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        tracing::debug!(path = %audio_path.display(), bytes = audio.len(), "Transcribing audio");

        let json = post_json(self.client.post(&url), &body).await?;
        let text = extract_gemini_text(&json)?;

        clean_transcript(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mime_type_by_extension() {
        assert_eq!(mime_type_for(Path::new("a.MP3")), "audio/mp3");
        assert_eq!(mime_type_for(Path::new("a.flac")), "audio/flac");
        assert_eq!(mime_type_for(Path::new("a.wav")), "audio/wav");
        assert_eq!(mime_type_for(Path::new("noext")), "audio/wav");
    }

    #[test]
    fn test_body_inlines_audio() {
        let body = build_transcription_body("audio/wav", "AAEC");
        let parts = &body["contents"][0]["parts"];
        assert!(parts[0]["text"].as_str().unwrap().contains("transcription assistant"));
        assert_eq!(parts[1]["inline_data"]["data"], "AAEC");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "audio/wav");
    }

    #[test]
    fn test_none_answer_is_empty_completion() {
        assert_eq!(
            clean_transcript("None").unwrap_err().kind(),
            ErrorKind::EmptyCompletion
        );
        assert_eq!(
            clean_transcript("  \n").unwrap_err().kind(),
            ErrorKind::EmptyCompletion
        );
        assert_eq!(clean_transcript(" hello world \n").unwrap(), "hello world");
    }

    #[tokio::test]
    async fn test_empty_path_rejected() {
        let stt = GeminiTranscriber::new(Some("key".into()), "gemini-2.5-flash", 5);
        let err = stt.transcribe(Path::new("")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_missing_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let stt = GeminiTranscriber::new(Some("key".into()), "gemini-2.5-flash", 5);
        let err = stt
            .transcribe(&dir.path().join("missing.wav"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
