//! Text-to-speech
//!
//! Asks Gemini's TTS model for audio and stores the returned PCM as WAV.

use super::wav::{write_pcm_wav, PcmFormat};
use crate::config::TrioConfig;
use crate::llm::{http_client, post_json, LlmError};
use crate::{Result, TrioError};
use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Turns text into a spoken audio file
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Speak `text` in the given personality and write it to `output_path`.
    /// Returns the path written.
    async fn synthesize(&self, personality: &str, text: &str, output_path: &Path)
        -> Result<PathBuf>;
}

/// Gemini-backed synthesizer
pub struct GeminiSynthesizer {
    api_key: Option<String>,
    base_url: String,
    model: String,
    voice: String,
    format: PcmFormat,
    client: reqwest::Client,
}

impl GeminiSynthesizer {
    pub fn new(api_key: Option<String>, model: &str, voice: &str, timeout_secs: u64) -> Self {
        Self {
            api_key,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: model.to_string(),
            voice: voice.to_string(),
            format: PcmFormat::default(),
            client: http_client(timeout_secs),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_format(mut self, format: PcmFormat) -> Self {
        self.format = format;
        self
    }

    pub fn from_config(config: &TrioConfig) -> Self {
        let synthesizer = Self::new(
            config.speech_api_key().map(str::to_string),
            &config.speech.synthesis_model,
            &config.speech.voice,
            config.llm.timeout,
        )
        .with_format(PcmFormat::mono(config.speech.sample_rate));
        match config.get_provider("gemini").and_then(|p| p.base_url.as_deref()) {
            Some(url) => synthesizer.with_base_url(url),
            None => synthesizer,
        }
    }
}

/// Prompt that carries the personality into the spoken delivery
pub fn speech_prompt(personality: &str, text: &str) -> String {
    format!("Say with this personality '{}': {}", personality, text)
}

fn build_speech_body(prompt: &str, voice: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice }
                }
            }
        }
    })
}

/// Decode the PCM carried in the first candidate's inline data
fn extract_audio(json: &Value) -> Result<Vec<u8>> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(LlmError::Api {
            status: error.get("code").and_then(|c| c.as_u64()).unwrap_or(500) as u16,
            message: message.to_string(),
        }
        .into());
    }

    let data = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .and_then(|parts| {
            parts.iter().find_map(|p| {
                p.get("inlineData")
                    .or_else(|| p.get("inline_data"))
                    .and_then(|d| d.get("data"))
                    .and_then(|d| d.as_str())
            })
        })
        .ok_or_else(|| TrioError::empty_completion("The speech model returned no audio"))?;

    let pcm = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| TrioError::empty_completion(format!("Undecodable audio payload: {}", e)))?;
    if pcm.is_empty() {
        return Err(TrioError::empty_completion("The speech model returned no audio"));
    }
    Ok(pcm)
}

#[async_trait]
impl Synthesizer for GeminiSynthesizer {
    async fn synthesize(
        &self,
        personality: &str,
        text: &str,
        output_path: &Path,
    ) -> Result<PathBuf> {
        if text.trim().is_empty() {
            return Err(TrioError::invalid_input("No input text provided"));
        }
        if output_path.as_os_str().is_empty() {
            return Err(TrioError::invalid_input("Output file path is empty"));
        }
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| TrioError::config("Gemini API key is not configured"))?;

        let body = build_speech_body(&speech_prompt(personality, text), &self.voice);
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        tracing::debug!(voice = %self.voice, personality, "Synthesizing speech");

        let json = post_json(self.client.post(&url), &body).await?;
        let pcm = extract_audio(&json)?;

        let path = output_path.to_path_buf();
        let format = self.format;
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_pcm_wav(&target, &pcm, format))
            .await
            .map_err(|e| TrioError::Io(std::io::Error::other(e)))??;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prompt_carries_personality() {
        assert_eq!(
            speech_prompt("cheerful", "Hello!"),
            "Say with this personality 'cheerful': Hello!"
        );
    }

    #[test]
    fn test_body_requests_audio_with_voice() {
        let body = build_speech_body("hi", "Kore");
        assert_eq!(body["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Kore"
        );
    }

    #[test]
    fn test_extract_audio_decodes_inline_data() {
        let json = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "inlineData": { "mimeType": "audio/L16", "data": "AAEAAg==" } }]
                }
            }]
        });
        assert_eq!(extract_audio(&json).unwrap(), vec![0, 1, 0, 2]);
    }

    #[test]
    fn test_extract_audio_without_data() {
        let json = json!({ "candidates": [{ "content": { "parts": [{ "text": "sorry" }] } }] });
        assert_eq!(
            extract_audio(&json).unwrap_err().kind(),
            ErrorKind::EmptyCompletion
        );
    }

    #[test]
    fn test_extract_audio_api_error() {
        let json = json!({ "error": { "code": 503, "message": "overloaded" } });
        assert_eq!(
            extract_audio(&json).unwrap_err().kind(),
            ErrorKind::CollaboratorUnavailable
        );
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let tts = GeminiSynthesizer::new(Some("key".into()), "tts", "Kore", 5);
        let err = tts
            .synthesize("calm", "  ", Path::new("out.wav"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
