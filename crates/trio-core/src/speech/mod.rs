//! Speech collaborators
//!
//! Transcription of spoken input and synthesis of spoken replies, both
//! backed by Gemini.

mod stt;
mod tts;
pub mod wav;

pub use stt::{mime_type_for, GeminiTranscriber, Transcriber};
pub use tts::{speech_prompt, GeminiSynthesizer, Synthesizer};
pub use wav::{write_pcm_wav, PcmFormat};
