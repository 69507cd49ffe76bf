//! WAV container for raw PCM from the synthesis model

use crate::{Result, TrioError};
use std::path::Path;

/// Layout of little-endian 16-bit PCM data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub channels: u16,
    pub sample_rate: u32,
}

impl PcmFormat {
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            channels: 1,
            sample_rate,
        }
    }

    fn spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::mono(24_000)
    }
}

fn wav_error(err: hound::Error) -> TrioError {
    match err {
        hound::Error::IoError(e) => TrioError::Io(e),
        other => TrioError::Serialization(format!("Failed to write WAV: {}", other)),
    }
}

/// Write 16-bit little-endian PCM bytes to `path` as a WAV file
pub fn write_pcm_wav(path: &Path, pcm: &[u8], format: PcmFormat) -> Result<()> {
    if pcm.len() % 2 != 0 {
        return Err(TrioError::invalid_input(format!(
            "PCM data has an odd byte count ({}) for 16-bit samples",
            pcm.len()
        )));
    }
    let samples = pcm.len() / 2;
    if format.channels == 0 || samples % format.channels as usize != 0 {
        return Err(TrioError::invalid_input(format!(
            "{} samples do not fill whole frames of {} channels",
            samples, format.channels
        )));
    }

    let mut writer = hound::WavWriter::create(path, format.spec()).map_err(wav_error)?;
    for chunk in pcm.chunks_exact(2) {
        writer
            .write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))
            .map_err(wav_error)?;
    }
    writer.finalize().map_err(wav_error)?;

    tracing::debug!(path = %path.display(), samples, "WAV written");
    Ok(())
}
