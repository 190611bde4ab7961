//! Text-to-speech.
//!
//! The service returns raw 16-bit little-endian PCM. Decoding happens here;
//! playback is the caller's concern.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::info;

use crate::client::{GenerationBackend, ModelSet};
use crate::error::GenAiError;
use crate::wire::{
    GenerateContentRequest, GenerationConfig, Part, PrebuiltVoiceConfig, SpeechConfig,
    VoiceConfig,
};

const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Mono PCM samples ready for playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl SpeechAudio {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// Wrap the samples in a RIFF/WAVE container.
    pub fn to_wav(&self) -> Vec<u8> {
        let data_len = (self.samples.len() * 2) as u32;
        let block_align = self.channels * 2;
        let byte_rate = self.sample_rate * block_align as u32;

        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for sample in &self.samples {
            out.extend_from_slice(&sample.to_le_bytes());
        }
        out
    }
}

/// Synthesize speech for `text`.
pub async fn generate_speech<B: GenerationBackend>(
    backend: &B,
    models: &ModelSet,
    text: &str,
) -> Result<SpeechAudio, GenAiError> {
    let request = GenerateContentRequest::single_turn(vec![Part::text(text)]).with_config(
        GenerationConfig {
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: models.voice.clone(),
                    },
                },
            }),
            ..Default::default()
        },
    );

    let response = backend.generate_content(&models.speech, request).await?;

    let blob = response
        .parts()
        .first()
        .and_then(|p| p.inline_data.as_ref())
        .filter(|b| !b.data.is_empty())
        .ok_or(GenAiError::NoAudio)?;

    let bytes = STANDARD
        .decode(blob.data.trim())
        .map_err(|e| GenAiError::ResponseParse(format!("invalid audio payload: {e}")))?;

    let audio = SpeechAudio {
        sample_rate: sample_rate_from_mime(&blob.mime_type).unwrap_or(DEFAULT_SAMPLE_RATE),
        channels: 1,
        samples: decode_pcm16(&bytes),
    };

    info!(
        samples = audio.samples.len(),
        sample_rate = audio.sample_rate,
        "speech generated"
    );

    Ok(audio)
}

/// Little-endian 16-bit samples. A trailing odd byte is dropped.
fn decode_pcm16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Parse `rate=` out of a mime type like `audio/L16;codec=pcm;rate=24000`.
fn sample_rate_from_mime(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
}
