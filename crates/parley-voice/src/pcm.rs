//! Raw PCM decoding.
//!
//! The synthesizer returns headerless 16-bit little-endian PCM. Decoding
//! normalizes each sample to `[-1.0, 1.0)` by dividing by 32768 and keeps
//! channels interleaved, which is what the output backend consumes.

use std::sync::Arc;
use std::time::Duration;

use crate::error::VoiceError;

/// A decoded, playable audio buffer.
///
/// Samples are shared (`Arc<[f32]>`) so cache hits never copy audio.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    samples: Arc<[f32]>,
    sample_rate: u32,
    channels: u16,
}

impl DecodedAudio {
    /// Wrap already-decoded interleaved samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
            channels,
        }
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Playback duration.
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }
}

/// Decode 16-bit little-endian PCM into a [`DecodedAudio`].
///
/// Empty payloads and payloads that do not split into whole frames are
/// rejected.
pub fn decode_pcm16(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<DecodedAudio, VoiceError> {
    if sample_rate == 0 || channels == 0 {
        return Err(VoiceError::InvalidFormat(format!(
            "sample_rate={sample_rate}, channels={channels}"
        )));
    }
    if bytes.is_empty() {
        return Err(VoiceError::EmptyAudio);
    }
    let frame_bytes = 2 * usize::from(channels);
    if bytes.len() % frame_bytes != 0 {
        return Err(VoiceError::MisalignedPcm {
            len: bytes.len(),
            channels,
        });
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect();

    Ok(DecodedAudio::new(samples, sample_rate, channels))
}
