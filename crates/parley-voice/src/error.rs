//! Speech audio error types.

/// Errors that can occur while decoding or playing speech audio.
///
/// None of these cross the session boundary: the scheduler and the playback
/// controller log them and degrade to "no audio".
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// Failed to open the audio output stream.
    #[error("Failed to open audio output stream: {0}")]
    OutputStreamError(String),

    /// The audio thread is gone (channel closed or thread panicked).
    #[error("Audio thread is no longer running")]
    AudioThreadDied,

    /// The synthesizer returned an empty payload.
    #[error("Synthesized audio is empty")]
    EmptyAudio,

    /// The payload does not divide into whole 16-bit frames.
    #[error("PCM payload of {len} bytes is not a whole number of {channels}-channel 16-bit frames")]
    MisalignedPcm { len: usize, channels: u16 },

    /// Decoding parameters are unusable.
    #[error("Invalid audio format: {0}")]
    InvalidFormat(String),
}
