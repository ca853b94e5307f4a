//! `AudioOutput` trait abstraction for speech playback.
//!
//! The [`PlaybackController`](crate::controller::PlaybackController) drives an
//! `AudioOutput` and never touches a device directly, so hosts can inject any
//! backend:
//!
//! | Implementor | Where used |
//! |---|---|
//! | `LocalAudioOutput` (feature `local-audio`) | Desktop / CLI, rodio on a dedicated audio thread |
//! | host-provided | Web views, mobile shells, test doubles |
//!
//! The trait is **object-safe** (`Arc<dyn AudioOutput>`). All methods take
//! `&self`; implementations use interior mutability.

use std::sync::Arc;

use crate::error::VoiceError;
use crate::pcm::DecodedAudio;

/// Callback invoked when playback finishes naturally (the buffer drained).
pub type PlaybackDoneCallback = Box<dyn FnOnce() + Send + 'static>;

/// Abstraction over an audio output device holding at most one source.
///
/// # Contract
/// - [`play`](AudioOutput::play) replaces whatever is playing.
/// - `on_done` fires at most once, only on natural completion, never from
///   inside `play` itself and never for a source that was stopped or
///   replaced.
pub trait AudioOutput: Send + Sync {
    /// Start playing `audio`.
    fn play(&self, audio: Arc<DecodedAudio>, on_done: PlaybackDoneCallback)
    -> Result<(), VoiceError>;

    /// Stop and release the active source, if any. Returns once released.
    fn stop(&self);

    /// Whether a source is currently producing sound.
    fn is_playing(&self) -> bool;
}
