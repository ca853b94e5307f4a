//! Local speaker adapter for the [`AudioOutput`] trait.

use std::sync::Arc;

use crate::audio_io::{AudioOutput, PlaybackDoneCallback};
use crate::audio_thread::AudioThreadHandle;
use crate::error::VoiceError;
use crate::pcm::DecodedAudio;

/// Plays speech on the default output device via rodio.
///
/// Thin wrapper over [`AudioThreadHandle`]; every method takes `&self` and
/// state transitions happen on the audio thread.
pub struct LocalAudioOutput {
    handle: AudioThreadHandle,
}

impl LocalAudioOutput {
    /// Spawn the audio thread and open the default device.
    ///
    /// # Errors
    ///
    /// Returns [`VoiceError`] if no output device can be opened.
    pub fn open() -> Result<Self, VoiceError> {
        Ok(Self {
            handle: AudioThreadHandle::spawn()?,
        })
    }
}

impl AudioOutput for LocalAudioOutput {
    fn play(
        &self,
        audio: Arc<DecodedAudio>,
        on_done: PlaybackDoneCallback,
    ) -> Result<(), VoiceError> {
        self.handle.play(audio, on_done)
    }

    fn stop(&self) {
        self.handle.stop();
    }

    fn is_playing(&self) -> bool {
        self.handle.is_playing()
    }
}
