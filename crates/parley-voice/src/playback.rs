//! Audio playback via `rodio`.
//!
//! Owns the output stream and at most one [`Sink`]. Must live on the
//! dedicated audio thread: `rodio::OutputStream` is `!Send` on some
//! platforms.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::audio_io::PlaybackDoneCallback;
use crate::error::VoiceError;
use crate::pcm::DecodedAudio;

/// The sink for the current source plus its liveness flag.
///
/// The flag is per source, so a completion watcher for a replaced sink can
/// never clear the state of its successor.
struct ActiveSink {
    sink: Arc<Sink>,
    active: Arc<AtomicBool>,
}

/// Audio playback handle for synthesized speech.
pub struct AudioPlayback {
    /// rodio output stream (must be kept alive).
    _stream: OutputStream,

    /// Handle used to create sinks.
    stream_handle: OutputStreamHandle,

    current: Option<ActiveSink>,
}

impl AudioPlayback {
    /// Open the default output device.
    pub fn new() -> Result<Self, VoiceError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| VoiceError::OutputStreamError(e.to_string()))?;

        tracing::info!(target: "parley.playback", "Audio playback initialized on default output device");

        Ok(Self {
            _stream: stream,
            stream_handle,
            current: None,
        })
    }

    /// Replace the current source with `audio`.
    ///
    /// `on_done` runs on a watcher thread once the sink drains, unless the
    /// source is stopped first.
    pub fn play(
        &mut self,
        audio: &DecodedAudio,
        on_done: PlaybackDoneCallback,
    ) -> Result<(), VoiceError> {
        self.stop();

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| VoiceError::OutputStreamError(e.to_string()))?;
        sink.append(rodio::buffer::SamplesBuffer::new(
            audio.channels(),
            audio.sample_rate(),
            audio.samples().to_vec(),
        ));

        let sink = Arc::new(sink);
        let active = Arc::new(AtomicBool::new(true));
        Self::spawn_completion_watcher(Arc::clone(&sink), Arc::clone(&active), on_done)
            .inspect_err(|_| sink.stop())?;

        tracing::debug!(
            target: "parley.playback",
            sample_rate = audio.sample_rate(),
            duration_ms = u64::try_from(audio.duration().as_millis()).unwrap_or(u64::MAX),
            "Audio playback started"
        );
        self.current = Some(ActiveSink { sink, active });
        Ok(())
    }

    /// Block on a background thread until the sink drains or is stopped.
    /// Only a natural drain fires `on_done`.
    fn spawn_completion_watcher(
        sink: Arc<Sink>,
        active: Arc<AtomicBool>,
        on_done: PlaybackDoneCallback,
    ) -> Result<(), VoiceError> {
        std::thread::Builder::new()
            .name("parley-playback-watch".into())
            .spawn(move || {
                // `stop()` drops the queued sources, so this returns promptly.
                sink.sleep_until_end();

                if !active.swap(false, Ordering::SeqCst) {
                    return;
                }
                tracing::debug!(target: "parley.playback", "Playback finished naturally");
                on_done();
            })
            .map(|_| ())
            .map_err(|e| VoiceError::OutputStreamError(format!("failed to spawn watcher: {e}")))
    }

    /// Stop any active playback immediately.
    pub fn stop(&mut self) {
        if let Some(current) = self.current.take() {
            current.active.store(false, Ordering::SeqCst);
            current.sink.stop();
            tracing::debug!(target: "parley.playback", "Audio playback stopped");
        }
    }

    /// Check whether audio is currently playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|c| c.active.load(Ordering::SeqCst) && !c.sink.empty())
    }
}

impl Drop for AudioPlayback {
    fn drop(&mut self) {
        self.stop();
    }
}
