//! Dedicated audio output thread, isolating `!Send` rodio resources from the
//! async runtime.
//!
//! [`AudioThreadHandle`] is the `Send + Sync` proxy; every call becomes an
//! [`AudioCommand`] handled by the thread that owns [`AudioPlayback`].

use std::sync::{Arc, mpsc};
use std::thread;

use crate::audio_io::PlaybackDoneCallback;
use crate::error::VoiceError;
use crate::pcm::DecodedAudio;
use crate::playback::AudioPlayback;

// ── Commands ───────────────────────────────────────────────────────

enum AudioCommand {
    /// Replace the current source.
    Play {
        audio: Arc<DecodedAudio>,
        on_done: PlaybackDoneCallback,
        reply: mpsc::Sender<Result<(), VoiceError>>,
    },

    /// Stop the current source; replies once it is released.
    Stop { reply: mpsc::Sender<()> },

    IsPlaying { reply: mpsc::Sender<bool> },

    /// Shut down the audio thread, releasing the device.
    Shutdown,
}

// ── Handle (Send + Sync proxy) ─────────────────────────────────────

/// `Send + Sync` handle to the dedicated audio thread.
///
/// Request-reply methods block the caller until the thread responds, which is
/// microseconds of local channel I/O plus the rodio call itself.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the audio thread and open the default output device on it.
    ///
    /// Device errors are propagated back through a one-shot init channel.
    pub fn spawn() -> Result<Self, VoiceError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), VoiceError>>();

        let thread = thread::Builder::new()
            .name("parley-audio".into())
            .spawn(move || Self::run(&cmd_rx, &init_tx))
            .map_err(|e| {
                VoiceError::OutputStreamError(format!("failed to spawn audio thread: {e}"))
            })?;

        init_rx.recv().map_err(|_| VoiceError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    pub fn play(
        &self,
        audio: Arc<DecodedAudio>,
        on_done: PlaybackDoneCallback,
    ) -> Result<(), VoiceError> {
        let (reply, rx) = mpsc::channel();
        self.cmd_tx
            .send(AudioCommand::Play {
                audio,
                on_done,
                reply,
            })
            .map_err(|_| VoiceError::AudioThreadDied)?;
        rx.recv().map_err(|_| VoiceError::AudioThreadDied)?
    }

    /// Stop playback. A dead thread has nothing playing, so errors are ignored.
    pub fn stop(&self) {
        let _ = self.query(|reply| AudioCommand::Stop { reply });
    }

    pub fn is_playing(&self) -> bool {
        self.query(|reply| AudioCommand::IsPlaying { reply })
            .unwrap_or(false)
    }

    /// Send a query and block for its bare reply. `None` if the thread is dead.
    fn query<T>(&self, build: impl FnOnce(mpsc::Sender<T>) -> AudioCommand) -> Option<T> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx.send(build(tx)).ok()?;
        rx.recv().ok()
    }

    // ── Audio thread event loop ────────────────────────────────────

    fn run(cmd_rx: &mpsc::Receiver<AudioCommand>, init_tx: &mpsc::Sender<Result<(), VoiceError>>) {
        let mut playback = match AudioPlayback::new() {
            Ok(p) => p,
            Err(e) => {
                let _ = init_tx.send(Err(e));
                return;
            }
        };
        if init_tx.send(Ok(())).is_err() {
            return;
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::Play {
                    audio,
                    on_done,
                    reply,
                } => {
                    let _ = reply.send(playback.play(&audio, on_done));
                }
                AudioCommand::Stop { reply } => {
                    playback.stop();
                    let _ = reply.send(());
                }
                AudioCommand::IsPlaying { reply } => {
                    let _ = reply.send(playback.is_playing());
                }
                AudioCommand::Shutdown => break,
            }
        }

        // `playback` is dropped here, on the audio thread.
        tracing::debug!(target: "parley.playback", "Audio thread shutting down");
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        // Best-effort shutdown; the thread may already be dead.
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
