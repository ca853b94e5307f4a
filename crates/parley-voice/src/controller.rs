//! Single-flight playback.
//!
//! [`PlaybackController`] guarantees at most one active source. Every
//! `play`/`stop` bumps a generation counter and stops the output before
//! anything else happens; a fetch that resolves, or an end-of-audio callback
//! that fires, for an older generation is ignored. An in-flight fetch of a
//! superseded text is not cancelled: it still lands in the cache.
//!
//! ```text
//!            play(x), cached
//!   Idle ───────────────────────────▶ Playing(x) ──┐ natural end / stop
//!    │ ▲                                  ▲        │
//!    │ │ fetch failed / stop              │ fetched│
//!    ▼ │                                  │        ▼
//!   Loading(x) ───────────────────────────┘      Idle
//! ```

use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::Serialize;
use tokio::sync::watch;

use crate::audio_io::AudioOutput;
use crate::pcm::DecodedAudio;
use crate::scheduler::AudioRequestScheduler;

/// Observable playback state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    /// Audio for the text is being fetched.
    Loading(String),
    Playing(String),
}

impl PlaybackState {
    /// The text being loaded or played, if any.
    pub fn active_text(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading(text) | Self::Playing(text) => Some(text),
        }
    }

    pub const fn is_playing(&self) -> bool {
        matches!(self, Self::Playing(_))
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }
}

/// How a `play`/`toggle` request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The text is now playing.
    Started,
    /// `toggle` stopped the text that was playing.
    Stopped,
    /// No audio could be obtained; state returned to `Idle`.
    Unavailable,
    /// A later `play` or `stop` took over while audio was loading.
    Superseded,
    /// The output device refused the source; state returned to `Idle`.
    Failed,
}

struct Inner {
    scheduler: AudioRequestScheduler,
    output: Arc<dyn AudioOutput>,
    /// Generation of the most recent play/stop request.
    generation: Mutex<u64>,
    state: watch::Sender<PlaybackState>,
}

impl Inner {
    fn lock_generation(&self) -> std::sync::MutexGuard<'_, u64> {
        self.generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Called from the output's completion watcher.
    fn finish(&self, generation: u64) {
        let current = self.lock_generation();
        if *current != generation {
            return;
        }
        let playing = self.state.borrow().is_playing();
        if playing {
            tracing::debug!(target: "parley.playback", generation, "Playing -> Idle (ended)");
            self.state.send_replace(PlaybackState::Idle);
        }
    }
}

/// Plays cached or freshly synthesized speech, one source at a time.
///
/// Cheap to clone; clones control the same output.
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl PlaybackController {
    pub fn new(scheduler: AudioRequestScheduler, output: Arc<dyn AudioOutput>) -> Self {
        let (state, _) = watch::channel(PlaybackState::Idle);
        Self {
            inner: Arc::new(Inner {
                scheduler,
                output,
                generation: Mutex::new(0),
                state,
            }),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> PlaybackState {
        self.inner.state.borrow().clone()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.inner.state.subscribe()
    }

    /// Play `text`, stopping whatever is active first.
    ///
    /// Cached audio starts immediately; otherwise the state is
    /// `Loading(text)` until the direct fetch resolves.
    pub async fn play(&self, text: &str) -> PlaybackOutcome {
        let (generation, cached) = {
            let mut current = self.inner.lock_generation();
            *current += 1;
            self.inner.output.stop();

            if text.trim().is_empty() {
                self.inner.state.send_replace(PlaybackState::Idle);
                return PlaybackOutcome::Unavailable;
            }

            let cached = self.inner.scheduler.cache().get(text);
            if cached.is_none() {
                tracing::debug!(target: "parley.playback", text_len = text.len(), "-> Loading");
                self.inner
                    .state
                    .send_replace(PlaybackState::Loading(text.to_string()));
            }
            (*current, cached)
        };

        let audio = match cached {
            Some(audio) => audio,
            None => match self.inner.scheduler.fetch_and_cache(text).await {
                Some(audio) => audio,
                None => return self.settle_unavailable(generation),
            },
        };

        self.start(generation, text, audio)
    }

    fn settle_unavailable(&self, generation: u64) -> PlaybackOutcome {
        let current = self.inner.lock_generation();
        if *current != generation {
            return PlaybackOutcome::Superseded;
        }
        tracing::debug!(target: "parley.playback", "Loading -> Idle (no audio)");
        self.inner.state.send_replace(PlaybackState::Idle);
        PlaybackOutcome::Unavailable
    }

    fn start(&self, generation: u64, text: &str, audio: Arc<DecodedAudio>) -> PlaybackOutcome {
        let current = self.inner.lock_generation();
        if *current != generation {
            tracing::debug!(target: "parley.playback", text_len = text.len(), "Fetched audio superseded");
            return PlaybackOutcome::Superseded;
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let on_done = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.finish(generation);
            }
        });

        match self.inner.output.play(audio, on_done) {
            Ok(()) => {
                tracing::debug!(target: "parley.playback", text_len = text.len(), "-> Playing");
                self.inner
                    .state
                    .send_replace(PlaybackState::Playing(text.to_string()));
                PlaybackOutcome::Started
            }
            Err(e) => {
                tracing::error!(target: "parley.playback", error = %e, "Audio output rejected source");
                self.inner.state.send_replace(PlaybackState::Idle);
                PlaybackOutcome::Failed
            }
        }
    }

    /// Stop playback (or abandon loading) and return to `Idle`.
    pub fn stop(&self) {
        let mut current = self.inner.lock_generation();
        *current += 1;
        self.inner.output.stop();
        if self.inner.state.send_replace(PlaybackState::Idle) != PlaybackState::Idle {
            tracing::debug!(target: "parley.playback", "-> Idle (stopped)");
        }
    }

    /// Stop if `text` is playing, otherwise play it.
    pub async fn toggle(&self, text: &str) -> PlaybackOutcome {
        let playing_this = matches!(self.state(), PlaybackState::Playing(ref active) if active == text);
        if playing_this {
            self.stop();
            return PlaybackOutcome::Stopped;
        }
        self.play(text).await
    }
}
