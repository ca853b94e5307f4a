//! Speech synthesis scheduling.
//!
//! [`AudioRequestScheduler`] sits between the practice screen and a
//! rate-limited [`SpeechSynthesizer`]. It has two entry points:
//!
//! - [`preload`](AudioRequestScheduler::preload) appends texts to a FIFO that a
//!   single background worker drains one request at a time, sleeping
//!   `request_spacing` between requests;
//! - [`fetch_and_cache`](AudioRequestScheduler::fetch_and_cache) is the direct
//!   path used by playback, which bypasses the queue.
//!
//! Both paths go through the same single-flight map: concurrent requests for
//! one uncached text share a single synthesis call, and a cached text is never
//! sent again. Rate-limited calls are retried per [`RetryPolicy`]; every other
//! failure resolves to `None`. Nothing here returns an error to callers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parley_core::{Delay, SpeechPrefetch, SpeechSynthesizer, SynthesisError, VoiceSettings};
use tokio::sync::watch;

use crate::cache::AudioCache;
use crate::pcm::{DecodedAudio, decode_pcm16};
use crate::queue::PreloadQueue;
use crate::retry::RetryPolicy;

type SharedFetch = Shared<BoxFuture<'static, Option<Arc<DecodedAudio>>>>;

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Pause after each queued request.
    pub request_spacing: Duration,
    pub retry: RetryPolicy,
    /// Format of the raw PCM the synthesizer returns.
    pub sample_rate: u32,
    pub channels: u16,
    /// Per-attempt timeout; `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from_settings(&VoiceSettings::default())
    }
}

impl SchedulerConfig {
    pub const fn from_settings(voice: &VoiceSettings) -> Self {
        Self {
            request_spacing: Duration::from_millis(voice.request_spacing_ms),
            retry: RetryPolicy::from_settings(voice),
            sample_rate: voice.sample_rate,
            channels: voice.channels,
            fetch_timeout: match voice.fetch_timeout_ms {
                Some(ms) => Some(Duration::from_millis(ms)),
                None => None,
            },
        }
    }
}

#[derive(Debug, Default)]
struct WorkerState {
    pending: PreloadQueue,
    running: bool,
}

struct Inner {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    delay: Arc<dyn Delay>,
    cache: AudioCache,
    config: SchedulerConfig,
    worker: Mutex<WorkerState>,
    in_flight: Mutex<HashMap<String, SharedFetch>>,
    idle: watch::Sender<bool>,
    torn_down: AtomicBool,
}

/// Serializes, throttles and deduplicates speech synthesis for one practice
/// screen.
///
/// Cheap to clone; clones share the queue, cache and worker.
#[derive(Clone)]
pub struct AudioRequestScheduler {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AudioRequestScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioRequestScheduler")
            .field("config", &self.inner.config)
            .field("cached", &self.inner.cache.len())
            .field("pending", &self.pending_len())
            .finish_non_exhaustive()
    }
}

impl AudioRequestScheduler {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        delay: Arc<dyn Delay>,
        cache: AudioCache,
        config: SchedulerConfig,
    ) -> Self {
        let (idle, _) = watch::channel(true);
        Self {
            inner: Arc::new(Inner {
                synthesizer,
                delay,
                cache,
                config,
                worker: Mutex::new(WorkerState::default()),
                in_flight: Mutex::new(HashMap::new()),
                idle,
                torn_down: AtomicBool::new(false),
            }),
        }
    }

    /// The cache this scheduler fills.
    pub fn cache(&self) -> &AudioCache {
        &self.inner.cache
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Queue `texts` for background synthesis.
    ///
    /// Blank, cached, in-flight and already-queued texts are skipped. Starts
    /// the worker if it is not running; otherwise only enqueues. Must be
    /// called from within a Tokio runtime. Returns how many texts were added.
    pub fn preload<S: AsRef<str>>(&self, texts: &[S]) -> usize {
        if self.is_torn_down() {
            return 0;
        }

        let mut added = 0;
        let spawn_worker = {
            let mut worker = self.lock_worker();
            for text in texts.iter().map(AsRef::as_ref) {
                if text.trim().is_empty()
                    || self.inner.cache.contains(text)
                    || self.is_in_flight(text)
                {
                    continue;
                }
                if worker.pending.enqueue(text) {
                    added += 1;
                }
            }

            if worker.running || worker.pending.is_empty() {
                false
            } else {
                worker.running = true;
                self.inner.idle.send_replace(false);
                true
            }
        };

        tracing::debug!(
            target: "parley.voice",
            requested = texts.len(),
            added,
            "Preload requested"
        );

        if spawn_worker {
            let this = self.clone();
            tokio::spawn(async move { this.run_worker().await });
        }
        added
    }

    async fn run_worker(self) {
        tracing::debug!(target: "parley.voice", "Preload worker started");
        loop {
            let next = {
                let mut worker = self.lock_worker();
                match worker.pending.pop_front() {
                    Some(text) => text,
                    None => {
                        worker.running = false;
                        self.inner.idle.send_replace(true);
                        break;
                    }
                }
            };

            if self.inner.cache.contains(&next) {
                tracing::trace!(target: "parley.voice", text_len = next.len(), "Skipping cached item");
                continue;
            }

            self.fetch_and_cache(&next).await;
            self.inner.delay.sleep(self.inner.config.request_spacing).await;
        }
        tracing::debug!(target: "parley.voice", "Preload worker idle");
    }

    /// Return the audio for `text`, synthesizing it if necessary.
    ///
    /// `None` means the text is blank, the scheduler was torn down, or
    /// synthesis/decoding failed. The underlying fetch runs on its own task,
    /// so dropping the returned future does not cancel it.
    pub async fn fetch_and_cache(&self, text: &str) -> Option<Arc<DecodedAudio>> {
        if text.trim().is_empty() || self.is_torn_down() {
            return None;
        }
        if let Some(audio) = self.inner.cache.get(text) {
            return Some(audio);
        }

        let fetch = {
            let mut in_flight = self.lock_in_flight();
            // Re-check under the lock: a fetch may have stored and deregistered
            // between the first lookup and here.
            if let Some(audio) = self.inner.cache.get(text) {
                return Some(audio);
            }
            if let Some(existing) = in_flight.get(text) {
                tracing::trace!(target: "parley.voice", text_len = text.len(), "Joining in-flight fetch");
                existing.clone()
            } else {
                let fetch = self.spawn_fetch(text.to_string());
                in_flight.insert(text.to_string(), fetch.clone());
                fetch
            }
        };

        fetch.await
    }

    fn spawn_fetch(&self, text: String) -> SharedFetch {
        let this = self.clone();
        let fetch = async move {
            let audio = this.synthesize_and_decode(&text).await;
            if let Some(audio) = audio.as_ref() {
                if this.is_torn_down() {
                    tracing::debug!(target: "parley.voice", text_len = text.len(), "Discarding audio fetched after teardown");
                } else {
                    this.inner.cache.put(text.clone(), Arc::clone(audio));
                }
            }
            this.lock_in_flight().remove(&text);
            audio
        }
        .boxed()
        .shared();

        tokio::spawn(fetch.clone());
        fetch
    }

    async fn synthesize_and_decode(&self, text: &str) -> Option<Arc<DecodedAudio>> {
        let bytes = self.synthesize_with_retry(text).await?;
        let config = &self.inner.config;
        match decode_pcm16(&bytes, config.sample_rate, config.channels) {
            Ok(audio) => Some(Arc::new(audio)),
            Err(e) => {
                tracing::warn!(target: "parley.voice", text_len = text.len(), error = %e, "Failed to decode synthesized audio");
                None
            }
        }
    }

    async fn synthesize_with_retry(&self, text: &str) -> Option<Vec<u8>> {
        let policy = self.inner.config.retry;
        let mut retry = 0;

        loop {
            let attempt = retry + 1;
            match self.synthesize_once(text).await {
                Ok(Some(bytes)) => return Some(bytes),
                Ok(None) => {
                    tracing::warn!(target: "parley.voice", text_len = text.len(), attempt, "Synthesizer returned no audio");
                    return None;
                }
                Err(e) if e.is_rate_limited() => {
                    retry += 1;
                    let Some(wait) = policy.delay_for_retry(retry) else {
                        tracing::warn!(
                            target: "parley.voice",
                            text_len = text.len(),
                            attempts = attempt,
                            "Rate limit retries exhausted"
                        );
                        return None;
                    };
                    if self.is_torn_down() {
                        return None;
                    }
                    tracing::warn!(
                        target: "parley.voice",
                        text_len = text.len(),
                        attempt,
                        delay_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        "Rate limited; backing off"
                    );
                    self.inner.delay.sleep(wait).await;
                }
                Err(e) => {
                    tracing::error!(target: "parley.voice", text_len = text.len(), attempt, error = %e, "Speech synthesis failed");
                    return None;
                }
            }
        }
    }

    async fn synthesize_once(&self, text: &str) -> Result<Option<Vec<u8>>, SynthesisError> {
        let request = self.inner.synthesizer.synthesize(text);
        match self.inner.config.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| {
                SynthesisError::Failed(anyhow::anyhow!(
                    "synthesis timed out after {}ms",
                    limit.as_millis()
                ))
            })?,
            None => request.await,
        }
    }

    /// Resolve once the preload worker has drained the queue.
    pub async fn wait_idle(&self) {
        let mut idle = self.inner.idle.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = idle.wait_for(|idle| *idle).await;
    }

    /// Tear down for screen exit: drop queued work and cached audio, and stop
    /// fetches still running from storing their results.
    pub fn teardown(&self) {
        self.inner.torn_down.store(true, Ordering::SeqCst);
        let dropped = {
            let mut worker = self.lock_worker();
            let dropped = worker.pending.len();
            worker.pending.clear();
            dropped
        };
        self.inner.cache.clear();
        tracing::debug!(target: "parley.voice", dropped, "Scheduler torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::SeqCst)
    }

    /// Texts still waiting in the preload queue.
    pub fn pending_len(&self) -> usize {
        self.lock_worker().pending.len()
    }

    pub fn is_in_flight(&self, text: &str) -> bool {
        self.lock_in_flight().contains_key(text)
    }

    fn lock_worker(&self) -> std::sync::MutexGuard<'_, WorkerState> {
        self.inner
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashMap<String, SharedFetch>> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SpeechPrefetch for AudioRequestScheduler {
    fn preload(&self, texts: &[String]) -> usize {
        Self::preload(self, texts)
    }
}
