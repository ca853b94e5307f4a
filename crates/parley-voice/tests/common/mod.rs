//! Common test doubles for parley-voice integration tests.
//!
//! Each test binary uses a different subset.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use parley_core::testing::RecordingDelay;
use parley_core::{SpeechSynthesizer, SynthesisError};
use parley_voice::{
    AudioCache, AudioOutput, AudioRequestScheduler, DecodedAudio, PlaybackDoneCallback,
    RetryPolicy, SchedulerConfig, VoiceError,
};
use tokio::sync::Semaphore;

// ── Synthesizer ────────────────────────────────────────────────────

/// One scripted synthesizer answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Audio,
    RateLimited,
    Fail,
    Empty,
}

/// Synthesizer that answers from a script, then with audio once the script
/// runs out. Optionally blocks every call until the test releases a permit.
pub struct ScriptedSynthesizer {
    script: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
}

impl ScriptedSynthesizer {
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_script(script: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Every call waits for a [`release`](Self::release) permit.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Option<Vec<u8>>, SynthesisError> {
        self.calls.lock().unwrap().push(text.to_string());
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        let reply = self.script.lock().unwrap().pop_front().unwrap_or(Reply::Audio);
        match reply {
            // 20 ms of silence at 24 kHz mono
            Reply::Audio => Ok(Some(vec![0u8; 960])),
            Reply::RateLimited => Err(SynthesisError::RateLimited),
            Reply::Fail => Err(SynthesisError::Failed(anyhow::anyhow!("backend exploded"))),
            Reply::Empty => Ok(None),
        }
    }
}

// ── Scheduler construction ─────────────────────────────────────────

pub fn test_config() -> SchedulerConfig {
    SchedulerConfig {
        request_spacing: Duration::from_millis(500),
        retry: RetryPolicy::new(3, Duration::from_secs(1)),
        sample_rate: 24_000,
        channels: 1,
        fetch_timeout: None,
    }
}

pub fn scheduler(synth: &Arc<ScriptedSynthesizer>, delay: &RecordingDelay) -> AudioRequestScheduler {
    AudioRequestScheduler::new(
        Arc::clone(synth) as Arc<dyn SpeechSynthesizer>,
        Arc::new(delay.clone()),
        AudioCache::new(),
        test_config(),
    )
}

/// Yield to the runtime until `condition` holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

// ── Audio output ───────────────────────────────────────────────────

#[derive(Default)]
struct OutputState {
    active: Option<(usize, Arc<DecodedAudio>)>,
    next_id: usize,
    plays: usize,
    stops: usize,
    callbacks: Vec<(usize, PlaybackDoneCallback)>,
    fail_next: bool,
}

/// Output that tracks the active source and keeps completion callbacks so
/// tests decide when audio "ends".
#[derive(Default)]
pub struct MockOutput {
    state: Mutex<OutputState>,
}

impl MockOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self) {
        self.state.lock().unwrap().fail_next = true;
    }

    pub fn active_audio(&self) -> Option<Arc<DecodedAudio>> {
        self.state.lock().unwrap().active.as_ref().map(|(_, a)| Arc::clone(a))
    }

    pub fn active_id(&self) -> Option<usize> {
        self.state.lock().unwrap().active.as_ref().map(|(id, _)| *id)
    }

    pub fn plays(&self) -> usize {
        self.state.lock().unwrap().plays
    }

    pub fn stops(&self) -> usize {
        self.state.lock().unwrap().stops
    }

    /// Fire the completion callback of source `id`, as a device would at the
    /// end of the buffer. The callback runs without the mock's lock held.
    pub fn finish(&self, id: usize) {
        let callback = {
            let mut state = self.state.lock().unwrap();
            if state.active.as_ref().is_some_and(|(active, _)| *active == id) {
                state.active = None;
            }
            let index = state.callbacks.iter().position(|(cb_id, _)| *cb_id == id);
            index.map(|i| state.callbacks.remove(i).1)
        };
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl AudioOutput for MockOutput {
    fn play(&self, audio: Arc<DecodedAudio>, on_done: PlaybackDoneCallback) -> Result<(), VoiceError> {
        let mut state = self.state.lock().unwrap();
        if std::mem::take(&mut state.fail_next) {
            return Err(VoiceError::OutputStreamError("device unplugged".to_string()));
        }
        assert!(state.active.is_none(), "play() while a source is active");
        let id = state.next_id;
        state.next_id += 1;
        state.plays += 1;
        state.active = Some((id, audio));
        state.callbacks.push((id, on_done));
        Ok(())
    }

    fn stop(&self) {
        let mut state = self.state.lock().unwrap();
        state.stops += 1;
        state.active = None;
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().active.is_some()
    }
}
