//! Smoke test for the rodio-backed output.
//!
//! Needs a real output device; on headless machines the device cannot be
//! opened and the test returns early.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use parley_voice::{AudioOutput, DecodedAudio, LocalAudioOutput};

fn open_or_skip() -> Option<LocalAudioOutput> {
    match LocalAudioOutput::open() {
        Ok(output) => Some(output),
        Err(e) => {
            eprintln!("skipping: no audio output device ({e})");
            None
        }
    }
}

/// 50 ms of mono silence at 24 kHz.
fn silence() -> Arc<DecodedAudio> {
    Arc::new(DecodedAudio::new(vec![0.0; 1200], 24_000, 1))
}

#[test]
fn short_clip_plays_to_the_end() {
    let Some(output) = open_or_skip() else {
        return;
    };
    assert!(!output.is_playing());

    let (done_tx, done_rx) = mpsc::channel();
    output
        .play(silence(), Box::new(move || done_tx.send(()).unwrap()))
        .unwrap();

    done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("completion callback should fire after the clip ends");
    assert!(!output.is_playing());
}

#[test]
fn stop_releases_the_source_without_completion() {
    let Some(output) = open_or_skip() else {
        return;
    };

    let long = Arc::new(DecodedAudio::new(vec![0.0; 24_000 * 5], 24_000, 1));
    let (done_tx, done_rx) = mpsc::channel::<()>();
    output
        .play(long, Box::new(move || done_tx.send(()).unwrap()))
        .unwrap();
    assert!(output.is_playing());

    output.stop();
    assert!(!output.is_playing());
    assert!(done_rx.recv_timeout(Duration::from_millis(300)).is_err());
}
