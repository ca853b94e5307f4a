//! Speech audio for parley.
//!
//! - [`pcm`]: raw PCM16 decoding into playable buffers
//! - [`cache`]: write-once audio cache keyed by exact synthesis input
//! - [`queue`] / [`retry`]: the pure pieces the scheduler is built from
//! - [`scheduler`]: throttled, deduplicated, single-flight synthesis
//! - [`audio_io`]: the output port
//! - [`controller`]: single-source playback state machine
//!
//! With the `local-audio` feature, `LocalAudioOutput` plays through the
//! default output device using rodio on a dedicated audio thread.
#![deny(unused_crate_dependencies)]

pub mod audio_io;
pub mod cache;
pub mod controller;
pub mod error;
pub mod pcm;
pub mod queue;
pub mod retry;
pub mod scheduler;

#[cfg(feature = "local-audio")]
pub mod audio_local;
#[cfg(feature = "local-audio")]
pub mod audio_thread;
#[cfg(feature = "local-audio")]
pub mod playback;

// Re-export key types for convenience
pub use audio_io::{AudioOutput, PlaybackDoneCallback};
pub use cache::AudioCache;
pub use controller::{PlaybackController, PlaybackOutcome, PlaybackState};
pub use error::VoiceError;
pub use pcm::{DecodedAudio, decode_pcm16};
pub use queue::PreloadQueue;
pub use retry::RetryPolicy;
pub use scheduler::{AudioRequestScheduler, SchedulerConfig};

#[cfg(feature = "local-audio")]
pub use audio_local::LocalAudioOutput;

// Used only by the integration-test doubles
#[cfg(test)]
use async_trait as _;
