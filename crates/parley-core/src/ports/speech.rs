//! Speech synthesis ports.

use async_trait::async_trait;
use thiserror::Error;

/// Failure modes of a synthesis request.
///
/// Rate limiting is distinguished because it is retried with backoff; every
/// other failure is final for that request.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The backend rejected the request for exceeding its rate limit (HTTP 429).
    #[error("Speech synthesis rate limited")]
    RateLimited,

    /// Any other transport or backend failure.
    #[error("Speech synthesis failed: {0}")]
    Failed(#[source] anyhow::Error),
}

impl SynthesisError {
    /// Whether this error should be retried with backoff.
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Remote text-to-speech service.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into raw 16-bit little-endian PCM.
    ///
    /// `Ok(None)` means the backend answered but produced no audio.
    async fn synthesize(&self, text: &str) -> Result<Option<Vec<u8>>, SynthesisError>;
}

/// Background prefetch of speech for lines the learner is likely to play.
///
/// Implemented by the audio scheduler in `parley-voice`; the session layer
/// only sees this trait.
pub trait SpeechPrefetch: Send + Sync {
    /// Queue `texts` for synthesis. Returns how many were newly enqueued.
    fn preload(&self, texts: &[String]) -> usize;
}
