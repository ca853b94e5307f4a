//! Injected sleep, used for request spacing, retry backoff and display delays.

use std::time::Duration;

use async_trait::async_trait;

/// Suspends the caller for a duration.
///
/// Production code uses [`TokioDelay`]; tests substitute a recording
/// implementation so timing policies can be asserted without waiting.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Delay`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
