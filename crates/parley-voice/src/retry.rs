//! Rate-limit retry policy.

use std::time::Duration;

use parley_core::VoiceSettings;

/// Bounded linear backoff for rate-limited synthesis requests.
///
/// Retry `n` (1-based) waits `n * backoff_step`. With the defaults that is
/// 1s, 2s, 3s and then the request is abandoned, for at most
/// `1 + max_retries` attempts in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_step: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, backoff_step: Duration) -> Self {
        Self {
            max_retries,
            backoff_step,
        }
    }

    pub const fn from_settings(voice: &VoiceSettings) -> Self {
        Self {
            max_retries: voice.max_rate_limit_retries,
            backoff_step: Duration::from_millis(voice.retry_backoff_step_ms),
        }
    }

    /// Wait before retry number `retry` (1-based), or `None` once exhausted.
    pub fn delay_for_retry(&self, retry: u32) -> Option<Duration> {
        if retry == 0 || retry > self.max_retries {
            return None;
        }
        Some(self.backoff_step.saturating_mul(retry))
    }

    /// Upper bound on synthesis attempts for one text.
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_is_linear() {
        let policy = RetryPolicy::default();
        let schedule: Vec<_> = (1..=4).map(|n| policy.delay_for_retry(n)).collect();
        assert_eq!(
            schedule,
            vec![
                Some(Duration::from_secs(1)),
                Some(Duration::from_secs(2)),
                Some(Duration::from_secs(3)),
                None,
            ]
        );
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_millis(250));
        assert_eq!(policy.delay_for_retry(1), None);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn built_from_settings() {
        let voice = VoiceSettings {
            max_rate_limit_retries: 2,
            retry_backoff_step_ms: 250,
            ..VoiceSettings::default()
        };
        let policy = RetryPolicy::from_settings(&voice);
        assert_eq!(policy.delay_for_retry(2), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_for_retry(3), None);
    }
}
