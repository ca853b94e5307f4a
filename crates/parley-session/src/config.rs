//! Session configuration.

use std::time::Duration;

use parley_core::{LearnerProfile, PracticeSettings};

/// Per-session configuration derived from [`PracticeSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Languages and level sent with every dialogue request.
    pub learner: LearnerProfile,

    /// Pause between the last task completing and `Completed`.
    pub completion_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(&PracticeSettings::default())
    }
}

impl SessionConfig {
    pub fn from_settings(settings: &PracticeSettings) -> Self {
        Self {
            learner: settings.learner(),
            completion_delay: Duration::from_millis(settings.completion_delay_ms),
        }
    }
}
