//! Practice settings domain types and validation.
//!
//! These are pure domain types with no infrastructure dependencies. The host
//! application persists them however it likes (they are plain serde JSON).

use serde::{Deserialize, Serialize};

use crate::domain::LearnerProfile;

/// Default native language of the learner.
pub const DEFAULT_NATIVE_LANGUAGE: &str = "Ukrainian";

/// Default language being practiced.
pub const DEFAULT_TARGET_LANGUAGE: &str = "German";

/// Default CEFR level.
pub const DEFAULT_LEVEL: &str = "A2";

/// Accepted CEFR levels.
pub const CEFR_LEVELS: [&str; 6] = ["A1", "A2", "B1", "B2", "C1", "C2"];

/// Upper bound on rate-limit retries accepted by validation.
pub const MAX_RATE_LIMIT_RETRIES: u32 = 10;

/// Speech synthesis and scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct VoiceSettings {
    /// Pause between queued synthesis requests, in milliseconds.
    pub request_spacing_ms: u64,

    /// How many times a rate-limited request is retried.
    pub max_rate_limit_retries: u32,

    /// Backoff step; retry `n` waits `n * step`.
    pub retry_backoff_step_ms: u64,

    /// Sample rate of the raw PCM returned by the synthesizer.
    pub sample_rate: u32,

    /// Channel count of the raw PCM returned by the synthesizer.
    pub channels: u16,

    /// Optional per-attempt timeout for synthesis calls.
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            request_spacing_ms: 500,
            max_rate_limit_retries: 3,
            retry_backoff_step_ms: 1000,
            sample_rate: 24_000,
            channels: 1,
            fetch_timeout_ms: None,
        }
    }
}

/// Settings for a practice screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PracticeSettings {
    /// Language translations are given in.
    pub native_language: String,

    /// Language being practiced.
    pub target_language: String,

    /// CEFR level the counterpart should speak at.
    pub level: String,

    /// Delay between the last task completing and the session reporting
    /// completion, so the final line stays visible.
    pub completion_delay_ms: u64,

    pub voice: VoiceSettings,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            native_language: DEFAULT_NATIVE_LANGUAGE.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            level: DEFAULT_LEVEL.to_string(),
            completion_delay_ms: 1500,
            voice: VoiceSettings::default(),
        }
    }
}

impl PracticeSettings {
    /// The learner these settings describe.
    pub fn learner(&self) -> LearnerProfile {
        LearnerProfile::new(&self.native_language, &self.target_language, &self.level)
    }

    /// Parse settings from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Merge an update into these settings, only touching fields that are Some.
    ///
    /// Does not validate; see [`apply_update`](Self::apply_update).
    pub fn merge(&mut self, other: &PracticeSettingsUpdate) {
        if let Some(ref lang) = other.native_language {
            self.native_language.clone_from(lang);
        }
        if let Some(ref lang) = other.target_language {
            self.target_language.clone_from(lang);
        }
        if let Some(ref level) = other.level {
            self.level.clone_from(level);
        }
        if let Some(delay) = other.completion_delay_ms {
            self.completion_delay_ms = delay;
        }
        if let Some(spacing) = other.request_spacing_ms {
            self.voice.request_spacing_ms = spacing;
        }
        if let Some(retries) = other.max_rate_limit_retries {
            self.voice.max_rate_limit_retries = retries;
        }
        if let Some(step) = other.retry_backoff_step_ms {
            self.voice.retry_backoff_step_ms = step;
        }
        if let Some(rate) = other.sample_rate {
            self.voice.sample_rate = rate;
        }
        if let Some(channels) = other.channels {
            self.voice.channels = channels;
        }
        if let Some(ref timeout) = other.fetch_timeout_ms {
            self.voice.fetch_timeout_ms = *timeout;
        }
    }

    /// Apply an update and validate the result.
    ///
    /// On error `self` is left unchanged.
    pub fn apply_update(&mut self, update: &PracticeSettingsUpdate) -> Result<(), SettingsError> {
        let mut next = self.clone();
        next.merge(update);
        validate_settings(&next)?;
        *self = next;
        Ok(())
    }
}

/// Partial settings update.
///
/// `fetch_timeout_ms` uses `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = clear the timeout
/// - `Some(Some(value))` = set it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSettingsUpdate {
    pub native_language: Option<String>,
    pub target_language: Option<String>,
    pub level: Option<String>,
    pub completion_delay_ms: Option<u64>,
    pub request_spacing_ms: Option<u64>,
    pub max_rate_limit_retries: Option<u32>,
    pub retry_backoff_step_ms: Option<u64>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub fetch_timeout_ms: Option<Option<u64>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid settings JSON: {0}")]
    Parse(String),

    #[error("{0} language must not be empty")]
    EmptyLanguage(&'static str),

    #[error("Unknown CEFR level '{0}' (expected A1-C2)")]
    InvalidLevel(String),

    #[error("Sample rate must be greater than zero")]
    InvalidSampleRate,

    #[error("Channel count must be greater than zero")]
    InvalidChannels,

    #[error("Rate-limit retries must be at most 10, got {0}")]
    TooManyRetries(u32),

    #[error("Fetch timeout must be greater than zero")]
    InvalidTimeout,
}

/// Validate practice settings.
pub fn validate_settings(settings: &PracticeSettings) -> Result<(), SettingsError> {
    if settings.native_language.trim().is_empty() {
        return Err(SettingsError::EmptyLanguage("Native"));
    }
    if settings.target_language.trim().is_empty() {
        return Err(SettingsError::EmptyLanguage("Target"));
    }
    if !CEFR_LEVELS.contains(&settings.level.as_str()) {
        return Err(SettingsError::InvalidLevel(settings.level.clone()));
    }

    let voice = &settings.voice;
    if voice.sample_rate == 0 {
        return Err(SettingsError::InvalidSampleRate);
    }
    if voice.channels == 0 {
        return Err(SettingsError::InvalidChannels);
    }
    if voice.max_rate_limit_retries > MAX_RATE_LIMIT_RETRIES {
        return Err(SettingsError::TooManyRetries(voice.max_rate_limit_retries));
    }
    if voice.fetch_timeout_ms == Some(0) {
        return Err(SettingsError::InvalidTimeout);
    }

    Ok(())
}
