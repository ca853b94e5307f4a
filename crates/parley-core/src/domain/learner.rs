//! Who the counterpart is talking to.

use serde::{Deserialize, Serialize};

/// Languages and level a session is run at.
///
/// Passed to every dialogue request so the backend can pitch its lines at
/// the learner's level and translate into their native language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    /// Language translations, descriptions and hints are given in.
    pub native_language: String,

    /// Language being practiced.
    pub target_language: String,

    /// CEFR level, e.g. `"A2"`.
    pub level: String,
}

impl LearnerProfile {
    pub fn new(
        native_language: impl Into<String>,
        target_language: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            native_language: native_language.into(),
            target_language: target_language.into(),
            level: level.into(),
        }
    }

    /// Target language with its level, as used in prompts: `"German (A2 level)"`.
    pub fn target_label(&self) -> String {
        format!("{} ({} level)", self.target_language, self.level)
    }
}
