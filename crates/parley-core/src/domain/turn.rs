//! Conversation history types.

use serde::{Deserialize, Serialize};

use super::word::WordPair;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The learner.
    User,
    /// The AI counterpart.
    Model,
}

impl TurnRole {
    /// Convert role to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One utterance in the conversation history.
///
/// History is append-only; a turn is never modified after it is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// The line currently spoken by the AI counterpart, with its learning aids.
///
/// `word_pairs` and `hint` belong to this line only and are replaced wholesale
/// when the next reply arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLine {
    /// Target-language text.
    pub text: String,

    /// Full native-language translation (may be empty).
    pub translation: String,

    /// Per-word alignment for `text`.
    pub word_pairs: Vec<WordPair>,

    /// Suggested next utterance for the learner.
    pub hint: String,
}

impl ModelLine {
    /// A line with no translation, word pairs or hint.
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}
