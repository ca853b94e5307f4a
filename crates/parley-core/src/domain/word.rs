//! Word pair and vocabulary types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Alignment between one inflected word of a model line and its translation.
///
/// `word` is the exact substring used in the line (e.g. `"bin"`, not `"sein"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordPair {
    pub word: String,
    pub translation: String,
}

impl WordPair {
    pub fn new(word: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            translation: translation.into(),
        }
    }
}

/// Part-of-speech bucket of a saved vocabulary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordCategory {
    Noun,
    Verb,
    Adjective,
    Phrase,
}

/// A word the learner chose to keep, handed to the vocabulary sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub id: String,
    /// Word in the target language, as it appeared in the line.
    pub word: String,
    /// Native-language translation.
    pub translation: String,
    pub category: WordCategory,
    /// Mastery level 0-5; new entries start at 0.
    pub mastery_level: u8,
    pub added_at: DateTime<Utc>,
}

impl VocabularyEntry {
    /// Build a fresh entry for a word clicked in a conversation.
    ///
    /// The part of speech is unknown at that point, so entries are filed as
    /// [`WordCategory::Phrase`].
    pub fn from_pair(pair: &WordPair) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            word: pair.word.clone(),
            translation: pair.translation.clone(),
            category: WordCategory::Phrase,
            mastery_level: 0,
            added_at: Utc::now(),
        }
    }
}
