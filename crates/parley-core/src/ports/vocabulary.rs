//! Vocabulary sink port.

use async_trait::async_trait;

use crate::domain::VocabularyEntry;

/// Receives words the learner chose to save.
///
/// Persistence is the host application's concern; nothing is returned.
#[async_trait]
pub trait VocabularySink: Send + Sync {
    async fn add_words(&self, entries: Vec<VocabularyEntry>);
}

/// A sink that discards everything, for contexts without vocabulary storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVocabularySink;

#[async_trait]
impl VocabularySink for NoopVocabularySink {
    async fn add_words(&self, _entries: Vec<VocabularyEntry>) {}
}
