//! Content-addressed store of decoded speech.
//!
//! Keys are the exact synthesis input. Entries are write-once: the first
//! successful decode for a text wins and later writes are ignored, so two
//! racing decodes can never swap the buffer under a playing source.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::pcm::DecodedAudio;

/// Shared, cloneable audio cache scoped to one practice screen.
#[derive(Debug, Clone, Default)]
pub struct AudioCache {
    entries: Arc<RwLock<HashMap<String, Arc<DecodedAudio>>>>,
}

impl AudioCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the audio for `text`.
    pub fn get(&self, text: &str) -> Option<Arc<DecodedAudio>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(text)
            .cloned()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(text)
    }

    /// Store `audio` for `text` unless an entry already exists.
    ///
    /// Returns the entry that ends up in the cache: `audio` on first write,
    /// the existing buffer otherwise.
    pub fn put(&self, text: impl Into<String>, audio: Arc<DecodedAudio>) -> Arc<DecodedAudio> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(text.into()).or_insert(audio))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry (screen teardown).
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
