//! Core domain types and port definitions for parley.
//!
//! `parley-core` holds everything the conversation-practice engine needs that
//! is independent of audio hardware and of any concrete AI backend:
//!
//! - [`domain`]: scenarios, tasks, turns, word pairs and vocabulary entries
//! - [`align`]: the word aligner behind clickable per-word translations
//! - [`reply`]: structured-reply parsing with degrade-to-raw-text fallbacks
//! - [`fallback`]: the minimal scenario used when generation fails
//! - [`settings`]: practice settings and validation
//! - [`ports`]: traits for every external collaborator
//!
//! Infrastructure (speech synthesis clients, audio output, vocabulary storage)
//! lives behind the [`ports`] traits and is supplied by the host application.
#![deny(unused_crate_dependencies)]

pub mod align;
pub mod domain;
pub mod fallback;
pub mod ports;
pub mod reply;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use align::{AlignedToken, WordAligner, normalize_token};
pub use domain::{
    LearnerProfile, ModelLine, Scenario, Task, TaskId, TaskList, Turn, TurnRole, VocabularyEntry,
    WordCategory, WordPair,
};
pub use fallback::fallback_scenario;
pub use ports::{
    ChatSession, Delay, DialogueBackend, DialogueError, NoopVocabularySink, SpeechPrefetch,
    SpeechSynthesizer, SynthesisError, TokioDelay, VocabularySink,
};
pub use reply::{ReplyError, ReplyFormat, TurnReply, parse_scenario_reply, parse_turn_reply};
pub use settings::{
    CEFR_LEVELS, PracticeSettings, PracticeSettingsUpdate, SettingsError, VoiceSettings,
    validate_settings,
};

// Only exercised by async unit tests
#[cfg(test)]
use tokio_test as _;
