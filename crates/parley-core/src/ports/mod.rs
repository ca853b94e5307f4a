//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define the interfaces that the core domain expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No wire formats in any signature: dialogue replies cross the boundary as
//!   raw text and are decoded by [`crate::reply`]
//! - Chat context is an explicit [`ChatSession`] object, never global state
//! - Time is injected through [`Delay`] so backoff schedules are testable

pub mod delay;
pub mod dialogue;
pub mod speech;
pub mod vocabulary;

pub use delay::{Delay, TokioDelay};
pub use dialogue::{ChatSession, DialogueBackend, DialogueError};
pub use speech::{SpeechPrefetch, SpeechSynthesizer, SynthesisError};
pub use vocabulary::{NoopVocabularySink, VocabularySink};
