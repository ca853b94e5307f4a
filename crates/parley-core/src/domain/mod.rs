//! Core domain types.
//!
//! These types represent the pure domain model of a practice session,
//! independent of any infrastructure concerns (AI backends, audio, storage).
//!
//! # Structure
//!
//! - `learner` - Languages and level a session is pitched at
//! - `scenario` - Scenario premise, tasks and the live task list
//! - `turn` - Conversation history entries and the current model line
//! - `word` - Word pairs and vocabulary entries

mod learner;
mod scenario;
mod turn;
mod word;

pub use learner::LearnerProfile;
pub use scenario::{Scenario, Task, TaskId, TaskList};
pub use turn::{ModelLine, Turn, TurnRole};
pub use word::{VocabularyEntry, WordCategory, WordPair};
