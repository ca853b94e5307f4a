//! Scenario state machine and dialogue turn processing for parley.
//!
//! A [`ScenarioStateMachine`] walks one practice session from mode selection
//! to completion. Each learner utterance goes through a
//! [`DialogueTurnProcessor`], which talks to the remote counterpart over an
//! explicit chat context and reconciles task completion. Progress is
//! observable through [`SessionEvent`]s.
//!
//! [`ListeningSession`] runs the keyword-spotting listening exercises.
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod listening;
pub mod machine;
pub mod state;
pub mod turn;

pub use config::SessionConfig;
pub use error::SessionError;
pub use listening::{ListeningExercise, ListeningFeedback, ListeningSession};
pub use machine::ScenarioStateMachine;
pub use state::{PracticeMode, ScenarioPhase, SessionEvent, SessionSummary};
pub use turn::{Conversation, DialogueTurnProcessor, TurnOutcome};

// Dev-dependencies used only by the integration tests
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use parley_voice as _;
