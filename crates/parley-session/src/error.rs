//! Session error types.

use thiserror::Error;

use crate::state::ScenarioPhase;

/// Errors returned to callers of the [`ScenarioStateMachine`].
///
/// Only caller misuse is reported here. Backend failures never surface: they
/// become the fallback scenario or a connection-error line.
///
/// [`ScenarioStateMachine`]: crate::machine::ScenarioStateMachine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The requested action is not valid in the current phase.
    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: ScenarioPhase,
    },

    #[error("Topic must not be empty")]
    EmptyTopic,

    #[error("Utterance must not be empty")]
    EmptyUtterance,

    #[error("Word must not be empty")]
    EmptyWord,
}
