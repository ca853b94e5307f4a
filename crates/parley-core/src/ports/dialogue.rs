//! Dialogue backend port: scenario generation and stateful chat turns.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{LearnerProfile, Task};

/// Errors surfaced by dialogue adapters.
///
/// The session layer never propagates these: scenario generation falls back
/// to a canned scenario and turns degrade to a connection-error line.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// The backend could not be reached or refused the request.
    #[error("Dialogue backend unavailable: {0}")]
    Unavailable(String),

    /// Any other adapter failure.
    #[error("Dialogue request failed: {0}")]
    Request(#[source] anyhow::Error),
}

/// Remote service that invents scenarios and hosts roleplay chats.
///
/// Replies are returned as raw text; decoding and degrade policy belong to
/// [`crate::reply`].
#[async_trait]
pub trait DialogueBackend: Send + Sync {
    /// Ask for a new roleplay scenario about `topic`, pitched at `learner`.
    ///
    /// The reply is expected to contain a JSON object with `description`,
    /// `message`, `translation`, `word_pairs`, `hint` and `tasks`.
    async fn generate_scenario(
        &self,
        topic: &str,
        learner: &LearnerProfile,
    ) -> Result<String, DialogueError>;

    /// Open a chat context whose history starts with the counterpart's
    /// `opening_line`.
    ///
    /// Called once per session (and again on retry), after the scenario has
    /// been decoded or replaced by the fallback.
    fn open_chat(
        &self,
        topic: &str,
        learner: &LearnerProfile,
        opening_line: &str,
    ) -> Box<dyn ChatSession>;
}

/// One roleplay chat context, owned by exactly one session.
#[async_trait]
pub trait ChatSession: Send {
    /// Send the learner's `utterance` together with the current objectives.
    ///
    /// The reply is expected to contain a JSON object with `text`,
    /// `translation`, `word_pairs`, `hint` and `completed_task_ids`.
    async fn send_turn(
        &mut self,
        utterance: &str,
        tasks: &[Task],
        learner: &LearnerProfile,
    ) -> Result<String, DialogueError>;
}
