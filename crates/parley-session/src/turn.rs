//! One learner/counterpart exchange.

use parley_core::{
    ChatSession, LearnerProfile, ModelLine, ReplyFormat, TaskId, TaskList, Turn, TurnReply, TurnRole,
    parse_turn_reply,
};

/// Live conversation state of an active session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    /// Past turns, oldest first. The current line is not part of it until the
    /// learner answers.
    pub history: Vec<Turn>,

    /// The counterpart's line the learner is answering.
    pub current: ModelLine,

    pub tasks: TaskList,
}

impl Conversation {
    /// A fresh conversation opening with `opening`.
    pub const fn new(opening: ModelLine, tasks: TaskList) -> Self {
        Self {
            history: Vec::new(),
            current: opening,
            tasks,
        }
    }

    /// Whitespace-separated words across the learner's turns.
    pub fn words_practiced(&self) -> usize {
        self.history
            .iter()
            .filter(|turn| turn.role == TurnRole::User)
            .map(|turn| turn.text.split_whitespace().count())
            .sum()
    }
}

/// Result of [`DialogueTurnProcessor::process`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: TurnReply,
    pub format: ReplyFormat,
    /// Tasks completed by this turn.
    pub newly_completed: Vec<TaskId>,
    /// Every task is now completed (always false without tasks).
    pub all_completed: bool,
}

/// Drives exchanges over one chat context.
///
/// Owns the [`ChatSession`]; borrows the conversation for the duration of a
/// turn. Never fails: transport errors and undecodable replies degrade to a
/// plain line.
pub struct DialogueTurnProcessor {
    chat: Box<dyn ChatSession>,
    learner: LearnerProfile,
}

impl std::fmt::Debug for DialogueTurnProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueTurnProcessor")
            .field("learner", &self.learner)
            .finish_non_exhaustive()
    }
}

impl DialogueTurnProcessor {
    pub const fn new(chat: Box<dyn ChatSession>, learner: LearnerProfile) -> Self {
        Self { chat, learner }
    }

    /// Run one exchange.
    ///
    /// Appends the current line and the learner's `utterance` to the history,
    /// sends the utterance with the current tasks, applies the reply's
    /// completed ids (monotonically) and makes the reply the current line.
    pub async fn process(&mut self, conversation: &mut Conversation, utterance: &str) -> TurnOutcome {
        let prior = std::mem::take(&mut conversation.current.text);
        conversation.history.push(Turn::model(prior));
        conversation.history.push(Turn::user(utterance));

        let (reply, format) = match self
            .chat
            .send_turn(utterance, conversation.tasks.as_slice(), &self.learner)
            .await
        {
            Ok(raw) => parse_turn_reply(&raw),
            Err(e) => {
                tracing::warn!(target: "parley.session", error = %e, "Turn request failed");
                (TurnReply::connection_error(), ReplyFormat::RawText)
            }
        };

        let newly_completed = conversation.tasks.apply_completed(&reply.completed_task_ids);
        for task_id in &newly_completed {
            tracing::debug!(target: "parley.session", task_id, "Task completed");
        }
        conversation.current = reply.line.clone();

        TurnOutcome {
            all_completed: conversation.tasks.all_completed(),
            reply,
            format,
            newly_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_core::{DialogueError, Task};
    use std::sync::{Arc, Mutex};

    /// Replies from a fixed list and records what it was sent.
    struct CannedChat {
        replies: Vec<Result<String, DialogueError>>,
        sent: Arc<Mutex<Vec<(String, Vec<TaskId>)>>>,
    }

    #[async_trait]
    impl ChatSession for CannedChat {
        async fn send_turn(
            &mut self,
            utterance: &str,
            tasks: &[Task],
            _learner: &LearnerProfile,
        ) -> Result<String, DialogueError> {
            self.sent
                .lock()
                .unwrap()
                .push((utterance.to_string(), tasks.iter().map(|t| t.id).collect()));
            self.replies.remove(0)
        }
    }

    fn processor(
        replies: Vec<Result<String, DialogueError>>,
    ) -> (DialogueTurnProcessor, Arc<Mutex<Vec<(String, Vec<TaskId>)>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let chat = CannedChat {
            replies,
            sent: Arc::clone(&sent),
        };
        let learner = LearnerProfile::new("Ukrainian", "German", "A2");
        (DialogueTurnProcessor::new(Box::new(chat), learner), sent)
    }

    fn conversation() -> Conversation {
        Conversation::new(
            ModelLine::bare("Hallo! Was darf es sein?"),
            TaskList::new(vec![Task::new(1, "Greet"), Task::new(2, "Ask price")]),
        )
    }

    #[test]
    fn completed_ids_apply_monotonically() {
        let (mut processor, sent) = processor(vec![
            Ok(r#"{"text": "Guten Tag!", "completed_task_ids": [1]}"#.to_string()),
            Ok(r#"{"text": "Drei Euro.", "completed_task_ids": [2]}"#.to_string()),
        ]);
        let mut conversation = conversation();

        let first = tokio_test::block_on(processor.process(&mut conversation, "Hallo"));
        assert_eq!(first.newly_completed, vec![1]);
        assert!(!first.all_completed);
        assert!(conversation.tasks.get(1).unwrap().completed);
        assert!(!conversation.tasks.get(2).unwrap().completed);

        let second = tokio_test::block_on(processor.process(&mut conversation, "Was kostet das?"));
        assert_eq!(second.newly_completed, vec![2]);
        assert!(second.all_completed);
        assert!(conversation.tasks.get(1).unwrap().completed);

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0], ("Hallo".to_string(), vec![1, 2]));
    }

    #[test]
    fn history_gets_prior_line_then_utterance() {
        let (mut processor, _) = processor(vec![Ok(r#"{"text": "Bitte."}"#.to_string())]);
        let mut conversation = conversation();

        tokio_test::block_on(processor.process(&mut conversation, "Einen Kaffee"));

        assert_eq!(
            conversation.history,
            vec![
                Turn::model("Hallo! Was darf es sein?"),
                Turn::user("Einen Kaffee"),
            ]
        );
        assert_eq!(conversation.current.text, "Bitte.");
        assert_eq!(conversation.words_practiced(), 2);
    }

    #[test]
    fn transport_failure_degrades_to_connection_error() {
        let (mut processor, _) = processor(vec![Err(DialogueError::Unavailable(
            "offline".to_string(),
        ))]);
        let mut conversation = conversation();

        let outcome = tokio_test::block_on(processor.process(&mut conversation, "Hallo"));

        assert_eq!(outcome.format, ReplyFormat::RawText);
        assert_eq!(conversation.current, ModelLine::bare("Error connecting to AI."));
        assert!(outcome.newly_completed.is_empty());
        assert_eq!(conversation.tasks.completed_count(), 0);
    }

    #[test]
    fn unparsable_reply_keeps_tasks() {
        let (mut processor, _) = processor(vec![Ok("Entschuldigung?".to_string())]);
        let mut conversation = conversation();

        let outcome = tokio_test::block_on(processor.process(&mut conversation, "Hallo"));

        assert_eq!(outcome.format, ReplyFormat::RawText);
        assert_eq!(conversation.current.text, "Entschuldigung?");
        assert!(conversation.current.word_pairs.is_empty());
        assert!(!outcome.all_completed);
    }
}
