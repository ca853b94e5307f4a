//! Common test doubles for parley-session integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley_core::{
    ChatSession, DialogueBackend, DialogueError, LearnerProfile, SpeechPrefetch, Task, TaskId,
    VocabularyEntry, VocabularySink,
};

pub const CAFE_SCENARIO: &str = r#"Here you go:
```json
{
  "description": "Ви в кафе в Берліні.",
  "message": "Hallo! Was darf es sein?",
  "translation": "Привіт! Що бажаєте?",
  "word_pairs": [
    {"word": "Hallo!", "translation": "Привіт!"},
    {"word": "Was", "translation": "Що"},
    {"word": "darf", "translation": "можна"},
    {"word": "es", "translation": "це"},
    {"word": "sein?", "translation": "бути?"}
  ],
  "hint": "Einen Kaffee, bitte.",
  "tasks": [{"id": 1, "text": "Greet"}, {"id": 2, "text": "Ask price"}]
}
```"#;

pub fn turn_reply(text: &str, completed: &[TaskId]) -> String {
    let ids: Vec<String> = completed.iter().map(ToString::to_string).collect();
    format!(
        r#"{{"text": "{text}", "translation": "", "word_pairs": [{{"word": "Gern!", "translation": "Із задоволенням!"}}], "hint": "Danke.", "completed_task_ids": [{}]}}"#,
        ids.join(", ")
    )
}

/// One turn the chat received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTurn {
    pub chat: usize,
    pub utterance: String,
    pub task_ids: Vec<TaskId>,
}

#[derive(Default)]
struct BackendState {
    scenario: Option<Result<String, String>>,
    replies: VecDeque<Result<String, String>>,
    opened: Vec<(String, String)>,
    sent: Vec<SentTurn>,
    learners: Vec<(&'static str, LearnerProfile)>,
}

/// Dialogue backend answering from a script shared by all chats it opens.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<Mutex<BackendState>>,
}

impl ScriptedBackend {
    pub fn new(scenario: &str) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().scenario = Some(Ok(scenario.to_string()));
        backend
    }

    pub fn failing() -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().scenario = Some(Err("503".to_string()));
        backend
    }

    pub fn push_reply(&self, raw: impl Into<String>) {
        self.state.lock().unwrap().replies.push_back(Ok(raw.into()));
    }

    pub fn push_failure(&self) {
        self.state
            .lock()
            .unwrap()
            .replies
            .push_back(Err("connection reset".to_string()));
    }

    /// `(topic, opening line)` of every chat opened, in order.
    pub fn opened(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().opened.clone()
    }

    pub fn sent(&self) -> Vec<SentTurn> {
        self.state.lock().unwrap().sent.clone()
    }

    /// `(request, learner)` for every generate, open and send call, in order.
    pub fn learners(&self) -> Vec<(&'static str, LearnerProfile)> {
        self.state.lock().unwrap().learners.clone()
    }
}

#[async_trait]
impl DialogueBackend for ScriptedBackend {
    async fn generate_scenario(
        &self,
        _topic: &str,
        learner: &LearnerProfile,
    ) -> Result<String, DialogueError> {
        let mut state = self.state.lock().unwrap();
        state.learners.push(("generate", learner.clone()));
        let scenario = state.scenario.clone();
        match scenario {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(e)) => Err(DialogueError::Unavailable(e)),
            None => Err(DialogueError::Unavailable("no scenario scripted".to_string())),
        }
    }

    fn open_chat(
        &self,
        topic: &str,
        learner: &LearnerProfile,
        opening_line: &str,
    ) -> Box<dyn ChatSession> {
        let mut state = self.state.lock().unwrap();
        state.learners.push(("open", learner.clone()));
        state
            .opened
            .push((topic.to_string(), opening_line.to_string()));
        Box::new(ScriptedChat {
            id: state.opened.len() - 1,
            state: Arc::clone(&self.state),
        })
    }
}

struct ScriptedChat {
    id: usize,
    state: Arc<Mutex<BackendState>>,
}

#[async_trait]
impl ChatSession for ScriptedChat {
    async fn send_turn(
        &mut self,
        utterance: &str,
        tasks: &[Task],
        learner: &LearnerProfile,
    ) -> Result<String, DialogueError> {
        let mut state = self.state.lock().unwrap();
        state.learners.push(("send", learner.clone()));
        state.sent.push(SentTurn {
            chat: self.id,
            utterance: utterance.to_string(),
            task_ids: tasks.iter().map(|t| t.id).collect(),
        });
        match state.replies.pop_front() {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(e)) => Err(DialogueError::Unavailable(e)),
            None => Err(DialogueError::Unavailable("no reply scripted".to_string())),
        }
    }
}

/// Prefetch port that records what it was asked to load.
#[derive(Default)]
pub struct RecordingPrefetch {
    requested: Mutex<Vec<String>>,
}

impl RecordingPrefetch {
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl SpeechPrefetch for RecordingPrefetch {
    fn preload(&self, texts: &[String]) -> usize {
        self.requested.lock().unwrap().extend(texts.iter().cloned());
        texts.len()
    }
}

mockall::mock! {
    pub Vocabulary {}

    #[async_trait]
    impl VocabularySink for Vocabulary {
        async fn add_words(&self, entries: Vec<VocabularyEntry>);
    }
}
