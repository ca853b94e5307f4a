//! Scenario state machine: progression of one practice session.
//!
//! ```text
//!   SelectingMode ──select_mode──▶ ChoosingTopic ──choose_topic──▶ Preparing
//!        ▲  ▲                          ▲   │ back                     │ scenario
//!        │  └──────────────────────────┼───┘                          ▼ (or fallback)
//!        │                             └──────────── back ────── Introduction
//!        │ close (any)                                                │ begin
//!        │                                                            ▼
//!        └──────────────────────────────────────────────────────── Active ↻ submit_turn
//!                                                                    │ ▲
//!                                              all tasks + delay     ▼ │ retry
//!                                                               Completed
//! ```
//!
//! Every transition is triggered by the caller (or by the dialogue backend
//! answering); the only timer is the completion display delay. Methods take
//! `&mut self`, so turns are strictly ordered and dropping the machine drops
//! any pending reply with it.

use std::sync::Arc;

use parley_core::{
    AlignedToken, Delay, DialogueBackend, ModelLine, NoopVocabularySink, Scenario, SpeechPrefetch,
    TaskList, TokioDelay, Turn, VocabularyEntry, VocabularySink, WordAligner, WordPair,
    fallback_scenario, parse_scenario_reply,
};
use tokio::sync::mpsc;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::state::{PracticeMode, ScenarioPhase, SessionEvent, SessionSummary};
use crate::turn::{Conversation, DialogueTurnProcessor, TurnOutcome};

/// Owns the scenario, its live task list and the chat context of one session.
pub struct ScenarioStateMachine {
    backend: Arc<dyn DialogueBackend>,
    vocabulary: Arc<dyn VocabularySink>,
    prefetch: Option<Arc<dyn SpeechPrefetch>>,
    delay: Arc<dyn Delay>,
    config: SessionConfig,

    phase: ScenarioPhase,
    mode: Option<PracticeMode>,
    scenario: Option<Scenario>,
    processor: Option<DialogueTurnProcessor>,
    conversation: Option<Conversation>,

    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl std::fmt::Debug for ScenarioStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioStateMachine")
            .field("phase", &self.phase)
            .field("mode", &self.mode)
            .field("topic", &self.topic())
            .finish_non_exhaustive()
    }
}

impl ScenarioStateMachine {
    /// Create a machine in `SelectingMode`.
    ///
    /// Returns the machine and a receiver for [`SessionEvent`]s. Vocabulary
    /// saving, speech prefetch and the completion timer default to no-op,
    /// none and Tokio; override them with the `with_*` methods.
    pub fn new(
        backend: Arc<dyn DialogueBackend>,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let machine = Self {
            backend,
            vocabulary: Arc::new(NoopVocabularySink),
            prefetch: None,
            delay: Arc::new(TokioDelay),
            config,
            phase: ScenarioPhase::SelectingMode,
            mode: None,
            scenario: None,
            processor: None,
            conversation: None,
            event_tx,
        };
        (machine, event_rx)
    }

    #[must_use]
    pub fn with_vocabulary_sink(mut self, sink: Arc<dyn VocabularySink>) -> Self {
        self.vocabulary = sink;
        self
    }

    /// Queue speech for every new line (and its hint and words) as it appears.
    #[must_use]
    pub fn with_prefetch(mut self, prefetch: Arc<dyn SpeechPrefetch>) -> Self {
        self.prefetch = Some(prefetch);
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub const fn phase(&self) -> ScenarioPhase {
        self.phase
    }

    pub const fn mode(&self) -> Option<PracticeMode> {
        self.mode
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The scenario, from `Introduction` on.
    pub const fn scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    pub fn topic(&self) -> Option<&str> {
        self.scenario.as_ref().map(|s| s.topic.as_str())
    }

    /// The line the learner is answering (the opening line in `Introduction`).
    pub fn current_line(&self) -> Option<&ModelLine> {
        match &self.conversation {
            Some(conversation) => Some(&conversation.current),
            None => self.scenario.as_ref().map(|s| &s.opening),
        }
    }

    pub fn hint(&self) -> Option<&str> {
        self.current_line()
            .map(|line| line.hint.as_str())
            .filter(|hint| !hint.is_empty())
    }

    /// Live objectives of the active conversation.
    pub fn tasks(&self) -> Option<&TaskList> {
        self.conversation.as_ref().map(|c| &c.tasks)
    }

    pub fn history(&self) -> &[Turn] {
        self.conversation
            .as_ref()
            .map(|c| c.history.as_slice())
            .unwrap_or_default()
    }

    // ── Transitions ────────────────────────────────────────────────

    /// `SelectingMode → ChoosingTopic`.
    pub fn select_mode(&mut self, mode: PracticeMode) -> Result<(), SessionError> {
        self.expect_phase(ScenarioPhase::SelectingMode, "select a mode")?;
        self.mode = Some(mode);
        self.set_phase(ScenarioPhase::ChoosingTopic);
        Ok(())
    }

    /// `ChoosingTopic → Preparing → Introduction`.
    ///
    /// Generates the scenario and opens its chat context. If generation fails
    /// or the reply cannot be decoded, the fallback scenario is used, so this
    /// only fails on caller misuse.
    pub async fn choose_topic(&mut self, topic: &str) -> Result<&Scenario, SessionError> {
        self.expect_phase(ScenarioPhase::ChoosingTopic, "choose a topic")?;
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SessionError::EmptyTopic);
        }

        self.set_phase(ScenarioPhase::Preparing);
        let scenario = match self
            .backend
            .generate_scenario(topic, &self.config.learner)
            .await
        {
            Ok(raw) => parse_scenario_reply(topic, &raw).unwrap_or_else(|e| {
                tracing::warn!(target: "parley.session", error = %e, "Undecodable scenario; using fallback");
                fallback_scenario(topic)
            }),
            Err(e) => {
                tracing::warn!(target: "parley.session", error = %e, "Scenario generation failed; using fallback");
                fallback_scenario(topic)
            }
        };

        tracing::debug!(
            target: "parley.session",
            topic,
            tasks = scenario.tasks.len(),
            "Scenario ready"
        );
        self.processor = Some(self.open_processor(&scenario));
        self.prefetch_line(&scenario.opening);
        self.set_phase(ScenarioPhase::Introduction);

        Ok(self.scenario.insert(scenario))
    }

    /// `Introduction → Active`: the conversation starts at the opening line.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        self.expect_phase(ScenarioPhase::Introduction, "begin")?;
        let Some(scenario) = self.scenario.as_ref() else {
            return Err(self.invalid("begin"));
        };
        self.conversation = Some(Conversation::new(
            scenario.opening.clone(),
            self.live_tasks(scenario),
        ));
        self.set_phase(ScenarioPhase::Active);
        Ok(())
    }

    /// Answer the current line (`Active → Active`, or `→ Completed`).
    ///
    /// When the reply completes the last objective, waits the completion
    /// delay so the final line stays visible, then enters `Completed`.
    pub async fn submit_turn(&mut self, utterance: &str) -> Result<TurnOutcome, SessionError> {
        self.expect_phase(ScenarioPhase::Active, "submit a turn")?;
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(SessionError::EmptyUtterance);
        }
        let missing = self.invalid("submit a turn");
        let (Some(processor), Some(conversation)) =
            (self.processor.as_mut(), self.conversation.as_mut())
        else {
            return Err(missing);
        };

        let outcome = processor.process(conversation, utterance).await;
        let (completed, total) = (conversation.tasks.completed_count(), conversation.tasks.len());
        let line = conversation.current.clone();

        self.emit(SessionEvent::TurnApplied { line: line.clone() });
        if !outcome.newly_completed.is_empty() {
            self.emit(SessionEvent::TasksUpdated {
                newly_completed: outcome.newly_completed.clone(),
                completed,
                total,
            });
        }
        self.prefetch_line(&line);

        if outcome.all_completed {
            tracing::debug!(target: "parley.session", "All tasks completed");
            self.delay.sleep(self.config.completion_delay).await;
            self.set_phase(ScenarioPhase::Completed);
            if let Some(summary) = self.summary() {
                self.emit(SessionEvent::Completed { summary });
            }
        }
        Ok(outcome)
    }

    /// `Completed → Active`: restart the same scenario.
    ///
    /// History and task completion return to the initial snapshot and a fresh
    /// chat context is opened so the remote side forgets the previous run.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        self.expect_phase(ScenarioPhase::Completed, "retry")?;
        let Some(scenario) = self.scenario.as_ref() else {
            return Err(self.invalid("retry"));
        };
        let processor = self.open_processor(scenario);
        let conversation = Conversation::new(scenario.opening.clone(), self.live_tasks(scenario));

        self.processor = Some(processor);
        self.conversation = Some(conversation);
        self.set_phase(ScenarioPhase::Active);
        Ok(())
    }

    /// Step back: `ChoosingTopic → SelectingMode`, or `Introduction →
    /// ChoosingTopic` discarding the scenario.
    pub fn back(&mut self) -> Result<(), SessionError> {
        match self.phase {
            ScenarioPhase::ChoosingTopic => {
                self.mode = None;
                self.set_phase(ScenarioPhase::SelectingMode);
                Ok(())
            }
            ScenarioPhase::Introduction => {
                self.scenario = None;
                self.processor = None;
                self.set_phase(ScenarioPhase::ChoosingTopic);
                Ok(())
            }
            _ => Err(self.invalid("go back")),
        }
    }

    /// Leave the session from any phase and return to `SelectingMode`.
    pub fn close(&mut self) {
        self.mode = None;
        self.scenario = None;
        self.processor = None;
        self.conversation = None;
        self.set_phase(ScenarioPhase::SelectingMode);
    }

    // ── Learning aids ──────────────────────────────────────────────

    /// Translation of one token of the current line, if the reply provided it.
    pub fn translate_word(&self, token: &str) -> Option<&str> {
        let line = self.current_line()?;
        WordAligner::new(&line.word_pairs).translate(token)
    }

    /// The current line split into tokens with their translations.
    pub fn aligned_line(&self) -> Vec<AlignedToken> {
        self.current_line().map_or_else(Vec::new, |line| {
            WordAligner::new(&line.word_pairs).align_line(&line.text)
        })
    }

    /// Save a word to the learner's vocabulary.
    pub async fn save_word(
        &self,
        word: &str,
        translation: &str,
    ) -> Result<VocabularyEntry, SessionError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(SessionError::EmptyWord);
        }
        let entry = VocabularyEntry::from_pair(&WordPair::new(word, translation.trim()));
        tracing::debug!(target: "parley.session", id = %entry.id, "Saving word");
        self.vocabulary.add_words(vec![entry.clone()]).await;
        Ok(entry)
    }

    /// Completion-screen figures, once a conversation exists.
    pub fn summary(&self) -> Option<SessionSummary> {
        self.conversation.as_ref().map(|c| SessionSummary {
            tasks_completed: c.tasks.completed_count(),
            total_tasks: c.tasks.len(),
            words_practiced: c.words_practiced(),
        })
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn open_processor(&self, scenario: &Scenario) -> DialogueTurnProcessor {
        let chat = self.backend.open_chat(
            &scenario.topic,
            &self.config.learner,
            &scenario.opening.text,
        );
        DialogueTurnProcessor::new(chat, self.config.learner.clone())
    }

    /// Free chat carries no objectives.
    fn live_tasks(&self, scenario: &Scenario) -> TaskList {
        match self.mode {
            Some(PracticeMode::Chat) => TaskList::default(),
            Some(PracticeMode::Speak) | None => scenario.tasks.clone(),
        }
    }

    fn prefetch_line(&self, line: &ModelLine) {
        let Some(prefetch) = &self.prefetch else {
            return;
        };
        let texts: Vec<String> = std::iter::once(&line.text)
            .chain(std::iter::once(&line.hint))
            .chain(line.word_pairs.iter().map(|pair| &pair.word))
            .cloned()
            .collect();
        prefetch.preload(&texts);
    }

    fn expect_phase(&self, expected: ScenarioPhase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    const fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            phase: self.phase,
        }
    }

    fn set_phase(&mut self, new_phase: ScenarioPhase) {
        if self.phase != new_phase {
            tracing::debug!(target: "parley.session", from = %self.phase, to = %new_phase, "Phase transition");
            let from = std::mem::replace(&mut self.phase, new_phase);
            self.emit(SessionEvent::PhaseChanged {
                from,
                to: new_phase,
            });
        }
    }

    /// Emit an event (best-effort; a dropped receiver is logged and ignored).
    fn emit(&self, event: SessionEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!(target: "parley.session", "Session event receiver dropped");
        }
    }
}
