//! Keyword-spotting listening exercises.
//!
//! The learner hears a passage, picks the keywords they caught from a list of
//! options and checks the answer. Audio is the host's concern: it plays
//! [`ListeningExercise::full_text`] and the options through its playback
//! controller, and a [`SpeechPrefetch`] can be attached so every stage's
//! audio is queued as soon as the stage appears.

use std::sync::Arc;

use parley_core::{SpeechPrefetch, WordAligner, WordPair};
use serde::{Deserialize, Serialize};

/// One passage with its keyword options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningExercise {
    pub full_text: String,
    pub translation: String,
    /// Words offered for selection, in display order.
    pub options: Vec<String>,
    /// Options that actually occur as keywords of the passage.
    pub correct_keywords: Vec<String>,
    pub word_pairs: Vec<WordPair>,
}

impl ListeningExercise {
    /// Texts that need audio: the passage, then every option.
    pub fn audio_texts(&self) -> Vec<String> {
        std::iter::once(&self.full_text)
            .chain(&self.options)
            .cloned()
            .collect()
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.correct_keywords.iter().any(|k| k == word)
    }

    /// Translation of a passage token or an option.
    pub fn translate(&self, token: &str) -> Option<&str> {
        WordAligner::new(&self.word_pairs).translate(token)
    }

    /// The built-in apartment-viewing passage.
    pub fn apartment_viewing() -> Self {
        let pairs = [
            ("Besichtigungstermin", "viewing appointment"),
            ("interessiere", "am interested"),
            ("Balkon", "balcony"),
            ("Lage", "location"),
            ("Möbel", "furniture"),
            ("Kaution", "deposit"),
            ("vereinbaren", "arrange"),
            ("Guten", "Good"),
            ("Tag", "day"),
            ("mein", "my"),
            ("Name", "name"),
            ("ist", "is"),
            ("Ich", "I"),
            ("mich", "myself"),
            ("sehr", "very"),
            ("für", "for"),
            ("die", "the"),
            ("Wohnung", "apartment"),
            ("in", "in"),
            ("der", "the"),
            ("und", "and"),
            ("wollte", "wanted"),
            ("fragen", "to ask"),
            ("ob", "if"),
            ("es", "it"),
            ("bald", "soon"),
            ("einen", "a"),
            ("gibt", "there is"),
        ];
        Self {
            full_text: "Guten Tag, mein Name ist Julia Weber. Ich interessiere mich sehr für die \
                        Wohnung in der Birkenstraße und wollte fragen, ob es bald einen \
                        Besichtigungstermin gibt."
                .to_string(),
            translation: "Good day, my name is Julia Weber. I am very interested in the \
                          apartment on Birkenstraße and wanted to ask if there is a viewing \
                          appointment available soon."
                .to_string(),
            options: [
                "interessiere",
                "Balkon",
                "Lage",
                "Besichtigungstermin",
                "Kaution",
                "Möbel",
                "Ich",
                "möchte",
                "einen",
                "vereinbaren",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            correct_keywords: vec![
                "Besichtigungstermin".to_string(),
                "interessiere".to_string(),
            ],
            word_pairs: pairs
                .iter()
                .map(|(word, translation)| WordPair::new(*word, *translation))
                .collect(),
        }
    }
}

/// Result of checking (or revealing) a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListeningFeedback {
    Correct,
    Incorrect,
    /// The solution was revealed without a correct answer.
    Review,
}

impl ListeningFeedback {
    /// Selection is frozen once the solution is on screen.
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Correct | Self::Review)
    }
}

/// Walks the learner through a list of exercises, one stage at a time.
pub struct ListeningSession {
    exercises: Vec<ListeningExercise>,
    stage: usize,
    selected: Vec<String>,
    feedback: Option<ListeningFeedback>,
    prefetch: Option<Arc<dyn SpeechPrefetch>>,
}

impl std::fmt::Debug for ListeningSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListeningSession")
            .field("stage", &self.stage)
            .field("exercises", &self.exercises.len())
            .field("selected", &self.selected)
            .field("feedback", &self.feedback)
            .finish_non_exhaustive()
    }
}

impl ListeningSession {
    pub const fn new(exercises: Vec<ListeningExercise>) -> Self {
        Self {
            exercises,
            stage: 0,
            selected: Vec::new(),
            feedback: None,
            prefetch: None,
        }
    }

    /// Queue audio for the current stage now and for every later stage as it
    /// appears.
    #[must_use]
    pub fn with_prefetch(mut self, prefetch: Arc<dyn SpeechPrefetch>) -> Self {
        self.prefetch = Some(prefetch);
        self.prefetch_current();
        self
    }

    /// The exercise on screen; `None` once every stage is done.
    pub fn current(&self) -> Option<&ListeningExercise> {
        self.exercises.get(self.stage)
    }

    pub const fn stage(&self) -> usize {
        self.stage
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub const fn feedback(&self) -> Option<ListeningFeedback> {
        self.feedback
    }

    pub fn is_finished(&self) -> bool {
        self.current().is_none()
    }

    /// Select or deselect an option. Ignored for words that are not options
    /// and once the solution is shown; returns whether the word is now
    /// selected.
    pub fn toggle_word(&mut self, word: &str) -> bool {
        if self.feedback.is_some_and(ListeningFeedback::is_final) {
            return self.selected.iter().any(|w| w == word);
        }
        let Some(exercise) = self.current() else {
            return false;
        };
        if !exercise.options.iter().any(|o| o == word) {
            return false;
        }

        if let Some(index) = self.selected.iter().position(|w| w == word) {
            self.selected.remove(index);
            false
        } else {
            self.selected.push(word.to_string());
            true
        }
    }

    /// Check the selection: correct when at least one word is selected and
    /// every selected word is a keyword of the passage.
    pub fn check(&mut self) -> Option<ListeningFeedback> {
        let exercise = self.current()?;
        let correct =
            !self.selected.is_empty() && self.selected.iter().all(|w| exercise.is_keyword(w));
        let feedback = if correct {
            ListeningFeedback::Correct
        } else {
            ListeningFeedback::Incorrect
        };
        tracing::debug!(
            target: "parley.session",
            stage = self.stage,
            selected = self.selected.len(),
            correct,
            "Listening answer checked"
        );
        self.feedback = Some(feedback);
        Some(feedback)
    }

    /// Show the solution without a correct answer.
    pub fn reveal(&mut self) {
        if self.current().is_some() && self.feedback != Some(ListeningFeedback::Correct) {
            self.feedback = Some(ListeningFeedback::Review);
        }
    }

    /// Move to the next stage (also used to skip). Returns `false` when no
    /// stage is left.
    pub fn advance(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.stage += 1;
        self.selected.clear();
        self.feedback = None;
        self.prefetch_current();
        !self.is_finished()
    }

    fn prefetch_current(&self) {
        if let (Some(prefetch), Some(exercise)) = (&self.prefetch, self.current()) {
            prefetch.preload(&exercise.audio_texts());
        }
    }
}
