//! Session phases, practice modes and events.

use std::fmt;

use parley_core::{ModelLine, TaskId};
use serde::Serialize;

/// How the learner practices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeMode {
    /// Task-driven roleplay; completes when every objective is met.
    Speak,
    /// Free conversation; turns carry no objectives and never complete.
    Chat,
}

/// Phase of the scenario state machine.
///
/// ```text
/// SelectingMode → ChoosingTopic → Preparing → Introduction → Active → Completed
///                                                             ↻ turn   │
///                                                   Active ◀── retry ──┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPhase {
    #[default]
    SelectingMode,
    ChoosingTopic,
    /// Awaiting scenario generation.
    Preparing,
    /// Scenario shown; conversation not started.
    Introduction,
    Active,
    Completed,
}

impl ScenarioPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelectingMode => "selecting mode",
            Self::ChoosingTopic => "choosing topic",
            Self::Preparing => "preparing",
            Self::Introduction => "introduction",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ScenarioPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Figures shown on the completion screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub tasks_completed: usize,
    pub total_tasks: usize,
    /// Whitespace-separated words across the learner's turns.
    pub words_practiced: usize,
}

/// Events emitted by the [`ScenarioStateMachine`](crate::machine::ScenarioStateMachine).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    PhaseChanged {
        from: ScenarioPhase,
        to: ScenarioPhase,
    },

    /// A reply was applied; `line` is now the current line.
    TurnApplied { line: ModelLine },

    /// Tasks transitioned to completed during the last turn.
    TasksUpdated {
        newly_completed: Vec<TaskId>,
        completed: usize,
        total: usize,
    },

    Completed { summary: SessionSummary },
}
