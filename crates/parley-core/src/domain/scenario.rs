//! Scenario and task types.

use serde::{Deserialize, Serialize};

use super::turn::ModelLine;

/// Identifier of a task, unique within one scenario.
pub type TaskId = u32;

/// A single conversational objective the learner must accomplish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Create a new, not yet completed task.
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// The live objective list of a session.
///
/// Completion is monotonic: [`apply_completed`](Self::apply_completed) can only
/// set `completed` to `true`. The only way back to an incomplete task is to
/// replace the whole list with a fresh snapshot (session retry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    /// Create a task list from the given tasks.
    pub const fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Borrow the tasks in their original order.
    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    /// Iterate over the tasks.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task by id.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Mark every task whose id appears in `ids` as completed.
    ///
    /// Unknown ids are ignored and already-completed tasks stay completed.
    /// Returns the ids that transitioned from incomplete to complete, in list
    /// order.
    pub fn apply_completed(&mut self, ids: &[TaskId]) -> Vec<TaskId> {
        let mut newly_completed = Vec::new();
        for task in &mut self.tasks {
            if !task.completed && ids.contains(&task.id) {
                task.completed = true;
                newly_completed.push(task.id);
            }
        }
        newly_completed
    }

    /// Number of completed tasks.
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    /// Whether the list is non-empty and every task is completed.
    ///
    /// An empty list never counts as complete (free chat has no objectives).
    pub fn all_completed(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|task| task.completed)
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self::new(tasks)
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

/// One roleplay premise: setting, opening line and objectives.
///
/// A scenario is created once per practice session and is treated as an
/// immutable snapshot; the session owns a separate live [`TaskList`] cloned
/// from [`tasks`](Self::tasks) so that a retry can restore it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Topic the learner asked for.
    pub topic: String,

    /// Short setting description in the learner's native language.
    pub description: String,

    /// The counterpart's first line.
    pub opening: ModelLine,

    /// Objectives as generated.
    pub tasks: TaskList,
}
