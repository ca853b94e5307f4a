//! Minimal scenario used when scenario generation fails.

use crate::domain::{ModelLine, Scenario, Task, TaskList, WordPair};

/// Build the fallback scenario for `topic`.
///
/// Always has a non-empty description, one greeting line and one trivial
/// task, so a session can proceed even when the backend is unavailable.
pub fn fallback_scenario(topic: &str) -> Scenario {
    Scenario {
        topic: topic.to_string(),
        description: "Error generating scenario.".to_string(),
        opening: ModelLine {
            text: "Hallo! Wie geht es dir?".to_string(),
            translation: "Hello! How are you?".to_string(),
            word_pairs: vec![
                WordPair::new("Hallo!", "Привіт!"),
                WordPair::new("Wie", "Як"),
                WordPair::new("geht", "справи"),
                WordPair::new("es", "воно"),
                WordPair::new("dir?", "в тебе?"),
            ],
            hint: "Danke, gut.".to_string(),
        },
        tasks: TaskList::new(vec![Task::new(1, "Say hello")]),
    }
}
