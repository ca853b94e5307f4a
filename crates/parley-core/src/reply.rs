//! Parsing of structured dialogue replies.
//!
//! The dialogue backend returns free text that is *expected* to contain a
//! JSON object. Models routinely wrap it in prose or code fences, so the
//! object is taken from the first `{` to the last `}` before decoding.
//!
//! Turn replies never fail: anything that cannot be decoded degrades to the
//! raw text as the response with empty learning aids. Scenario replies do
//! return an error, and the caller substitutes [`fallback_scenario`].
//!
//! [`fallback_scenario`]: crate::fallback::fallback_scenario

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{ModelLine, Scenario, Task, TaskId, TaskList, WordPair};

/// Line used when a turn could not reach the dialogue backend at all.
pub const CONNECTION_ERROR_TEXT: &str = "Error connecting to AI.";

/// How a turn reply was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    /// Decoded from the structured object.
    Structured,
    /// Not decodable; the raw text was used as the response.
    RawText,
}

/// The counterpart's answer to one learner utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReply {
    pub line: ModelLine,
    pub completed_task_ids: Vec<TaskId>,
}

impl TurnReply {
    /// A reply consisting only of `text`.
    pub fn raw_text(text: impl Into<String>) -> Self {
        Self {
            line: ModelLine::bare(text),
            completed_task_ids: Vec::new(),
        }
    }

    /// Reply substituted when the backend could not be reached.
    pub fn connection_error() -> Self {
        Self::raw_text(CONNECTION_ERROR_TEXT)
    }
}

/// Errors from decoding a scenario reply.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("reply contains no JSON object")]
    NoObject,

    #[error("malformed scenario reply: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("scenario reply is missing the opening message")]
    MissingMessage,
}

/// Slice from the first `{` to the last `}`, if both exist in that order.
fn json_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Decode the object span of `raw`. Non-object JSON counts as no object.
fn decode_object(raw: &str) -> Result<Map<String, Value>, ReplyError> {
    let candidate = json_object_span(raw).ok_or(ReplyError::NoObject)?;
    match serde_json::from_str::<Value>(candidate)? {
        Value::Object(object) => Ok(object),
        _ => Err(ReplyError::NoObject),
    }
}

/// A string field; any other type counts as absent.
fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key)?.as_str().map(str::to_string)
}

fn non_empty_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    string_field(object, key).filter(|s| !s.trim().is_empty())
}

/// Elements of an array field; absent or non-array yields nothing.
fn array_field<'a>(object: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// A task id given as an integer, an integral float or a numeric string.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn task_id(value: &Value) -> Option<TaskId> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(TaskId::MAX))
                    .map(|f| f as u64)
            })
            .and_then(|id| TaskId::try_from(id).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Word pairs with a non-empty string `word` and a string `translation`;
/// anything else is dropped on its own.
fn word_pairs(object: &Map<String, Value>) -> Vec<WordPair> {
    array_field(object, "word_pairs")
        .iter()
        .filter_map(|item| {
            let pair = item.as_object()?;
            let word = non_empty_field(pair, "word")?;
            let translation = string_field(pair, "translation")?;
            Some(WordPair { word, translation })
        })
        .collect()
}

fn completed_task_ids(object: &Map<String, Value>) -> Vec<TaskId> {
    array_field(object, "completed_task_ids")
        .iter()
        .filter_map(task_id)
        .collect()
}

/// Tasks with a usable id and non-empty text. Generated tasks always start
/// incomplete.
fn tasks(object: &Map<String, Value>) -> Vec<Task> {
    array_field(object, "tasks")
        .iter()
        .filter_map(|item| {
            let task = item.as_object()?;
            let id = task_id(task.get("id")?)?;
            let text = non_empty_field(task, "text")?;
            Some(Task::new(id, text))
        })
        .collect()
}

/// Interpret a raw turn reply.
///
/// Fields are decoded one by one: a malformed word pair or task id is
/// dropped without losing the rest of the reply. Falls back to
/// [`ReplyFormat::RawText`] only when no object can be decoded or the object
/// carries neither `text` nor `message` as a string.
pub fn parse_turn_reply(raw: &str) -> (TurnReply, ReplyFormat) {
    let trimmed = raw.trim();

    let object = match decode_object(trimmed) {
        Ok(object) => object,
        Err(e) => {
            tracing::debug!(error = %e, "Turn reply is not structured; using raw text");
            return (TurnReply::raw_text(trimmed), ReplyFormat::RawText);
        }
    };

    let Some(text) = non_empty_field(&object, "text").or_else(|| non_empty_field(&object, "message"))
    else {
        tracing::debug!("Structured turn reply has no text; using raw text");
        return (TurnReply::raw_text(trimmed), ReplyFormat::RawText);
    };

    let reply = TurnReply {
        line: ModelLine {
            text,
            translation: string_field(&object, "translation").unwrap_or_default(),
            word_pairs: word_pairs(&object),
            hint: string_field(&object, "hint").unwrap_or_default(),
        },
        completed_task_ids: completed_task_ids(&object),
    };
    (reply, ReplyFormat::Structured)
}

/// Decode a scenario-generation reply for `topic`.
///
/// Only a missing object or a missing opening `message` is an error; other
/// fields are decoded leniently as in [`parse_turn_reply`].
pub fn parse_scenario_reply(topic: &str, raw: &str) -> Result<Scenario, ReplyError> {
    let object = decode_object(raw.trim())?;
    let message = non_empty_field(&object, "message").ok_or(ReplyError::MissingMessage)?;

    Ok(Scenario {
        topic: topic.to_string(),
        description: string_field(&object, "description").unwrap_or_default(),
        opening: ModelLine {
            text: message,
            translation: string_field(&object, "translation").unwrap_or_default(),
            word_pairs: word_pairs(&object),
            hint: string_field(&object, "hint").unwrap_or_default(),
        },
        tasks: TaskList::new(tasks(&object)),
    })
}
