//! Task data structure.
//!
//! A `Task` is the only persisted record: a short line of text and a completion flag,
//! keyed by an id derived from its creation time.

use serde::{Deserialize, Serialize};

/// Identifier of a task: milliseconds since the Unix epoch at creation.
pub type TaskId = i64;

/// A single todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Create an open task. The caller is responsible for trimming `text`.
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Task {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialises_flat_shape() {
        let task = Task::new(1700000000000, "Buy milk");
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(json, r#"{"id":1700000000000,"text":"Buy milk","completed":false}"#);
    }

    #[test]
    fn test_missing_completed_defaults_false() {
        let task: Task = serde_json::from_str(r#"{"id":5,"text":"x"}"#).unwrap();
        assert!(!task.completed);
    }
}
