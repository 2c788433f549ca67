use serde::{Deserialize, Serialize};

/// Event emitted by an agent run.
///
/// A run emits `Started` first and ends with exactly one of `Completed` or
/// `Error`. Between them, each assistant message is a sequence of
/// `MessageDelta` events closed by `MessageDone`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    Started { run_id: String },

    /// Text appended to the message in progress
    MessageDelta { content: String },

    /// The message in progress is complete
    MessageDone,

    Error { message: String },

    Completed { duration_ms: u64 },
}

impl AgentEvent {
    pub fn delta(content: impl Into<String>) -> Self {
        Self::MessageDelta {
            content: content.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Completed { .. })
    }
}
