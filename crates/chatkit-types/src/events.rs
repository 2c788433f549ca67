use serde::{Deserialize, Serialize};

use crate::items::{AssistantMessageContent, ThreadItem};
use crate::thread::ThreadMetadata;

/// Error code carried by the terminal `error` event when the agent run fails.
pub const STREAM_ERROR_CODE: &str = "stream.error";

/// Event relayed to the client over the `text/event-stream` response.
///
/// Each event is written as one `data: <json>` frame, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ThreadStreamEvent {
    /// A thread was created for this request
    #[serde(rename = "thread.created")]
    ThreadCreated { thread: ThreadMetadata },

    /// An item started streaming; its content may still be empty
    #[serde(rename = "thread.item.added")]
    ThreadItemAdded { item: ThreadItem },

    /// Incremental change to an item that is still streaming
    #[serde(rename = "thread.item.updated")]
    ThreadItemUpdated {
        item_id: String,
        update: ThreadItemUpdate,
    },

    /// The item is complete and has been stored
    #[serde(rename = "thread.item.done")]
    ThreadItemDone { item: ThreadItem },

    /// Terminal failure; nothing follows this event
    #[serde(rename = "error")]
    Error {
        code: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        allow_retry: bool,
    },
}

impl ThreadStreamEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            code: STREAM_ERROR_CODE.to_string(),
            message: Some(message.into()),
            allow_retry: false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThreadItemUpdate {
    AssistantMessageContentPartAdded {
        content_index: usize,
        content: AssistantMessageContent,
    },
    AssistantMessageContentPartTextDelta {
        content_index: usize,
        delta: String,
    },
}
