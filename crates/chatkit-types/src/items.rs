use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{generate_id, IdKind};

/// A single conversation entry stored in a thread.
///
/// Items are immutable once appended to a store; updates during streaming are
/// expressed as [`crate::ThreadItemUpdate`] events, never as in-place edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThreadItem {
    UserMessage(UserMessageItem),
    AssistantMessage(AssistantMessageItem),
    Widget(WidgetItem),
    HiddenContextItem(HiddenContextItem),
}

impl ThreadItem {
    pub fn id(&self) -> &str {
        match self {
            Self::UserMessage(item) => &item.id,
            Self::AssistantMessage(item) => &item.id,
            Self::Widget(item) => &item.id,
            Self::HiddenContextItem(item) => &item.id,
        }
    }

    pub fn thread_id(&self) -> &str {
        match self {
            Self::UserMessage(item) => &item.thread_id,
            Self::AssistantMessage(item) => &item.thread_id,
            Self::Widget(item) => &item.thread_id,
            Self::HiddenContextItem(item) => &item.thread_id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::UserMessage(item) => item.created_at,
            Self::AssistantMessage(item) => item.created_at,
            Self::Widget(item) => item.created_at,
            Self::HiddenContextItem(item) => item.created_at,
        }
    }

    /// Wire name of the variant, handy for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserMessage(_) => "user_message",
            Self::AssistantMessage(_) => "assistant_message",
            Self::Widget(_) => "widget",
            Self::HiddenContextItem(_) => "hidden_context_item",
        }
    }
}

impl From<UserMessageItem> for ThreadItem {
    fn from(item: UserMessageItem) -> Self {
        Self::UserMessage(item)
    }
}

impl From<AssistantMessageItem> for ThreadItem {
    fn from(item: AssistantMessageItem) -> Self {
        Self::AssistantMessage(item)
    }
}

impl From<WidgetItem> for ThreadItem {
    fn from(item: WidgetItem) -> Self {
        Self::Widget(item)
    }
}

impl From<HiddenContextItem> for ThreadItem {
    fn from(item: HiddenContextItem) -> Self {
        Self::HiddenContextItem(item)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserMessageContent {
    InputText { text: String },
    InputTag { id: String, text: String },
}

impl UserMessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::InputText { text: text.into() }
    }
}

/// Per-message overrides chosen by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// User input as submitted by the client, before it becomes an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessageInput {
    pub content: Vec<UserMessageContent>,
    #[serde(default)]
    pub quoted_text: Option<String>,
    #[serde(default)]
    pub inference_options: InferenceOptions,
}

impl UserMessageInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![UserMessageContent::text(text)],
            quoted_text: None,
            inference_options: InferenceOptions::default(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.iter().all(|part| match part {
            UserMessageContent::InputText { text } => text.trim().is_empty(),
            UserMessageContent::InputTag { .. } => false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessageItem {
    pub id: String,
    pub thread_id: String,
    pub created_at: DateTime<Utc>,
    pub content: Vec<UserMessageContent>,
    #[serde(default)]
    pub quoted_text: Option<String>,
    #[serde(default)]
    pub inference_options: InferenceOptions,
}

impl UserMessageItem {
    /// Turn client input into a new item for `thread_id`.
    pub fn from_input(thread_id: impl Into<String>, input: UserMessageInput) -> Self {
        Self {
            id: generate_id(IdKind::Message),
            thread_id: thread_id.into(),
            created_at: Utc::now(),
            content: input.content,
            quoted_text: input.quoted_text,
            inference_options: input.inference_options,
        }
    }

    /// Plain-text rendering; tags become `@label`.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|part| match part {
                UserMessageContent::InputText { text } => text.clone(),
                UserMessageContent::InputTag { text, .. } => format!("@{}", text),
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantMessageContent {
    OutputText {
        text: String,
        #[serde(default)]
        annotations: Vec<serde_json::Value>,
    },
}

impl AssistantMessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::OutputText {
            text: text.into(),
            annotations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessageItem {
    pub id: String,
    pub thread_id: String,
    pub created_at: DateTime<Utc>,
    pub content: Vec<AssistantMessageContent>,
}

impl AssistantMessageItem {
    /// Empty assistant message, ready to receive streamed content.
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            id: generate_id(IdKind::Message),
            thread_id: thread_id.into(),
            created_at: Utc::now(),
            content: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = vec![AssistantMessageContent::text(text)];
        self
    }

    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|part| match part {
                AssistantMessageContent::OutputText { text, .. } => text.as_str(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetItem {
    pub id: String,
    pub thread_id: String,
    pub created_at: DateTime<Utc>,
    pub widget: serde_json::Value,
    #[serde(default)]
    pub copy_text: Option<String>,
}

impl WidgetItem {
    pub fn new(thread_id: impl Into<String>, widget: serde_json::Value) -> Self {
        Self {
            id: generate_id(IdKind::Widget),
            thread_id: thread_id.into(),
            created_at: Utc::now(),
            widget,
            copy_text: None,
        }
    }
}

/// Context the model should see but the user should not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenContextItem {
    pub id: String,
    pub thread_id: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
}

impl HiddenContextItem {
    pub fn new(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: generate_id(IdKind::HiddenContext),
            thread_id: thread_id.into(),
            created_at: Utc::now(),
            content: content.into(),
        }
    }
}
