use serde::{Deserialize, Serialize};

use crate::items::UserMessageInput;
use crate::page::SortOrder;

/// Request envelope accepted by `POST /chatkit`.
///
/// The `type` tag selects the operation; the variant decides whether the
/// response is an event stream or a single JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChatKitRequest {
    #[serde(rename = "threads.create")]
    CreateThread { params: CreateThreadParams },

    #[serde(rename = "threads.add_user_message")]
    AddUserMessage { params: AddUserMessageParams },

    #[serde(rename = "threads.custom_action")]
    CustomAction { params: CustomActionParams },

    #[serde(rename = "threads.get_by_id")]
    GetThread { params: ThreadIdParams },

    #[serde(rename = "threads.list")]
    ListThreads {
        #[serde(default)]
        params: ListParams,
    },

    #[serde(rename = "items.list")]
    ListItems { params: ListItemsParams },

    #[serde(rename = "threads.update")]
    UpdateThread { params: UpdateThreadParams },
}

impl ChatKitRequest {
    /// Whether the response is delivered as `text/event-stream`.
    pub fn is_streaming(&self) -> bool {
        matches!(
            self,
            Self::CreateThread { .. } | Self::AddUserMessage { .. } | Self::CustomAction { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateThread { .. } => "threads.create",
            Self::AddUserMessage { .. } => "threads.add_user_message",
            Self::CustomAction { .. } => "threads.custom_action",
            Self::GetThread { .. } => "threads.get_by_id",
            Self::ListThreads { .. } => "threads.list",
            Self::ListItems { .. } => "items.list",
            Self::UpdateThread { .. } => "threads.update",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateThreadParams {
    pub input: UserMessageInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddUserMessageParams {
    pub thread_id: String,
    pub input: UserMessageInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomActionParams {
    pub thread_id: String,
    #[serde(default)]
    pub item_id: Option<String>,
    pub action: Action,
}

/// Widget action sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadIdParams {
    pub thread_id: String,
}

/// Raw pagination parameters as sent on the wire.
///
/// `limit` is signed and `after` is a plain string so that bad values reach
/// the handler and are rejected with a validation error rather than a parse
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub order: Option<SortOrder>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItemsParams {
    pub thread_id: String,
    #[serde(flatten)]
    pub page: ListParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateThreadParams {
    pub thread_id: String,
    pub title: String,
}
