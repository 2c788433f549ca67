//! Core types shared by the ChatKit starter crates.
//!
//! Everything that crosses a crate boundary or the HTTP boundary lives here:
//! thread metadata, thread items, the stream events relayed to clients, the
//! request envelope accepted by the endpoint and the pagination primitives
//! used by the store.

pub mod context;
pub mod events;
pub mod ids;
pub mod items;
pub mod page;
pub mod request;
pub mod thread;

pub use context::RequestContext;
pub use events::{ThreadItemUpdate, ThreadStreamEvent, STREAM_ERROR_CODE};
pub use ids::{generate_id, IdKind};
pub use items::{
    AssistantMessageContent, AssistantMessageItem, HiddenContextItem, InferenceOptions,
    ThreadItem, UserMessageContent, UserMessageInput, UserMessageItem, WidgetItem,
};
pub use page::{Cursor, CursorError, Page, SortOrder};
pub use request::{
    Action, AddUserMessageParams, ChatKitRequest, CreateThreadParams, CustomActionParams,
    ListItemsParams, ListParams, ThreadIdParams, UpdateThreadParams,
};
pub use thread::{Thread, ThreadMetadata, ThreadStatus};
