use async_trait::async_trait;
use chatkit_types::{Cursor, Page, RequestContext, SortOrder, ThreadItem, ThreadMetadata};

use crate::error::Result;
use crate::models::StoredItem;

/// Storage contract for threads and their item logs.
///
/// Item logs are append-only: once `add_thread_item` returns, the item and its
/// position never change. Implementations must linearize concurrent appends to
/// the same thread and hand out strictly increasing positions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or replace thread metadata. The first save creates an empty item log.
    async fn save_thread(&self, thread: &ThreadMetadata, ctx: &RequestContext) -> Result<()>;

    /// Load thread metadata, failing with `ThreadNotFound` for unknown ids.
    async fn load_thread(&self, thread_id: &str, ctx: &RequestContext) -> Result<ThreadMetadata>;

    /// Page through threads in creation order.
    async fn load_threads(
        &self,
        after: Option<Cursor>,
        limit: usize,
        order: SortOrder,
        ctx: &RequestContext,
    ) -> Result<Page<ThreadMetadata>>;

    /// Page through a thread's items in insertion order.
    ///
    /// With `Asc`, returns items positioned after `after` (or from the start);
    /// with `Desc`, items positioned before `after` (or from the end). An
    /// unknown thread yields an empty page. `limit` must be positive.
    async fn load_thread_items(
        &self,
        thread_id: &str,
        after: Option<Cursor>,
        limit: usize,
        order: SortOrder,
        ctx: &RequestContext,
    ) -> Result<Page<ThreadItem>>;

    /// Append a fully formed item to the end of a thread's log.
    ///
    /// Fails with `ThreadNotFound` if the thread was never saved.
    async fn add_thread_item(
        &self,
        thread_id: &str,
        item: ThreadItem,
        ctx: &RequestContext,
    ) -> Result<StoredItem>;

    /// Load a single item by id.
    async fn load_item(
        &self,
        thread_id: &str,
        item_id: &str,
        ctx: &RequestContext,
    ) -> Result<ThreadItem>;
}
