use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chatkit_types::{Cursor, Page, RequestContext, SortOrder, ThreadItem, ThreadMetadata};
use tokio::sync::RwLock;

use super::log::ThreadLog;
use crate::error::{Result, StoreError};
use crate::models::StoredItem;
use crate::pagination::paginate;
use crate::trait_store::Store;

#[derive(Default)]
struct Threads {
    logs: HashMap<String, Arc<RwLock<ThreadLog>>>,
    // thread ids in creation order
    order: Vec<String>,
}

/// In-memory store, one lock per thread.
///
/// The outer lock only guards the thread index and is released before any
/// per-thread lock is awaited, so a slow reader of one thread never blocks
/// appends to another.
#[derive(Default)]
pub struct MemoryStore {
    threads: RwLock<Threads>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn thread_log(&self, thread_id: &str) -> Option<Arc<RwLock<ThreadLog>>> {
        self.threads.read().await.logs.get(thread_id).cloned()
    }

    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.order.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save_thread(&self, thread: &ThreadMetadata, ctx: &RequestContext) -> Result<()> {
        if let Some(log) = self.thread_log(&thread.id).await {
            log.write().await.metadata = thread.clone();
            tracing::debug!(request_id = %ctx.request_id, thread_id = %thread.id, "Thread updated");
            return Ok(());
        }

        let mut threads = self.threads.write().await;
        let existing = threads.logs.get(&thread.id).cloned();
        match existing {
            // Lost a race with a concurrent first save; fall back to an update.
            Some(log) => {
                drop(threads);
                log.write().await.metadata = thread.clone();
            }
            None => {
                threads.logs.insert(
                    thread.id.clone(),
                    Arc::new(RwLock::new(ThreadLog::new(thread.clone()))),
                );
                threads.order.push(thread.id.clone());
                tracing::debug!(request_id = %ctx.request_id, thread_id = %thread.id, "Thread created");
            }
        }
        Ok(())
    }

    async fn load_thread(&self, thread_id: &str, _ctx: &RequestContext) -> Result<ThreadMetadata> {
        let log = self
            .thread_log(thread_id)
            .await
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))?;
        let metadata = log.read().await.metadata.clone();
        Ok(metadata)
    }

    async fn load_threads(
        &self,
        after: Option<Cursor>,
        limit: usize,
        order: SortOrder,
        _ctx: &RequestContext,
    ) -> Result<Page<ThreadMetadata>> {
        let page = {
            let threads = self.threads.read().await;
            paginate(&threads.order, after, limit, order)?
                .map(|id| threads.logs.get(&id).cloned())
        };

        let mut data = Vec::with_capacity(page.data.len());
        for log in page.data.iter().flatten() {
            data.push(log.read().await.metadata.clone());
        }

        Ok(Page {
            data,
            has_more: page.has_more,
            after: page.after,
        })
    }

    async fn load_thread_items(
        &self,
        thread_id: &str,
        after: Option<Cursor>,
        limit: usize,
        order: SortOrder,
        _ctx: &RequestContext,
    ) -> Result<Page<ThreadItem>> {
        let Some(log) = self.thread_log(thread_id).await else {
            // Validate even when there is nothing to read.
            paginate::<ThreadItem>(&[], after, limit, order)?;
            return Ok(Page::empty());
        };

        let log = log.read().await;
        paginate(log.items(), after, limit, order)
    }

    async fn add_thread_item(
        &self,
        thread_id: &str,
        item: ThreadItem,
        ctx: &RequestContext,
    ) -> Result<StoredItem> {
        let log = self
            .thread_log(thread_id)
            .await
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))?;

        let stored = log.write().await.append(item)?;
        tracing::debug!(
            request_id = %ctx.request_id,
            thread_id = %thread_id,
            item_id = %stored.item.id(),
            kind = stored.item.kind(),
            cursor = %stored.cursor,
            "Item appended"
        );
        Ok(stored)
    }

    async fn load_item(
        &self,
        thread_id: &str,
        item_id: &str,
        _ctx: &RequestContext,
    ) -> Result<ThreadItem> {
        let log = self
            .thread_log(thread_id)
            .await
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))?;

        let log = log.read().await;
        log.get(item_id)
            .cloned()
            .ok_or_else(|| StoreError::ItemNotFound(item_id.to_string()))
    }
}
