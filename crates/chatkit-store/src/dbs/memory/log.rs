use std::collections::HashMap;

use chatkit_types::{Cursor, ThreadItem, ThreadMetadata};

use crate::error::{Result, StoreError};
use crate::models::StoredItem;

/// One thread: its metadata plus the append-only item log.
pub(super) struct ThreadLog {
    pub(super) metadata: ThreadMetadata,
    items: Vec<ThreadItem>,
    // item id -> position in `items`
    positions: HashMap<String, usize>,
}

impl ThreadLog {
    pub(super) fn new(metadata: ThreadMetadata) -> Self {
        Self {
            metadata,
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub(super) fn items(&self) -> &[ThreadItem] {
        &self.items
    }

    pub(super) fn append(&mut self, item: ThreadItem) -> Result<StoredItem> {
        if item.thread_id() != self.metadata.id {
            return Err(StoreError::Validation(format!(
                "item {} belongs to thread {}, not {}",
                item.id(),
                item.thread_id(),
                self.metadata.id
            )));
        }
        if self.positions.contains_key(item.id()) {
            return Err(StoreError::Validation(format!(
                "item {} already exists in thread {}",
                item.id(),
                self.metadata.id
            )));
        }

        let position = self.items.len();
        self.positions.insert(item.id().to_string(), position);
        self.items.push(item.clone());

        Ok(StoredItem {
            cursor: Cursor::from_index(position),
            item,
        })
    }

    pub(super) fn get(&self, item_id: &str) -> Option<&ThreadItem> {
        self.positions.get(item_id).map(|&position| &self.items[position])
    }
}
