use chatkit_types::{Cursor, ThreadItem};

/// An item as committed to a thread log, with the cursor of its position.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub cursor: Cursor,
    pub item: ThreadItem,
}
