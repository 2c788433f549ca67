use chatkit_types::{Cursor, Page, SortOrder};

use crate::error::{Result, StoreError};

/// Paginate an append-only log held in memory.
///
/// `entries` must be in insertion order; an entry's cursor is its index, so
/// cursors stay valid while the log only grows. In `Asc` order the page
/// starts right after `after`, in `Desc` order right before it.
pub fn paginate<T: Clone>(
    entries: &[T],
    after: Option<Cursor>,
    limit: usize,
    order: SortOrder,
) -> Result<Page<T>> {
    if limit == 0 {
        return Err(StoreError::Validation(
            "limit must be a positive integer".to_string(),
        ));
    }

    let total = entries.len();
    let (start, end) = match order {
        SortOrder::Asc => {
            let start = after.map_or(0, |c| c.index().saturating_add(1));
            (start.min(total), total)
        }
        SortOrder::Desc => (0, after.map_or(total, |c| c.index().min(total))),
    };

    let window = &entries[start..end];
    let mut positioned: Vec<(usize, &T)> = match order {
        SortOrder::Asc => window
            .iter()
            .enumerate()
            .take(limit.saturating_add(1))
            .map(|(i, entry)| (start + i, entry))
            .collect(),
        SortOrder::Desc => window
            .iter()
            .enumerate()
            .rev()
            .take(limit.saturating_add(1))
            .map(|(i, entry)| (start + i, entry))
            .collect(),
    };

    let has_more = positioned.len() > limit;
    positioned.truncate(limit);

    Ok(Page {
        after: positioned.last().map(|(index, _)| Cursor::from_index(*index)),
        data: positioned.into_iter().map(|(_, entry)| entry.clone()).collect(),
        has_more,
    })
}
