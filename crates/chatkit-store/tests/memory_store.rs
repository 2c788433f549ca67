use std::collections::HashSet;
use std::sync::Arc;

use chatkit_store::{MemoryStore, Store, StoreError};
use chatkit_types::{
    AssistantMessageItem, Cursor, RequestContext, SortOrder, ThreadItem, ThreadMetadata,
    UserMessageInput, UserMessageItem,
};

fn ctx() -> RequestContext {
    RequestContext::with_request_id("test")
}

fn message(thread_id: &str, text: &str) -> ThreadItem {
    AssistantMessageItem::new(thread_id).with_text(text).into()
}

fn texts(items: &[ThreadItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            ThreadItem::AssistantMessage(m) => m.text(),
            ThreadItem::UserMessage(m) => m.text(),
            other => other.id().to_string(),
        })
        .collect()
}

async fn store_with_thread(thread_id: &str) -> MemoryStore {
    let store = MemoryStore::new();
    store
        .save_thread(&ThreadMetadata::new(thread_id), &ctx())
        .await
        .unwrap();
    store
}

async fn append_all(store: &MemoryStore, thread_id: &str, labels: &[&str]) {
    for label in labels {
        store
            .add_thread_item(thread_id, message(thread_id, label), &ctx())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_load_returns_appends_in_order() {
    let store = store_with_thread("t").await;
    let labels: Vec<String> = (0..7).map(|i| format!("m{i}")).collect();
    let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    append_all(&store, "t", &refs).await;

    let page = store
        .load_thread_items("t", None, 7, SortOrder::Asc, &ctx())
        .await
        .unwrap();

    assert_eq!(texts(&page.data), labels);
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_desc_pagination_example() {
    let store = store_with_thread("t").await;
    append_all(&store, "t", &["A", "B", "C"]).await;

    let first = store
        .load_thread_items("t", None, 2, SortOrder::Desc, &ctx())
        .await
        .unwrap();
    assert_eq!(texts(&first.data), vec!["C", "B"]);
    assert!(first.has_more);

    let second = store
        .load_thread_items("t", first.after, 2, SortOrder::Desc, &ctx())
        .await
        .unwrap();
    assert_eq!(texts(&second.data), vec!["A"]);
    assert!(!second.has_more);
}

#[tokio::test]
async fn test_cursor_chaining_covers_everything_once() {
    let store = store_with_thread("t").await;
    let labels: Vec<String> = (0..11).map(|i| format!("m{i}")).collect();
    let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    append_all(&store, "t", &refs).await;

    for limit in 1..=12 {
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let mut seen = Vec::new();
            let mut after: Option<Cursor> = None;
            loop {
                let page = store
                    .load_thread_items("t", after, limit, order, &ctx())
                    .await
                    .unwrap();
                assert!(page.len() <= limit);
                seen.extend(texts(&page.data));
                if !page.has_more {
                    break;
                }
                after = page.after;
            }

            let mut expected = labels.clone();
            if order == SortOrder::Desc {
                expected.reverse();
            }
            assert_eq!(seen, expected, "limit={limit} order={order:?}");
        }
    }
}

#[tokio::test]
async fn test_repeated_query_is_stable_until_append() {
    let store = store_with_thread("t").await;
    append_all(&store, "t", &["A", "B", "C"]).await;

    let first = store
        .load_thread_items("t", Some(Cursor::new(0)), 5, SortOrder::Asc, &ctx())
        .await
        .unwrap();
    let again = store
        .load_thread_items("t", Some(Cursor::new(0)), 5, SortOrder::Asc, &ctx())
        .await
        .unwrap();
    assert_eq!(first, again);

    append_all(&store, "t", &["D"]).await;
    let grown = store
        .load_thread_items("t", Some(Cursor::new(0)), 5, SortOrder::Asc, &ctx())
        .await
        .unwrap();
    assert_eq!(texts(&grown.data), vec!["B", "C", "D"]);
}

#[tokio::test]
async fn test_threads_do_not_cross_contaminate() {
    let store = MemoryStore::new();
    for id in ["T1", "T2"] {
        store.save_thread(&ThreadMetadata::new(id), &ctx()).await.unwrap();
    }
    append_all(&store, "T1", &["one", "two"]).await;
    append_all(&store, "T2", &["three"]).await;

    let t1 = store
        .load_thread_items("T1", None, 10, SortOrder::Asc, &ctx())
        .await
        .unwrap();
    assert_eq!(texts(&t1.data), vec!["one", "two"]);
    assert!(t1.data.iter().all(|item| item.thread_id() == "T1"));

    let t2 = store
        .load_thread_items("T2", None, 10, SortOrder::Asc, &ctx())
        .await
        .unwrap();
    assert_eq!(texts(&t2.data), vec!["three"]);
}

#[tokio::test]
async fn test_empty_and_unknown_threads_return_empty_pages() {
    let store = store_with_thread("empty").await;

    for thread_id in ["empty", "missing"] {
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let page = store
                .load_thread_items(thread_id, None, 10, order, &ctx())
                .await
                .unwrap();
            assert!(page.is_empty());
            assert!(!page.has_more);
            assert_eq!(page.after, None);
        }
    }
}

#[tokio::test]
async fn test_zero_limit_is_a_validation_error() {
    let store = store_with_thread("t").await;

    for thread_id in ["t", "missing"] {
        let err = store
            .load_thread_items(thread_id, None, 0, SortOrder::Asc, &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}

#[tokio::test]
async fn test_append_to_unknown_thread_fails() {
    let store = MemoryStore::new();

    let err = store
        .add_thread_item("ghost", message("ghost", "hello"), &ctx())
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::ThreadNotFound("ghost".to_string()));
    assert!(err.is_not_found());
    assert_eq!(store.thread_count().await, 0);
}

#[tokio::test]
async fn test_append_returns_cursor_and_item_is_loadable() {
    let store = store_with_thread("t").await;
    let item: ThreadItem =
        UserMessageItem::from_input("t", UserMessageInput::text("hello")).into();

    let stored = store.add_thread_item("t", item.clone(), &ctx()).await.unwrap();
    assert_eq!(stored.cursor, Cursor::new(0));
    assert_eq!(stored.item, item);

    let loaded = store.load_item("t", item.id(), &ctx()).await.unwrap();
    assert_eq!(loaded, item);

    let missing = store.load_item("t", "msg_nope", &ctx()).await.unwrap_err();
    assert_eq!(missing, StoreError::ItemNotFound("msg_nope".to_string()));
}

#[tokio::test]
async fn test_save_thread_updates_metadata_and_keeps_items() {
    let store = store_with_thread("t").await;
    append_all(&store, "t", &["A"]).await;

    let renamed = ThreadMetadata::new("t").with_title("Renamed");
    store.save_thread(&renamed, &ctx()).await.unwrap();

    let loaded = store.load_thread("t", &ctx()).await.unwrap();
    assert_eq!(loaded.title.as_deref(), Some("Renamed"));
    assert_eq!(store.thread_count().await, 1);

    let items = store
        .load_thread_items("t", None, 10, SortOrder::Asc, &ctx())
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_load_unknown_thread_is_not_found() {
    let store = MemoryStore::new();
    let err = store.load_thread("nope", &ctx()).await.unwrap_err();
    assert_eq!(err, StoreError::ThreadNotFound("nope".to_string()));
}

#[tokio::test]
async fn test_load_threads_in_creation_order() {
    let store = MemoryStore::new();
    for id in ["a", "b", "c"] {
        store.save_thread(&ThreadMetadata::new(id), &ctx()).await.unwrap();
    }

    let asc = store
        .load_threads(None, 2, SortOrder::Asc, &ctx())
        .await
        .unwrap();
    let ids: Vec<&str> = asc.data.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(asc.has_more);

    let rest = store
        .load_threads(asc.after, 2, SortOrder::Asc, &ctx())
        .await
        .unwrap();
    let ids: Vec<&str> = rest.data.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["c"]);
    assert!(!rest.has_more);

    let desc = store
        .load_threads(None, 3, SortOrder::Desc, &ctx())
        .await
        .unwrap();
    let ids: Vec<&str> = desc.data.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_are_linearized() {
    let store = Arc::new(store_with_thread("t").await);
    let writers = 8;
    let per_writer = 25;

    let handles: Vec<_> = (0..writers)
        .map(|w| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut cursors = Vec::new();
                for i in 0..per_writer {
                    let stored = store
                        .add_thread_item("t", message("t", &format!("w{w}-{i}")), &ctx())
                        .await
                        .unwrap();
                    cursors.push(stored.cursor);
                }
                cursors
            })
        })
        .collect();

    let mut all_cursors = HashSet::new();
    for result in futures::future::join_all(handles).await {
        let cursors = result.unwrap();
        // Each writer observes its own appends in increasing order.
        assert!(cursors.windows(2).all(|pair| pair[0] < pair[1]));
        all_cursors.extend(cursors);
    }

    let total = writers * per_writer;
    assert_eq!(all_cursors.len(), total);

    let page = store
        .load_thread_items("t", None, total, SortOrder::Asc, &ctx())
        .await
        .unwrap();
    assert_eq!(page.len(), total);
    assert!(!page.has_more);

    // Per-writer order is preserved in the global log.
    for w in 0..writers {
        let prefix = format!("w{w}-");
        let own: Vec<String> = texts(&page.data)
            .into_iter()
            .filter(|text| text.starts_with(&prefix))
            .collect();
        let expected: Vec<String> = (0..per_writer).map(|i| format!("w{w}-{i}")).collect();
        assert_eq!(own, expected);
    }
}
