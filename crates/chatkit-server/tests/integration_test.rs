use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chatkit_agent::ScriptedRunner;
use chatkit_server::{build_router, AppState, ChatServer, Config};
use chatkit_store::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with(runner: ScriptedRunner, history_limit: usize) -> Router {
    let server = ChatServer::new(Arc::new(MemoryStore::new()), Arc::new(runner))
        .with_history_limit(history_limit);
    build_router(Arc::new(AppState::new(Config::default(), Some(server))))
}

fn app() -> (Router, ScriptedRunner) {
    let runner = ScriptedRunner::from_chunks(&["Hello", " there"]);
    (app_with(runner.clone(), 30), runner)
}

async fn post(app: &Router, body: Value) -> (StatusCode, Option<String>, Vec<u8>) {
    post_raw(app, body.to_string()).await
}

async fn post_raw(app: &Router, body: String) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chatkit")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-request-id", "req-test")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, bytes.to_vec())
}

fn sse_events(body: &[u8]) -> Vec<Value> {
    std::str::from_utf8(body)
        .unwrap()
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

fn types(events: &[Value]) -> Vec<&str> {
    events
        .iter()
        .map(|event| event["type"].as_str().unwrap())
        .collect()
}

fn user_input(text: &str) -> Value {
    json!({ "content": [{ "type": "input_text", "text": text }] })
}

async fn create_thread(app: &Router, text: &str) -> (String, Vec<Value>) {
    let (status, content_type, body) = post(
        app,
        json!({ "type": "threads.create", "params": { "input": user_input(text) } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/event-stream"));

    let events = sse_events(&body);
    let thread_id = events[0]["thread"]["id"].as_str().unwrap().to_string();
    (thread_id, events)
}

#[tokio::test]
async fn test_unconfigured_server_returns_503() {
    let app = build_router(Arc::new(AppState::new(Config::default(), None)));

    let (status, _, body) = post(
        &app,
        json!({ "type": "threads.list", "params": {} }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn test_malformed_requests_are_rejected() {
    let (app, runner) = app();

    let (status, _, _) = post_raw(&app, "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = post(&app, json!({ "type": "threads.delete", "params": {} })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = post(
        &app,
        json!({ "type": "threads.create", "params": { "input": user_input("   ") } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(runner.inputs().is_empty());
}

#[tokio::test]
async fn test_create_thread_streams_full_turn() {
    let (app, _runner) = app();

    let (thread_id, events) = create_thread(&app, "Hi").await;

    assert_eq!(
        types(&events),
        vec![
            "thread.created",
            "thread.item.done",
            "thread.item.added",
            "thread.item.updated",
            "thread.item.updated",
            "thread.item.updated",
            "thread.item.done",
        ]
    );
    assert!(thread_id.starts_with("thr_"));
    assert_eq!(events[1]["item"]["type"], "user_message");
    assert_eq!(events[4]["update"]["delta"], "Hello");
    assert_eq!(events[6]["item"]["type"], "assistant_message");
    assert_eq!(events[6]["item"]["content"][0]["text"], "Hello there");
}

#[tokio::test]
async fn test_add_message_to_unknown_thread_is_404() {
    let (app, runner) = app();

    let (status, _, body) = post(
        &app,
        json!({
            "type": "threads.add_user_message",
            "params": { "thread_id": "thr_missing", "input": user_input("hello") }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("thr_missing"));
    assert!(runner.inputs().is_empty());
}

#[tokio::test]
async fn test_history_is_recent_items_in_chronological_order() {
    let runner = ScriptedRunner::from_chunks(&["ok"]);
    let app = app_with(runner.clone(), 2);

    let (thread_id, _) = create_thread(&app, "first").await;
    let (status, _, _) = post(
        &app,
        json!({
            "type": "threads.add_user_message",
            "params": { "thread_id": thread_id, "input": user_input("second") }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let inputs = runner.inputs();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].messages.len(), 1);

    // stored: first, ok, second; only the two newest are sent, oldest first
    let second: Vec<&str> = inputs[1].messages.iter().map(|m| m.content()).collect();
    assert_eq!(second, vec!["ok", "second"]);
    assert_eq!(inputs[1].thread_id, thread_id);
}

#[tokio::test]
async fn test_items_list_pages_with_cursor() {
    let (app, _runner) = app();
    let (thread_id, _) = create_thread(&app, "Hi").await;

    let (status, content_type, body) = post(
        &app,
        json!({ "type": "items.list", "params": { "thread_id": thread_id, "limit": 1 } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("application/json"));
    let first: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(first["data"][0]["type"], "user_message");
    assert_eq!(first["has_more"], true);

    let (_, _, body) = post(
        &app,
        json!({
            "type": "items.list",
            "params": { "thread_id": thread_id, "limit": 1, "after": first["after"] }
        }),
    )
    .await;
    let second: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(second["data"][0]["type"], "assistant_message");
    assert_eq!(second["has_more"], false);

    let (_, _, body) = post(
        &app,
        json!({
            "type": "items.list",
            "params": { "thread_id": thread_id, "limit": 5, "order": "desc" }
        }),
    )
    .await;
    let desc: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(desc["data"][0]["type"], "assistant_message");
    assert_eq!(desc["data"][1]["type"], "user_message");
}

#[tokio::test]
async fn test_items_list_validates_parameters() {
    let (app, _runner) = app();
    let (thread_id, _) = create_thread(&app, "Hi").await;

    for params in [
        json!({ "thread_id": thread_id, "limit": 0 }),
        json!({ "thread_id": thread_id, "limit": -3 }),
        json!({ "thread_id": thread_id, "after": "not-a-cursor" }),
    ] {
        let (status, _, _) = post(&app, json!({ "type": "items.list", "params": params })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _, _) = post(
        &app,
        json!({ "type": "items.list", "params": { "thread_id": "thr_nope" } }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_update_and_list_threads() {
    let (app, _runner) = app();
    let (first_id, _) = create_thread(&app, "one").await;
    let (second_id, _) = create_thread(&app, "two").await;

    let (status, _, body) = post(
        &app,
        json!({ "type": "threads.get_by_id", "params": { "thread_id": first_id } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let thread: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(thread["id"], first_id.as_str());
    assert_eq!(thread["items"]["data"].as_array().unwrap().len(), 2);

    let (status, _, body) = post(
        &app,
        json!({
            "type": "threads.update",
            "params": { "thread_id": first_id, "title": "  Renamed  " }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated["title"], "Renamed");

    let (_, _, body) = post(&app, json!({ "type": "threads.list", "params": {} })).await;
    let threads: Value = serde_json::from_slice(&body).unwrap();
    let ids: Vec<&str> = threads["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    // newest first by default
    assert_eq!(ids, vec![second_id.as_str(), first_id.as_str()]);
    assert_eq!(threads["data"][1]["title"], "Renamed");
}

#[tokio::test]
async fn test_custom_action_streams_nothing() {
    let (app, runner) = app();
    let (thread_id, _) = create_thread(&app, "Hi").await;

    let (status, content_type, body) = post(
        &app,
        json!({
            "type": "threads.custom_action",
            "params": { "thread_id": thread_id, "action": { "type": "noop", "payload": {} } }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/event-stream"));
    assert!(sse_events(&body).is_empty());
    assert_eq!(runner.inputs().len(), 1);
}

#[tokio::test]
async fn test_agent_failure_is_terminal_error_event() {
    let app = app_with(ScriptedRunner::failing(&["par"], "upstream unavailable"), 30);

    let (thread_id, events) = create_thread(&app, "Hi").await;

    let last = events.last().unwrap();
    assert_eq!(last["type"], "error");
    assert_eq!(last["code"], "stream.error");
    assert_eq!(last["allow_retry"], false);
    assert_eq!(types(&events).iter().filter(|t| **t == "error").count(), 1);

    // only the user message was stored
    let (_, _, body) = post(
        &app,
        json!({ "type": "items.list", "params": { "thread_id": thread_id } }),
    )
    .await;
    let page: Value = serde_json::from_slice(&body).unwrap();
    let items = page["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "user_message");
}
