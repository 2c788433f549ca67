use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use chatkit_types::RequestContext;
use futures::StreamExt;

use crate::{error::ApiResult, server::ProcessResult, state::AppState};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Single ChatKit entrypoint.
///
/// Streaming requests answer with `text/event-stream`, one `data:` frame per
/// thread event; everything else answers with JSON. When the client goes
/// away the event stream is dropped, which cancels the agent run.
pub async fn chatkit_endpoint(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let server = state.chat_server()?;

    let ctx = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(RequestContext::with_request_id)
        .unwrap_or_default();

    match server.process(&body, ctx).await? {
        ProcessResult::Streaming(events) => {
            let frames = events.map(|event| Event::default().json_data(event));
            Ok(Sse::new(frames)
                .keep_alive(KeepAlive::default())
                .into_response())
        }
        ProcessResult::NonStreaming(value) => Ok(Json(value).into_response()),
    }
}
