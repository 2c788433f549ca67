use std::pin::Pin;
use std::sync::Arc;

use chatkit_store::Store;
use chatkit_types::{
    AssistantMessageContent, AssistantMessageItem, RequestContext, ThreadItem, ThreadItemUpdate,
    ThreadStreamEvent,
};
use futures::Stream;

use crate::runner::AgentRunner;
use crate::types::{AgentEvent, AgentInput, RunPhase};

/// Thread events relayed to the client, in emission order.
pub type EventStream = Pin<Box<dyn Stream<Item = ThreadStreamEvent> + Send>>;

/// Drive one agent run and translate its events into thread events.
///
/// Nothing runs until the returned stream is first polled. Each assistant
/// message is appended to `store` only once it is complete; a message cut
/// short by an error or cancellation is dropped. Dropping the stream or
/// cancelling `ctx` stops the run.
pub fn stream_agent_response(
    runner: Arc<dyn AgentRunner>,
    store: Arc<dyn Store>,
    input: AgentInput,
    ctx: RequestContext,
) -> EventStream {
    Box::pin(async_stream::stream! {
        let thread_id = input.thread_id.clone();
        let cancel = ctx.cancellation().child_token();
        let _stop_on_drop = cancel.clone().drop_guard();

        let mut events = runner.spawn_run(input, cancel.clone());
        let mut phase = RunPhase::Streaming;
        tracing::debug!(request_id = %ctx.request_id, thread_id = %thread_id, phase = %phase, "Agent run started");

        let mut draft: Option<AssistantMessageItem> = None;
        let mut text = String::new();

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    phase = RunPhase::Cancelled;
                    break;
                }
                event = events.recv() => event,
            };

            match event {
                Some(AgentEvent::Started { run_id }) => {
                    tracing::debug!(request_id = %ctx.request_id, run_id = %run_id, "Agent run acknowledged");
                }
                Some(AgentEvent::MessageDelta { content }) => {
                    let item_id = match draft.as_ref() {
                        Some(item) => item.id.clone(),
                        None => {
                            let item = AssistantMessageItem::new(&thread_id);
                            let item_id = item.id.clone();
                            yield ThreadStreamEvent::ThreadItemAdded { item: item.clone().into() };
                            yield ThreadStreamEvent::ThreadItemUpdated {
                                item_id: item_id.clone(),
                                update: ThreadItemUpdate::AssistantMessageContentPartAdded {
                                    content_index: 0,
                                    content: AssistantMessageContent::text(""),
                                },
                            };
                            draft = Some(item);
                            item_id
                        }
                    };

                    text.push_str(&content);
                    yield ThreadStreamEvent::ThreadItemUpdated {
                        item_id,
                        update: ThreadItemUpdate::AssistantMessageContentPartTextDelta {
                            content_index: 0,
                            delta: content,
                        },
                    };
                }
                Some(AgentEvent::MessageDone) => {
                    let item = match draft.take() {
                        Some(item) => item,
                        None => {
                            let item = AssistantMessageItem::new(&thread_id);
                            yield ThreadStreamEvent::ThreadItemAdded { item: item.clone().into() };
                            item
                        }
                    };
                    let item: ThreadItem = item.with_text(std::mem::take(&mut text)).into();

                    match store.add_thread_item(&thread_id, item.clone(), &ctx).await {
                        Ok(_) => yield ThreadStreamEvent::ThreadItemDone { item },
                        Err(e) => {
                            tracing::error!(request_id = %ctx.request_id, thread_id = %thread_id, error = %e, "Failed to store assistant message");
                            phase = RunPhase::Failed;
                            yield ThreadStreamEvent::error(format!("Failed to store assistant message: {}", e));
                            break;
                        }
                    }
                }
                Some(AgentEvent::Error { message }) => {
                    phase = RunPhase::Failed;
                    tracing::warn!(request_id = %ctx.request_id, thread_id = %thread_id, error = %message, "Agent run failed");
                    yield ThreadStreamEvent::error(message);
                    break;
                }
                Some(AgentEvent::Completed { duration_ms }) => {
                    if draft.is_some() {
                        phase = RunPhase::Failed;
                        yield ThreadStreamEvent::error("Agent run completed with an unfinished message");
                    } else {
                        phase = RunPhase::Completed;
                        tracing::debug!(request_id = %ctx.request_id, duration_ms, "Agent run reported completion");
                    }
                    break;
                }
                None => {
                    if draft.is_some() {
                        phase = RunPhase::Failed;
                        yield ThreadStreamEvent::error("Agent run ended unexpectedly");
                    } else {
                        phase = RunPhase::Completed;
                    }
                    break;
                }
            }
        }

        if phase == RunPhase::Cancelled && draft.is_some() {
            tracing::debug!(request_id = %ctx.request_id, thread_id = %thread_id, "Discarding unfinished assistant message");
        }
        tracing::info!(request_id = %ctx.request_id, thread_id = %thread_id, phase = %phase, "Agent run finished");
    })
}
