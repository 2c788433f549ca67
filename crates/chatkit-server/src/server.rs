use std::sync::Arc;

use chatkit_agent::{stream_agent_response, to_agent_input, AgentInput, AgentRunner, EventStream, RunPhase};
use chatkit_store::Store;
use chatkit_types::{
    generate_id, AddUserMessageParams, ChatKitRequest, Cursor, CustomActionParams, IdKind,
    ListItemsParams, ListParams, RequestContext, SortOrder, Thread, ThreadItem, ThreadMetadata,
    ThreadStatus, ThreadStreamEvent, UpdateThreadParams, UserMessageInput, UserMessageItem,
};
use futures::StreamExt;

use crate::error::ServerError;

/// Items handed to the model on each turn.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;
/// Page size when a list request does not name one.
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Outcome of [`ChatServer::process`].
pub enum ProcessResult {
    /// Relay as `text/event-stream`, one frame per event
    Streaming(EventStream),
    /// Return as a single JSON document
    NonStreaming(serde_json::Value),
}

/// Dispatches ChatKit requests against a store and an agent runner.
#[derive(Clone)]
pub struct ChatServer {
    store: Arc<dyn Store>,
    runner: Arc<dyn AgentRunner>,
    history_limit: usize,
}

impl ChatServer {
    pub fn new(store: Arc<dyn Store>, runner: Arc<dyn AgentRunner>) -> Self {
        Self {
            store,
            runner,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Parse and execute one request.
    ///
    /// Malformed payloads, bad pagination parameters and unknown threads are
    /// rejected here, before any event is streamed.
    pub async fn process(
        &self,
        payload: &[u8],
        ctx: RequestContext,
    ) -> Result<ProcessResult, ServerError> {
        let request: ChatKitRequest = serde_json::from_slice(payload)
            .map_err(|e| ServerError::Validation(format!("Invalid request payload: {}", e)))?;

        tracing::info!(
            request_id = %ctx.request_id,
            kind = request.kind(),
            phase = %RunPhase::Received,
            "Processing request"
        );

        match request {
            ChatKitRequest::CreateThread { params } => {
                self.create_thread(params.input, ctx).map(ProcessResult::Streaming)
            }
            ChatKitRequest::AddUserMessage { params } => self
                .add_user_message(params, ctx)
                .await
                .map(ProcessResult::Streaming),
            ChatKitRequest::CustomAction { params } => self
                .custom_action(params, ctx)
                .await
                .map(ProcessResult::Streaming),
            ChatKitRequest::GetThread { params } => {
                let thread = self.get_thread(&params.thread_id, &ctx).await?;
                Ok(ProcessResult::NonStreaming(serde_json::to_value(thread)?))
            }
            ChatKitRequest::ListThreads { params } => {
                let (after, limit, order) = page_params(&params, SortOrder::Desc)?;
                let page = self.store.load_threads(after, limit, order, &ctx).await?;
                Ok(ProcessResult::NonStreaming(serde_json::to_value(page)?))
            }
            ChatKitRequest::ListItems { params } => {
                let page = self.list_items(params, &ctx).await?;
                Ok(ProcessResult::NonStreaming(serde_json::to_value(page)?))
            }
            ChatKitRequest::UpdateThread { params } => {
                let thread = self.update_thread(params, &ctx).await?;
                Ok(ProcessResult::NonStreaming(serde_json::to_value(thread)?))
            }
        }
    }

    fn create_thread(
        &self,
        input: UserMessageInput,
        ctx: RequestContext,
    ) -> Result<EventStream, ServerError> {
        validate_input(&input)?;

        let thread = ThreadMetadata::new(generate_id(IdKind::Thread));
        let this = self.clone();

        Ok(Box::pin(async_stream::stream! {
            if let Err(e) = this.store.save_thread(&thread, &ctx).await {
                tracing::error!(request_id = %ctx.request_id, error = %e, "Failed to create thread");
                yield ThreadStreamEvent::error(format!("Failed to create thread: {}", e));
                return;
            }
            tracing::info!(request_id = %ctx.request_id, thread_id = %thread.id, "Thread created");
            yield ThreadStreamEvent::ThreadCreated { thread: thread.clone() };

            let mut events = this.user_message_stream(thread, input, ctx);
            while let Some(event) = events.next().await {
                yield event;
            }
        }))
    }

    async fn add_user_message(
        &self,
        params: AddUserMessageParams,
        ctx: RequestContext,
    ) -> Result<EventStream, ServerError> {
        validate_input(&params.input)?;

        let thread = self.store.load_thread(&params.thread_id, &ctx).await?;
        if thread.status != ThreadStatus::Active {
            return Err(ServerError::Validation(format!(
                "Thread {} does not accept new messages",
                thread.id
            )));
        }

        Ok(self.user_message_stream(thread, params.input, ctx))
    }

    async fn custom_action(
        &self,
        params: CustomActionParams,
        ctx: RequestContext,
    ) -> Result<EventStream, ServerError> {
        self.store.load_thread(&params.thread_id, &ctx).await?;
        if let Some(item_id) = &params.item_id {
            self.store.load_item(&params.thread_id, item_id, &ctx).await?;
        }

        // Actions are accepted but have no handlers; nothing is emitted.
        tracing::debug!(
            request_id = %ctx.request_id,
            thread_id = %params.thread_id,
            action = %params.action.action_type,
            "Custom action ignored"
        );
        Ok(Box::pin(futures::stream::empty()))
    }

    async fn get_thread(
        &self,
        thread_id: &str,
        ctx: &RequestContext,
    ) -> Result<Thread, ServerError> {
        let metadata = self.store.load_thread(thread_id, ctx).await?;
        let items = self
            .store
            .load_thread_items(thread_id, None, DEFAULT_PAGE_SIZE, SortOrder::Asc, ctx)
            .await?;

        Ok(Thread { metadata, items })
    }

    async fn list_items(
        &self,
        params: ListItemsParams,
        ctx: &RequestContext,
    ) -> Result<chatkit_types::Page<ThreadItem>, ServerError> {
        let (after, limit, order) = page_params(&params.page, SortOrder::Asc)?;
        self.store.load_thread(&params.thread_id, ctx).await?;

        Ok(self
            .store
            .load_thread_items(&params.thread_id, after, limit, order, ctx)
            .await?)
    }

    async fn update_thread(
        &self,
        params: UpdateThreadParams,
        ctx: &RequestContext,
    ) -> Result<ThreadMetadata, ServerError> {
        let title = params.title.trim();
        if title.is_empty() {
            return Err(ServerError::Validation("title cannot be empty".to_string()));
        }

        let thread = self
            .store
            .load_thread(&params.thread_id, ctx)
            .await?
            .with_title(title);
        self.store.save_thread(&thread, ctx).await?;

        Ok(thread)
    }

    /// Store the user's message, then answer it.
    fn user_message_stream(
        &self,
        thread: ThreadMetadata,
        input: UserMessageInput,
        ctx: RequestContext,
    ) -> EventStream {
        let this = self.clone();

        Box::pin(async_stream::stream! {
            let model = input.inference_options.model.clone();
            let item: ThreadItem = UserMessageItem::from_input(&thread.id, input).into();

            if let Err(e) = this.store.add_thread_item(&thread.id, item.clone(), &ctx).await {
                tracing::error!(request_id = %ctx.request_id, thread_id = %thread.id, error = %e, "Failed to store user message");
                yield ThreadStreamEvent::error(format!("Failed to store message: {}", e));
                return;
            }
            yield ThreadStreamEvent::ThreadItemDone { item };

            let mut events = this.respond(thread, model, ctx);
            while let Some(event) = events.next().await {
                yield event;
            }
        })
    }

    /// Run the agent over the most recent history of `thread`.
    fn respond(
        &self,
        thread: ThreadMetadata,
        model: Option<String>,
        ctx: RequestContext,
    ) -> EventStream {
        let this = self.clone();

        Box::pin(async_stream::stream! {
            let page = match this
                .store
                .load_thread_items(&thread.id, None, this.history_limit, SortOrder::Desc, &ctx)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(request_id = %ctx.request_id, thread_id = %thread.id, error = %e, "Failed to load history");
                    yield ThreadStreamEvent::error(format!("Failed to load history: {}", e));
                    return;
                }
            };

            let mut history = page.data;
            history.reverse();
            tracing::debug!(
                request_id = %ctx.request_id,
                thread_id = %thread.id,
                items = history.len(),
                phase = %RunPhase::HistoryLoaded,
                "History loaded"
            );

            let input = AgentInput::new(thread.id.clone(), to_agent_input(&history)).with_model(model);
            let mut events = stream_agent_response(
                Arc::clone(&this.runner),
                Arc::clone(&this.store),
                input,
                ctx,
            );
            while let Some(event) = events.next().await {
                yield event;
            }
        })
    }
}

fn validate_input(input: &UserMessageInput) -> Result<(), ServerError> {
    if input.is_blank() {
        return Err(ServerError::Validation(
            "message input cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Turn wire pagination parameters into store arguments.
fn page_params(
    params: &ListParams,
    default_order: SortOrder,
) -> Result<(Option<Cursor>, usize, SortOrder), ServerError> {
    let limit = match params.limit {
        None => DEFAULT_PAGE_SIZE,
        Some(limit) if limit <= 0 => {
            return Err(ServerError::Validation(
                "limit must be a positive integer".to_string(),
            ))
        }
        Some(limit) => usize::try_from(limit).unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE),
    };

    let after = params
        .after
        .as_deref()
        .map(str::parse::<Cursor>)
        .transpose()
        .map_err(|e| ServerError::Validation(e.to_string()))?;

    Ok((after, limit, params.order.unwrap_or(default_order)))
}
