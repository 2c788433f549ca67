use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use chatkit_llm::{ChatClient, ChatOptions, ChatRequest, Message, StreamEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::builder::AgentBuilder;
use crate::runner::AgentRunner;
use crate::types::{AgentConfig, AgentEvent, AgentInput};

/// Single-turn assistant backed by a streaming chat client.
pub struct Agent {
    client: Arc<dyn ChatClient>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(client: Arc<dyn ChatClient>, config: AgentConfig) -> Self {
        Self { client, config }
    }

    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn build_request(config: &AgentConfig, input: AgentInput) -> ChatRequest {
        let mut messages = Vec::with_capacity(input.messages.len() + 1);
        if !config.instructions.is_empty() {
            messages.push(Message::system(config.instructions.clone()));
        }
        messages.extend(input.messages);

        let mut options = ChatOptions::new();
        options.temperature = config.temperature;
        options.max_tokens = config.max_tokens;

        let model = input.model.unwrap_or_else(|| config.model.clone());
        ChatRequest::new(model, messages).with_options(options)
    }

    async fn execute(
        client: Arc<dyn ChatClient>,
        request: ChatRequest,
        event_tx: &mpsc::Sender<AgentEvent>,
    ) -> Result<()> {
        let mut stream = client.chat_stream(request).await?;

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Message { content } => {
                    event_tx.send(AgentEvent::MessageDelta { content }).await?;
                }
                StreamEvent::Done { finish_reason } => {
                    tracing::debug!(finish_reason = ?finish_reason, "Model stream finished");
                    event_tx.send(AgentEvent::MessageDone).await?;
                    return Ok(());
                }
            }
        }

        Err(anyhow!("model stream ended before completion"))
    }
}

impl AgentRunner for Agent {
    fn spawn_run(
        &self,
        input: AgentInput,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<AgentEvent> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);

        let client = Arc::clone(&self.client);
        let request = Self::build_request(&self.config, input);

        tokio::spawn(async move {
            let start_time = Instant::now();
            let run_id = uuid::Uuid::new_v4().to_string();

            if tx
                .send(AgentEvent::Started {
                    run_id: run_id.clone(),
                })
                .await
                .is_err()
            {
                return;
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(run_id = %run_id, "Agent run cancelled");
                    return;
                }
                result = Self::execute(client, request, &tx) => result,
            };

            let terminal = match result {
                Ok(()) => AgentEvent::Completed {
                    duration_ms: start_time.elapsed().as_millis() as u64,
                },
                Err(e) => {
                    tracing::warn!(run_id = %run_id, error = %e, "Agent run failed");
                    AgentEvent::Error {
                        message: e.to_string(),
                    }
                }
            };
            let _ = tx.send(terminal).await;
        });

        rx
    }
}
