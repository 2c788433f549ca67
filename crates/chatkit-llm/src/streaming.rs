use std::collections::VecDeque;
use std::pin::Pin;

use anyhow::Result;
use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::{Deserialize, Serialize};

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Text delta for the assistant message
    Message { content: String },

    /// The completion finished; nothing else follows
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    pub index: u32,
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl ChatStreamChunk {
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }

    fn to_stream_events(&self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(choice) = self.choices.first() {
            if let Some(content) = &choice.delta.content {
                if !content.is_empty() {
                    events.push(StreamEvent::Message {
                        content: content.clone(),
                    });
                }
            }

            if let Some(finish_reason) = &choice.finish_reason {
                events.push(StreamEvent::Done {
                    finish_reason: Some(finish_reason.clone()),
                });
            }
        }

        events
    }
}

/// Parse a chat-completions SSE response into stream events.
pub fn parse_chat_sse_stream(response: Response) -> EventStream {
    parse_sse_bytes(response.bytes_stream())
}

/// Parse raw SSE bytes. Exactly one `Done` is emitted, either for the first
/// `finish_reason` or for the `[DONE]` sentinel, whichever comes first.
pub fn parse_sse_bytes<S, B, E>(stream: S) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer: VecDeque<u8> = VecDeque::with_capacity(8192);

        'read: while let Some(chunk_result) = byte_chunks.next().await {
            let bytes = match chunk_result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    break;
                }
            };
            buffer.extend(bytes.as_ref());

            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                let Ok(line) = std::str::from_utf8(&line_bytes) else {
                    continue;
                };
                let Some(data) = line.trim().strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim_start();

                if data == "[DONE]" {
                    yield Ok(StreamEvent::Done { finish_reason: None });
                    break 'read;
                }

                match serde_json::from_str::<ChatStreamChunk>(data) {
                    Ok(chunk) => {
                        for event in chunk.to_stream_events() {
                            let done = matches!(event, StreamEvent::Done { .. });
                            yield Ok(event);
                            if done {
                                break 'read;
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(anyhow::anyhow!("Failed to parse chat chunk: {}", e));
                        break 'read;
                    }
                }
            }
        }
    })
}
