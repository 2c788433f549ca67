pub mod openai;
pub mod streaming;
pub mod traits;
pub mod types;

pub use openai::OpenAIClient;
pub use streaming::{parse_chat_sse_stream, ChatStreamChunk, EventStream, StreamEvent};
pub use traits::{ChatClient, ChatOptions, ChatRequest};
pub use types::Message;
