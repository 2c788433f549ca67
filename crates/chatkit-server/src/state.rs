use std::sync::Arc;

use crate::config::Config;
use crate::error::ApiError;
use crate::server::ChatServer;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when startup could not wire the agent (no API key).
    pub chat_server: Option<Arc<ChatServer>>,
}

impl AppState {
    pub fn new(config: Config, chat_server: Option<ChatServer>) -> Self {
        Self {
            config: Arc::new(config),
            chat_server: chat_server.map(Arc::new),
        }
    }

    pub fn chat_server(&self) -> Result<Arc<ChatServer>, ApiError> {
        self.chat_server.clone().ok_or_else(|| {
            ApiError::Unavailable(
                "Chat dependencies are not configured. Set OPENAI_API_KEY and restart the server."
                    .to_string(),
            )
        })
    }
}
