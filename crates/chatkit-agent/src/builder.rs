use std::sync::Arc;

use anyhow::{anyhow, Result};
use chatkit_llm::{ChatClient, OpenAIClient};

use crate::agent::Agent;
use crate::types::AgentConfig;

/// Builder for constructing an [`Agent`]
pub struct AgentBuilder {
    client: Option<Arc<dyn ChatClient>>,
    config: AgentConfig,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            config: AgentConfig::default(),
        }
    }

    pub fn client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Use the OpenAI client, optionally against a compatible base URL.
    pub fn openai(mut self, api_key: impl Into<String>, base_url: Option<&str>) -> Result<Self> {
        let mut client = OpenAIClient::new(api_key)?;
        if let Some(base_url) = base_url {
            client = client.with_base_url(base_url);
        }
        self.client = Some(Arc::new(client));
        Ok(self)
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let client = self
            .client
            .ok_or_else(|| anyhow!("Chat client is required"))?;

        Ok(Agent::new(client, self.config))
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
