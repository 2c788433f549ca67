// OpenAI chat-completions client

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};

use crate::streaming::{parse_chat_sse_stream, EventStream};
use crate::traits::{ChatClient, ChatOptions, ChatRequest};
use crate::types::Message;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI client (HTTP direct, no SDK)
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
        })
    }

    /// Point the client at a compatible server (proxies, local gateways, test doubles).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_chat_request(
        &self,
        model: &str,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<Value> {
        let mut request = json!({
            "model": model,
            "messages": serde_json::to_value(messages)?,
            "stream": true,
        });

        if let Some(obj) = request.as_object_mut() {
            // o-series and gpt-5 models reject temperature and rename max_tokens
            let is_reasoning_model = model.starts_with('o') || model.starts_with("gpt-5");

            if let Some(temp) = options.temperature {
                if !is_reasoning_model {
                    obj.insert("temperature".to_string(), json!(temp));
                }
            }
            if let Some(max_tokens) = options.max_tokens {
                let token_field = if is_reasoning_model {
                    "max_completion_tokens"
                } else {
                    "max_tokens"
                };
                obj.insert(token_field.to_string(), json!(max_tokens));
            }
        }

        Ok(request)
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        let body = self.build_chat_request(&request.model, &request.messages, &request.options)?;
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(model = %request.model, messages = request.messages.len(), "Starting chat completion stream");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send chat request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("OpenAI API error ({}): {}", status, error_text);
        }

        Ok(parse_chat_sse_stream(response))
    }
}
