//! Claude API client for product copy generation.
//!
//! Provides non-streaming access to the Anthropic Messages API.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::ClaudeConfig;

use super::error::ClaudeError;
use super::types::{ChatRequest, ChatResponse, Message};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// System prompt sent with every completion.
pub const SYSTEM_PROMPT: &str = "You are an experienced e-commerce copywriter and merchandiser \
helping manage a Shopify store. Answer with the requested content only, without preamble, \
quotation marks, or commentary.";

/// Claude API client.
///
/// Sends one user message per request and returns the concatenated text of
/// the reply.
#[derive(Clone)]
pub struct ClaudeClient {
    inner: Arc<ClaudeClientInner>,
}

struct ClaudeClientInner {
    client: reqwest::Client,
    api_url: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    /// Create a new Claude client.
    ///
    /// # Arguments
    ///
    /// * `config` - Claude API configuration containing API key and model
    ///
    /// # Errors
    ///
    /// Returns [`ClaudeError::InvalidConfig`] if the API key contains invalid
    /// header characters or the HTTP client cannot be built.
    pub fn new(config: &ClaudeConfig) -> Result<Self, ClaudeError> {
        Self::with_api_url(config, ANTHROPIC_API_URL)
    }

    /// Create a client that posts to a custom Messages endpoint.
    ///
    /// # Errors
    ///
    /// Same as [`ClaudeClient::new`].
    pub fn with_api_url(config: &ClaudeConfig, api_url: &str) -> Result<Self, ClaudeError> {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|_| ClaudeError::InvalidConfig("Invalid API key for header".to_string()))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ClaudeError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(ClaudeClientInner {
                client,
                api_url: api_url.to_string(),
                model: config.model.clone(),
                max_tokens: config.max_tokens,
            }),
        })
    }

    /// Send a chat request and get a complete response.
    ///
    /// # Arguments
    ///
    /// * `messages` - Conversation history
    /// * `system` - Optional system prompt
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, messages, system), fields(model = %self.inner.model))]
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
    ) -> Result<ChatResponse, ClaudeError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: self.inner.max_tokens,
            messages,
            system,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.api_url)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Ask for a single completion of `prompt` under the copywriting system
    /// prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, prompt), fields(model = %self.inner.model, prompt_len = prompt.len()))]
    pub async fn complete(&self, prompt: &str) -> Result<String, ClaudeError> {
        let response = self
            .chat(vec![Message::user(prompt)], Some(SYSTEM_PROMPT.to_string()))
            .await?;

        tracing::debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "Completion received"
        );

        Ok(response.text())
    }

    /// Handle a successful response.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ChatResponse, ClaudeError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| ClaudeError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(self.handle_error_status(status, response).await)
        }
    }

    /// Map a failed status to a [`ClaudeError`].
    async fn handle_error_status(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ClaudeError {
        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60);
                ClaudeError::RateLimited(retry_after)
            }
            401 => ClaudeError::Unauthorized("Invalid API key".to_string()),
            529 => ClaudeError::Overloaded,
            _ => match response.text().await {
                Ok(body) => ClaudeError::from_body(body),
                Err(e) => ClaudeError::Http(e),
            },
        }
    }
}
