//! Text completion seam between the field generator and a language model.

use async_trait::async_trait;
use thiserror::Error;

use crate::claude::{ClaudeClient, ClaudeError};

/// Errors from a text completion backend.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The Claude API call failed.
    #[error("Claude error: {0}")]
    Claude(#[from] ClaudeError),

    /// Any other backend failure.
    #[error("{0}")]
    Other(String),
}

/// Something that turns a prompt into free text.
///
/// Replies are untrusted: callers post-process and validate them.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    /// Complete a single prompt. An empty reply is not an error here.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[async_trait]
impl TextCompleter for ClaudeClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        Ok(Self::complete(self, prompt).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ClaudeConfig;

    #[tokio::test]
    async fn test_claude_client_as_completer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "model": "claude-sonnet-4-20250514",
                "stop_reason": "end_turn",
                "content": [{"type": "text", "text": "Widgets"}],
                "usage": {"input_tokens": 5, "output_tokens": 1}
            })))
            .mount(&server)
            .await;

        let config = ClaudeConfig {
            api_key: SecretString::from("sk-ant-test-key"),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 256,
        };
        let client = ClaudeClient::with_api_url(&config, &server.uri()).unwrap();
        let completer: &dyn TextCompleter = &client;

        assert_eq!(completer.complete("type?").await.unwrap(), "Widgets");
    }

    #[tokio::test]
    async fn test_claude_failure_is_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let config = ClaudeConfig {
            api_key: SecretString::from("sk-ant-test-key"),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 256,
        };
        let client = ClaudeClient::with_api_url(&config, &server.uri()).unwrap();
        let err = TextCompleter::complete(&client, "type?").await.unwrap_err();

        assert!(matches!(err, CompletionError::Claude(ClaudeError::Unauthorized(_))));
    }
}
