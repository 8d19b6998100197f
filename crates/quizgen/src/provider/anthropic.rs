//! Anthropic messages adapter
//!
//! Instructions and prompt travel together in a single user message; the
//! request always carries `max_tokens` because the API requires it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QuizError, Result};
use crate::provider::http::{ErrorDetails, read_response, transport_error};
use crate::provider::{CompletionRequest, ProviderAdapter, ProviderKind, require_api_key};

const API_VERSION: &str = "2023-06-01";

/// Messages API request
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// Messages API response
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

fn is_context_overflow(details: &ErrorDetails) -> bool {
    details.kind_is("request_too_large") || details.message_contains("prompt is too long")
}

/// Anthropic adapter
#[derive(Debug, Clone)]
pub struct AnthropicAdapter {
    client: Client,
    base_url: String,
}

impl AnthropicAdapter {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";

    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(request: &CompletionRequest<'_>) -> MessagesRequest {
        MessagesRequest {
            model: request.model.to_string(),
            max_tokens: request.max_output_tokens,
            messages: vec![Message {
                role: "user",
                content: format!("{}\n\n{}", request.system, request.user),
            }],
        }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn call(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let api_key = require_api_key(ProviderKind::Anthropic, request)?;
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        debug!(provider = "anthropic", model = %request.model, "Calling messages API at: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&Self::build_request(request))
            .send()
            .await
            .map_err(|e| transport_error(self.name(), e))?;

        let message: MessagesResponse =
            read_response(self.name(), response, is_context_overflow).await?;

        let text: String = message
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(QuizError::MalformedResponse(
                "anthropic returned no text content".to_string(),
            ));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(api_key: Option<&str>) -> CompletionRequest<'_> {
        CompletionRequest {
            system: "Grade fairly.",
            user: "Answers here.",
            api_key,
            model: "claude-3-5-haiku-latest",
            max_output_tokens: 2048,
            base_url: None,
        }
    }

    #[test]
    fn test_request_has_single_user_message_and_no_system_field() {
        let body = serde_json::to_value(AnthropicAdapter::build_request(&request(None))).unwrap();

        assert!(body.get("system").is_none());
        assert_eq!(body["max_tokens"], 2048);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Grade fairly.\n\nAnswers here.");
    }

    #[tokio::test]
    async fn test_call_sends_auth_headers_and_joins_text_blocks() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "ant-key"))
            .and(header("anthropic-version", API_VERSION))
            .and(body_partial_json(serde_json::json!({"model": "claude-3-5-haiku-latest"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "text", "text": "[{\"questionNumber\":1,"},
                    {"type": "text", "text": "\"marks\":1,\"maxMarks\":1}]"}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let adapter = AnthropicAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let text = adapter.call(&request(Some("ant-key"))).await.unwrap();

        assert_eq!(text, "[{\"questionNumber\":1,\"marks\":1,\"maxMarks\":1}]");
    }

    #[tokio::test]
    async fn test_call_maps_prompt_too_long() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "type": "error",
                "error": {
                    "type": "invalid_request_error",
                    "message": "prompt is too long: 215000 tokens > 200000 maximum"
                }
            })))
            .mount(&mock_server)
            .await;

        let adapter = AnthropicAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let err = adapter.call(&request(Some("ant-key"))).await.unwrap_err();
        assert!(matches!(err, QuizError::ContextLengthExceeded { .. }));
    }

    #[tokio::test]
    async fn test_call_maps_request_too_large_type() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(413).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "request_too_large", "message": "Request exceeds the maximum allowed size"}
            })))
            .mount(&mock_server)
            .await;

        let adapter = AnthropicAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let err = adapter.call(&request(Some("ant-key"))).await.unwrap_err();
        assert!(matches!(err, QuizError::ContextLengthExceeded { .. }));
    }

    #[tokio::test]
    async fn test_call_overloaded_is_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let adapter = AnthropicAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let err = adapter.call(&request(Some("ant-key"))).await.unwrap_err();

        match err {
            QuizError::ProviderHttp { status, message, .. } => {
                assert_eq!(status, 529);
                assert_eq!(message, "Overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
