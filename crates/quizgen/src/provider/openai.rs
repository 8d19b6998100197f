//! OpenAI chat completions adapter
//!
//! Reasoning models (`o1`, `o3`, `o4-mini`, `gpt-5`, ...) spend hidden
//! reasoning tokens from the same budget as the visible answer, so they get
//! `max_completion_tokens` scaled by [`REASONING_TOKEN_MULTIPLIER`] and no
//! temperature. The early `o1-mini` / `o1-preview` models also reject the
//! system role, so their instructions ride in the user message.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::provider::http::ErrorDetails;
use crate::provider::openai_compat::{self, ChatCompletionRequest, Message};
use crate::provider::{CompletionRequest, ProviderAdapter, ProviderKind, require_api_key};

/// Budget multiplier applied for reasoning models
pub const REASONING_TOKEN_MULTIPLIER: u32 = 4;

const TEMPERATURE: f32 = 0.7;

/// Whether `model` is a reasoning model (`o` followed by a digit, or `gpt-5*`).
pub fn is_reasoning_model(model: &str) -> bool {
    let model = model.trim().to_lowercase();
    let mut chars = model.chars();
    let o_series = chars.next() == Some('o') && chars.next().is_some_and(|c| c.is_ascii_digit());
    o_series || model.starts_with("gpt-5")
}

/// Reasoning variants that do not accept a system message
fn lacks_system_role(model: &str) -> bool {
    let model = model.trim().to_lowercase();
    model.starts_with("o1-mini") || model.starts_with("o1-preview")
}

fn is_context_overflow(details: &ErrorDetails) -> bool {
    details.code_is("context_length_exceeded")
}

/// OpenAI adapter
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    client: Client,
    base_url: String,
}

impl OpenAiAdapter {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the adapter at a compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub(crate) fn build_request(request: &CompletionRequest<'_>) -> ChatCompletionRequest {
        if !is_reasoning_model(request.model) {
            return openai_compat::standard_request(
                request.model,
                request.system,
                request.user,
                request.max_output_tokens,
                TEMPERATURE,
            );
        }

        let messages = if lacks_system_role(request.model) {
            vec![Message::user(format!("{}\n\n{}", request.system, request.user))]
        } else {
            vec![Message::system(request.system), Message::user(request.user)]
        };

        ChatCompletionRequest {
            model: request.model.to_string(),
            messages,
            max_tokens: None,
            max_completion_tokens: Some(
                request
                    .max_output_tokens
                    .saturating_mul(REASONING_TOKEN_MULTIPLIER),
            ),
            temperature: None,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn call(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let api_key = require_api_key(ProviderKind::OpenAi, request)?;
        let body = Self::build_request(request);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        openai_compat::complete(
            &self.client,
            self.name(),
            &url,
            api_key,
            &body,
            is_context_overflow,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuizError;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request<'a>(model: &'a str, api_key: Option<&'a str>) -> CompletionRequest<'a> {
        CompletionRequest {
            system: "Be a teacher.",
            user: "Notes here.",
            api_key,
            model,
            max_output_tokens: 1000,
            base_url: None,
        }
    }

    #[test]
    fn test_is_reasoning_model() {
        for model in ["o1", "o1-mini", "o3-mini", "o4-mini", "gpt-5", "gpt-5-nano", "O3"] {
            assert!(is_reasoning_model(model), "{model}");
        }
        for model in ["gpt-4o", "gpt-4o-mini", "omni-moderation", "gpt-4.1"] {
            assert!(!is_reasoning_model(model), "{model}");
        }
    }

    #[test]
    fn test_standard_model_request_shape() {
        let body = serde_json::to_value(OpenAiAdapter::build_request(&request("gpt-4o", None)))
            .unwrap();

        assert_eq!(body["max_tokens"], 1000);
        assert!(body.get("max_completion_tokens").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body.get("temperature").is_some());
    }

    #[test]
    fn test_reasoning_model_scales_budget() {
        let body =
            serde_json::to_value(OpenAiAdapter::build_request(&request("o3-mini", None))).unwrap();

        assert_eq!(body["max_completion_tokens"], 1000 * REASONING_TOKEN_MULTIPLIER);
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("temperature").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
    }

    #[test]
    fn test_o1_mini_merges_system_into_user() {
        let body =
            serde_json::to_value(OpenAiAdapter::build_request(&request("o1-mini", None))).unwrap();

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Be a teacher.\n\nNotes here.");
    }

    #[tokio::test]
    async fn test_call_returns_first_choice() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"questions\":[]}"}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let adapter = OpenAiAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let text = adapter
            .call(&request("gpt-4o-mini", Some("sk-test")))
            .await
            .unwrap();

        assert_eq!(text, "{\"questions\":[]}");
    }

    #[tokio::test]
    async fn test_call_maps_context_length_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "message": "Please reduce the length of the messages.",
                    "type": "invalid_request_error",
                    "code": "context_length_exceeded"
                }
            })))
            .mount(&mock_server)
            .await;

        let adapter = OpenAiAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let err = adapter
            .call(&request("gpt-4o-mini", Some("sk-test")))
            .await
            .unwrap_err();

        match err {
            QuizError::ContextLengthExceeded { message } => {
                assert_eq!(message, "Please reduce the length of the messages.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_maps_other_errors_to_http() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "code": "invalid_api_key"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let adapter = OpenAiAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let err = adapter
            .call(&request("gpt-4o-mini", Some("sk-bad")))
            .await
            .unwrap_err();

        match err {
            QuizError::ProviderHttp { status, message, body } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
                assert!(body.contains("invalid_api_key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_without_key_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let adapter = OpenAiAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let err = adapter.call(&request("gpt-4o", None)).await.unwrap_err();
        assert!(matches!(err, QuizError::MissingCredentials { .. }));
    }

    #[tokio::test]
    async fn test_call_empty_choices_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&mock_server)
            .await;

        let adapter = OpenAiAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let err = adapter
            .call(&request("gpt-4o", Some("sk-test")))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::MalformedResponse(_)));
    }
}
