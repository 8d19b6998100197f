//! Google Gemini `generateContent` adapter
//!
//! The model name is part of the URL path and the key travels in the query
//! string. Instructions and prompt are sent as one text part.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QuizError, Result};
use crate::provider::http::{ErrorDetails, read_response, transport_error};
use crate::provider::{CompletionRequest, ProviderAdapter, ProviderKind, require_api_key};

const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

fn is_context_overflow(details: &ErrorDetails) -> bool {
    details.message_contains("exceeds the maximum number of tokens")
        || details.message_contains("input token count")
}

/// Gemini adapter
#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    client: Client,
    base_url: String,
}

impl GeminiAdapter {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

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

    fn build_request(request: &CompletionRequest<'_>) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: format!("{}\n\n{}", request.system, request.user),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens,
                temperature: TEMPERATURE,
            },
        }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn call(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let api_key = require_api_key(ProviderKind::Gemini, request)?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            request.model
        );
        debug!(provider = "gemini", model = %request.model, "Calling generateContent at: {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&Self::build_request(request))
            .send()
            .await
            .map_err(|e| transport_error(self.name(), e))?;

        let generated: GenerateContentResponse =
            read_response(self.name(), response, is_context_overflow).await?;

        let text: String = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = generated
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("gemini returned no text (blocked: {r})"))
                .unwrap_or_else(|| "gemini returned no text".to_string());
            return Err(QuizError::MalformedResponse(reason));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(api_key: Option<&str>) -> CompletionRequest<'_> {
        CompletionRequest {
            system: "sys",
            user: "usr",
            api_key,
            model: "gemini-2.0-flash",
            max_output_tokens: 4096,
            base_url: None,
        }
    }

    #[test]
    fn test_request_is_single_text_block_without_model() {
        let body = serde_json::to_value(GeminiAdapter::build_request(&request(None))).unwrap();

        assert!(body.get("model").is_none());
        assert_eq!(body["contents"][0]["parts"][0]["text"], "sys\n\nusr");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[tokio::test]
    async fn test_call_puts_model_in_path_and_key_in_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "g-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"maxOutputTokens": 4096}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "part one, "}, {"text": "part two"}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let adapter = GeminiAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let text = adapter.call(&request(Some("g-key"))).await.unwrap();
        assert_eq!(text, "part one, part two");
    }

    #[tokio::test]
    async fn test_call_maps_token_count_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": 400,
                    "message": "The input token count (1200000) exceeds the maximum number of tokens allowed (1048576).",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&mock_server)
            .await;

        let adapter = GeminiAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let err = adapter.call(&request(Some("g-key"))).await.unwrap_err();
        assert!(matches!(err, QuizError::ContextLengthExceeded { .. }));
    }

    #[tokio::test]
    async fn test_call_blocked_prompt_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&mock_server)
            .await;

        let adapter = GeminiAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let err = adapter.call(&request(Some("g-key"))).await.unwrap_err();

        match err {
            QuizError::MalformedResponse(message) => assert!(message.contains("SAFETY")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_invalid_key_is_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&mock_server)
            .await;

        let adapter = GeminiAdapter::new(Client::new()).with_base_url(mock_server.uri());
        let err = adapter.call(&request(Some("g-key"))).await.unwrap_err();
        assert!(matches!(err, QuizError::ProviderHttp { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_key() {
        // Nothing listens on port 1, and the key travels in the query string
        let adapter = GeminiAdapter::new(Client::new()).with_base_url("http://127.0.0.1:1");
        let err = adapter
            .call(&request(Some("SECRET-GEMINI-KEY")))
            .await
            .unwrap_err();

        match &err {
            QuizError::Transport(message) => assert!(!message.contains("SECRET-GEMINI-KEY")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!err.to_string().contains("SECRET-GEMINI-KEY"));
        assert!(!format!("{err:?}").contains("SECRET-GEMINI-KEY"));
    }
}
