//! Chat-completions wire format shared by OpenAI, DeepSeek and Mistral

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QuizError, Result};
use crate::provider::http::{ErrorDetails, read_response, transport_error};

/// Chat completion request
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Message in the chat completion request
#[derive(Debug, Serialize)]
pub(crate) struct Message {
    pub role: &'static str,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Standard system + user request with `max_tokens` and a temperature
pub(crate) fn standard_request(
    model: &str,
    system: &str,
    user: &str,
    max_tokens: u32,
    temperature: f32,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![Message::system(system), Message::user(user)],
        max_tokens: Some(max_tokens),
        max_completion_tokens: None,
        temperature: Some(temperature),
    }
}

/// POST a chat completion with bearer auth and return the first choice's text.
pub(crate) async fn complete(
    client: &Client,
    provider: &'static str,
    url: &str,
    api_key: &str,
    request: &ChatCompletionRequest,
    is_overflow: fn(&ErrorDetails) -> bool,
) -> Result<String> {
    debug!(provider = provider, model = %request.model, "Calling chat completions at: {}", url);

    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(request)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let completion: ChatCompletionResponse = read_response(provider, response, is_overflow).await?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| QuizError::MalformedResponse(format!("{provider} returned no content")))
}
