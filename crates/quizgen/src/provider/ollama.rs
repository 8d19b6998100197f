//! Ollama (local) adapter
//!
//! No API key; the base URL comes from the caller's endpoint override when
//! set. A refused connection means the server is not running and is
//! reported as `ProviderUnreachable` rather than a generic transport error.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{QuizError, Result};
use crate::provider::http::{ErrorDetails, read_response, redacted, transport_error};
use crate::provider::{CompletionRequest, ProviderAdapter};

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    system: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Ollama errors are plain strings, so match on the text.
fn is_context_overflow(details: &ErrorDetails) -> bool {
    ["context length", "context window", "too long"]
        .iter()
        .any(|needle| details.message_contains(needle))
}

/// Ollama adapter
#[derive(Debug, Clone)]
pub struct OllamaAdapter {
    client: Client,
    base_url: String,
}

impl OllamaAdapter {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";

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

    /// `{base}/api/generate`, validating the user-supplied base URL.
    fn endpoint(base_url: &str) -> Result<Url> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .and_then(|url| url.join("api/generate"))
            .map_err(|e| QuizError::Config(format!("Invalid Ollama base URL '{base_url}': {e}")))
    }
}

#[async_trait]
impl ProviderAdapter for OllamaAdapter {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn call(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let base_url = request
            .base_url
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(self.base_url.as_str());
        let url = Self::endpoint(base_url)?;
        debug!(provider = "ollama", model = %request.model, "Calling generate at: {}", url);

        let body = GenerateRequest {
            model: request.model.to_string(),
            system: request.system.to_string(),
            prompt: request.user.to_string(),
            stream: false,
            options: GenerateOptions {
                num_predict: request.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    let message = redacted(e);
                    warn!(
                        provider = "ollama",
                        base_url = base_url,
                        error = %message,
                        "Local server unreachable"
                    );
                    QuizError::ProviderUnreachable {
                        url: base_url.to_string(),
                        message,
                    }
                } else {
                    transport_error(self.name(), e)
                }
            })?;

        let generated: GenerateResponse =
            read_response(self.name(), response, is_context_overflow).await?;

        if generated.response.trim().is_empty() {
            return Err(QuizError::MalformedResponse(
                "ollama returned an empty response".to_string(),
            ));
        }
        Ok(generated.response)
    }
}
