//! DeepSeek adapter (OpenAI-compatible chat completions)

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::provider::http::ErrorDetails;
use crate::provider::openai_compat;
use crate::provider::{CompletionRequest, ProviderAdapter, ProviderKind, require_api_key};

const TEMPERATURE: f32 = 0.7;

fn is_context_overflow(details: &ErrorDetails) -> bool {
    details.code_is("context_length_exceeded") || details.message_contains("maximum context length")
}

/// DeepSeek adapter
#[derive(Debug, Clone)]
pub struct DeepSeekAdapter {
    client: Client,
    base_url: String,
}

impl DeepSeekAdapter {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.deepseek.com";

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
}

#[async_trait]
impl ProviderAdapter for DeepSeekAdapter {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    async fn call(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let api_key = require_api_key(ProviderKind::DeepSeek, request)?;
        let body = openai_compat::standard_request(
            request.model,
            request.system,
            request.user,
            request.max_output_tokens,
            TEMPERATURE,
        );
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
