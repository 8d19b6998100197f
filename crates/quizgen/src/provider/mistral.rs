//! Mistral adapter (OpenAI-compatible chat completions)

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::provider::http::ErrorDetails;
use crate::provider::openai_compat;
use crate::provider::{CompletionRequest, ProviderAdapter, ProviderKind, require_api_key};

const TEMPERATURE: f32 = 0.7;

fn is_context_overflow(details: &ErrorDetails) -> bool {
    details.kind_is("context_length_exceeded") || details.message_contains("too large for model")
}

/// Mistral adapter
#[derive(Debug, Clone)]
pub struct MistralAdapter {
    client: Client,
    base_url: String,
}

impl MistralAdapter {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.mistral.ai/v1";

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
impl ProviderAdapter for MistralAdapter {
    fn name(&self) -> &'static str {
        "mistral"
    }

    async fn call(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let api_key = require_api_key(ProviderKind::Mistral, request)?;
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
