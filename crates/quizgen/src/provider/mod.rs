//! LLM provider adapters
//!
//! Each supported service gets one adapter translating the uniform
//! [`ProviderAdapter::call`] contract into that service's request shape,
//! authentication and error format. Orchestration only ever sees the trait;
//! adding a provider means a new [`ProviderKind`] variant, an adapter module
//! and an entry in [`AdapterRegistry::with_defaults`].

mod anthropic;
mod deepseek;
mod gemini;
mod http;
mod mistral;
mod ollama;
mod openai;
mod openai_compat;
mod registry;

pub use anthropic::AnthropicAdapter;
pub use deepseek::DeepSeekAdapter;
pub use gemini::GeminiAdapter;
pub use http::build_http_client;
pub use mistral::MistralAdapter;
pub use ollama::OllamaAdapter;
pub use openai::{OpenAiAdapter, REASONING_TOKEN_MULTIPLIER, is_reasoning_model};
pub use registry::AdapterRegistry;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};

/// Supported LLM services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    DeepSeek,
    Gemini,
    Mistral,
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::DeepSeek,
        ProviderKind::Gemini,
        ProviderKind::Mistral,
        ProviderKind::Ollama,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Mistral => "mistral",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Cloud providers need an API key; the local server does not.
    pub fn requires_api_key(self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-3-5-haiku-latest",
            ProviderKind::DeepSeek => "deepseek-chat",
            ProviderKind::Gemini => "gemini-2.0-flash",
            ProviderKind::Mistral => "mistral-small-latest",
            ProviderKind::Ollama => "llama3.2",
        }
    }

    /// Environment variable conventionally holding this provider's API key
    pub fn default_api_key_env(self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::DeepSeek => Some("DEEPSEEK_API_KEY"),
            ProviderKind::Gemini => Some("GEMINI_API_KEY"),
            ProviderKind::Mistral => Some("MISTRAL_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| QuizError::UnknownProvider(s.to_string()))
    }
}

/// Per-call provider selection, supplied fresh by the caller every time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    /// Base URL of the local server; ignored by cloud providers
    pub endpoint_override: Option<String>,
}

impl ProviderConfig {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: None,
            model: model.into(),
            endpoint_override: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint_override = Some(endpoint.into());
        self
    }

    /// The API key, treating blank values as absent
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// One completion request in the uniform adapter shape
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub api_key: Option<&'a str>,
    pub model: &'a str,
    pub max_output_tokens: u32,
    /// Base URL override, honoured by the local adapter
    pub base_url: Option<&'a str>,
}

/// Uniform completion contract implemented by every provider
///
/// Implementations make exactly one HTTP request per call and never retry.
/// They return the raw completion text, or the most specific error they can
/// detect from the provider's response.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Adapter name for logging
    fn name(&self) -> &'static str;

    /// Send one completion request and return the raw text
    async fn call(&self, request: &CompletionRequest<'_>) -> Result<String>;
}

/// Shared missing-key error for adapters invoked directly without a key.
pub(crate) fn require_api_key<'a>(
    provider: ProviderKind,
    request: &CompletionRequest<'a>,
) -> Result<&'a str> {
    request
        .api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or(QuizError::MissingCredentials { provider })
}
