//! Quiz generation and grading
//!
//! [`QuizService`] ties the prompt formatter, the provider registry and the
//! response parser together. It holds no per-call state, so one instance
//! can serve any number of concurrent `generate` and `grade` calls.

mod generate;
mod grade;
pub mod score;
pub mod types;
pub mod weight;

pub use score::{ScoreSummary, percentage};
pub use types::{AnsweredQuestion, GradeResult, Question, QuestionKind, QuestionSet};
pub use weight::{DEFAULT_WEIGHT, MAX_WEIGHT, MIN_WEIGHT, resolve_weight, weight_from_suffix};

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{QuizError, Result};
use crate::provider::{AdapterRegistry, CompletionRequest, ProviderConfig, build_http_client};

/// Tunables shared by every call on a service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOptions {
    /// Questions requested per generation
    pub question_count: usize,
    pub generation_max_tokens: u32,
    pub grading_max_tokens: u32,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            question_count: 5,
            generation_max_tokens: 4096,
            grading_max_tokens: 2048,
        }
    }
}

/// Generates and grades quizzes through the registered providers
#[derive(Debug, Clone)]
pub struct QuizService {
    registry: AdapterRegistry,
    options: QuizOptions,
}

impl QuizService {
    pub fn new(registry: AdapterRegistry, options: QuizOptions) -> Self {
        Self { registry, options }
    }

    /// Service with the stock adapters and the configured options
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(&config.http)?;
        Ok(Self::new(
            AdapterRegistry::with_defaults(client),
            config.quiz_options(),
        ))
    }

    pub fn options(&self) -> &QuizOptions {
        &self.options
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Send one prompt to the configured provider.
    ///
    /// Credentials are checked before anything else so a missing key never
    /// reaches the network. Context overflow and unparseable output pass
    /// through as-is; every other failure is wrapped with provider and model.
    pub(crate) async fn dispatch(
        &self,
        config: &ProviderConfig,
        system: &str,
        user: &str,
        max_output_tokens: u32,
    ) -> Result<String> {
        let provider = config.provider;
        let api_key = config.api_key();
        if provider.requires_api_key() && api_key.is_none() {
            warn!(provider = %provider, "No API key configured");
            return Err(QuizError::MissingCredentials { provider });
        }

        let adapter = self.registry.get(provider)?;
        let request = CompletionRequest {
            system,
            user,
            api_key,
            model: &config.model,
            max_output_tokens,
            base_url: config.endpoint_override.as_deref(),
        };

        match adapter.call(&request).await {
            Ok(text) => {
                info!(
                    provider = %provider,
                    model = %config.model,
                    chars = text.len(),
                    "Provider call completed"
                );
                Ok(text)
            }
            Err(
                e @ (QuizError::ContextLengthExceeded { .. }
                | QuizError::UnparseableResponse { .. }),
            ) => {
                warn!(
                    provider = %provider,
                    model = %config.model,
                    error = %e,
                    "Provider call failed"
                );
                Err(e)
            }
            Err(e) => {
                warn!(
                    provider = %provider,
                    model = %config.model,
                    error = %e,
                    "Provider call failed"
                );
                Err(QuizError::ProviderCallFailed {
                    provider,
                    model: config.model.clone(),
                    source: Box::new(e),
                })
            }
        }
    }
}
