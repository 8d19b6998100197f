//! Test utilities for quizgen - fake provider adapters
//!
//! Register these in an [`AdapterRegistry`](crate::provider::AdapterRegistry)
//! in place of the HTTP adapters to exercise orchestration without a network.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{QuizError, Result};
use crate::provider::{CompletionRequest, ProviderAdapter};

/// Owned copy of a request an adapter received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub system: String,
    pub user: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_output_tokens: u32,
    pub base_url: Option<String>,
}

impl From<&CompletionRequest<'_>> for RecordedRequest {
    fn from(request: &CompletionRequest<'_>) -> Self {
        Self {
            system: request.system.to_string(),
            user: request.user.to_string(),
            api_key: request.api_key.map(str::to_string),
            model: request.model.to_string(),
            max_output_tokens: request.max_output_tokens,
            base_url: request.base_url.map(str::to_string),
        }
    }
}

/// Adapter that answers every call with the same text and records requests.
#[derive(Debug, Default)]
pub struct StaticAdapter {
    response: String,
    calls: Mutex<Vec<RecordedRequest>>,
}

impl StaticAdapter {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first
    pub fn calls(&self) -> Vec<RecordedRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl ProviderAdapter for StaticAdapter {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn call(&self, request: &CompletionRequest<'_>) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.into());
        Ok(self.response.clone())
    }
}

/// Adapter that fails every call with a freshly built error.
pub struct FailingAdapter {
    make_error: Box<dyn Fn() -> QuizError + Send + Sync>,
}

impl FailingAdapter {
    pub fn new(make_error: impl Fn() -> QuizError + Send + Sync + 'static) -> Self {
        Self {
            make_error: Box::new(make_error),
        }
    }
}

impl std::fmt::Debug for FailingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailingAdapter").finish_non_exhaustive()
    }
}

#[async_trait]
impl ProviderAdapter for FailingAdapter {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn call(&self, _request: &CompletionRequest<'_>) -> Result<String> {
        Err((self.make_error)())
    }
}
