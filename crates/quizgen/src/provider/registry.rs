//! Provider dispatch table

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;

use crate::error::{QuizError, Result};
use crate::provider::{
    AnthropicAdapter, DeepSeekAdapter, GeminiAdapter, MistralAdapter, OllamaAdapter,
    OpenAiAdapter, ProviderAdapter, ProviderKind,
};

/// Maps each provider to the adapter that talks to it
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl AdapterRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the stock adapter for every provider, sharing `client`.
    pub fn with_defaults(client: Client) -> Self {
        Self::new()
            .with(ProviderKind::OpenAi, Arc::new(OpenAiAdapter::new(client.clone())))
            .with(ProviderKind::Anthropic, Arc::new(AnthropicAdapter::new(client.clone())))
            .with(ProviderKind::DeepSeek, Arc::new(DeepSeekAdapter::new(client.clone())))
            .with(ProviderKind::Gemini, Arc::new(GeminiAdapter::new(client.clone())))
            .with(ProviderKind::Mistral, Arc::new(MistralAdapter::new(client.clone())))
            .with(ProviderKind::Ollama, Arc::new(OllamaAdapter::new(client)))
    }

    /// Register an adapter, returning the one it replaced.
    pub fn register(
        &mut self,
        kind: ProviderKind,
        adapter: Arc<dyn ProviderAdapter>,
    ) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.insert(kind, adapter)
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, kind: ProviderKind, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register(kind, adapter);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Result<Arc<dyn ProviderAdapter>> {
        self.adapters
            .get(&kind)
            .cloned()
            .ok_or_else(|| QuizError::UnknownProvider(kind.to_string()))
    }

    /// Registered providers in declaration order
    pub fn providers(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.adapters.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}
