use crate::groq::{GroqClient, GroqConfig};
use crate::ollama::OllamaClient;
use crate::provider::LlmProvider;
use std::collections::HashMap;
use std::sync::Arc;
use strata_core::{ProviderError, ProviderKind, Settings};

/// The configured provider per [`ProviderKind`].
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groq and Ollama clients built from the process settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        let groq = GroqClient::new(GroqConfig::new(settings.groq_api_key.clone()))?;
        let ollama = OllamaClient::new(settings.ollama_base_url.clone())?;
        Ok(Self::new()
            .with_provider(ProviderKind::Groq, Arc::new(groq))
            .with_provider(ProviderKind::Ollama, Arc::new(ollama)))
    }

    pub fn with_provider(mut self, kind: ProviderKind, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or_else(|| ProviderError::Other(format!("Provider '{}' is not configured", kind)))
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL.into_iter().filter(|k| self.providers.contains_key(k)).collect()
    }
}
