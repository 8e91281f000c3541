use crate::provider::{CompletionRequest, LlmProvider, TextStream};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use strata_core::{ConnectionStatus, ProviderError};

/// Scripted provider for tests: yields fixed chunks and records each request.
#[derive(Clone, Default)]
pub struct MockProvider {
    name: String,
    chunks: Vec<String>,
    failure: Option<ProviderError>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_chunk(mut self, chunk: impl Into<String>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    /// After the scripted chunks, the stream ends with this error.
    pub fn with_failure(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_stream(&self, request: CompletionRequest) -> Result<TextStream, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let chunks = self.chunks.clone();
        let failure = self.failure.clone();
        let stream = async_stream::stream! {
            for chunk in chunks {
                yield Ok(chunk);
            }
            if let Some(error) = failure {
                yield Err(error);
            }
        };
        Ok(Box::pin(stream))
    }

    async fn test_connection(&self) -> ConnectionStatus {
        ConnectionStatus::ok(format!("{} mock ready", self.name))
    }

    async fn list_models(&self) -> Vec<String> {
        vec!["mock-model".to_string()]
    }
}
