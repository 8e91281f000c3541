use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use strata_core::{ConnectionStatus, ProviderError};

/// Lazily produced text chunks from one completion call.
///
/// The stream is finite and cannot be restarted. Dropping it releases the
/// underlying HTTP connection.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// One completion call: a system prompt plus a single user prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(
        system_prompt: impl Into<String>,
        prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: system_prompt.into(),
            model: model.into(),
            temperature: 0.3,
            max_tokens: 4000,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A streaming text-generation backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Starts a completion. Backend failures surface either here or as an
    /// `Err` item in the stream, always as a classified [`ProviderError`].
    async fn generate_stream(&self, request: CompletionRequest) -> Result<TextStream, ProviderError>;

    /// Reachability and credential probe. Never fails.
    async fn test_connection(&self) -> ConnectionStatus;

    /// Model identifiers the backend offers, best first.
    async fn list_models(&self) -> Vec<String>;
}

/// Maps a non-success HTTP status and body to a provider error.
pub(crate) fn status_error(backend: &str, status: reqwest::StatusCode, body: &str) -> ProviderError {
    let message = format!("{} API error ({}): {}", backend, status, body);
    match status.as_u16() {
        429 => ProviderError::RateLimited(message),
        401 | 403 => ProviderError::Authentication(message),
        _ => ProviderError::classify(message),
    }
}

/// Maps a transport-level failure to a provider error.
pub(crate) fn transport_error(backend: &str, err: reqwest::Error) -> ProviderError {
    if err.is_connect() || err.is_timeout() {
        ProviderError::Connection(format!("{} request failed: {}", backend, err))
    } else {
        ProviderError::classify(format!("{} request failed: {}", backend, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use strata_core::ErrorCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error("Groq", StatusCode::TOO_MANY_REQUESTS, "slow down").code(),
            ErrorCode::RateLimit
        );
        assert_eq!(status_error("Groq", StatusCode::FORBIDDEN, "").code(), ErrorCode::Auth);
        assert_eq!(
            status_error("Groq", StatusCode::BAD_REQUEST, "context length exceeded").code(),
            ErrorCode::ContextLength
        );
        assert_eq!(
            status_error("Ollama", StatusCode::INTERNAL_SERVER_ERROR, "boom").code(),
            ErrorCode::Unknown
        );
    }

    #[test]
    fn test_completion_request_defaults() {
        let request = CompletionRequest::new("sys", "user", "m").with_max_tokens(10);
        assert_eq!(request.max_tokens, 10);
        assert!((request.temperature - 0.3).abs() < f32::EPSILON);
    }
}
