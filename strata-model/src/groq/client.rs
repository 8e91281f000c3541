use super::config::{GroqConfig, PREFERRED_MODELS, order_models};
use crate::lines::LineBuffer;
use crate::provider::{CompletionRequest, LlmProvider, TextStream, status_error, transport_error};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use strata_core::{ConnectionStatus, ProviderError};

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<StreamError>,
}

/// Error object Groq sends in place of a delta when a stream fails midway.
#[derive(Debug, Deserialize)]
struct StreamError {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Groq chat-completions client.
///
/// # Example
///
/// ```rust,ignore
/// use strata_model::groq::{GroqClient, GroqConfig};
///
/// let client = GroqClient::new(GroqConfig::new(std::env::var("GROQ_API_KEY")?))?;
/// ```
pub struct GroqClient {
    client: Client,
    config: GroqConfig,
}

impl GroqClient {
    pub fn new(config: GroqConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().build().map_err(|e| {
            ProviderError::Other(format!("Failed to create HTTP client: {}", e))
        })?;
        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.effective_base_url(), path)
    }

    async fn fetch_model_ids(&self) -> Result<Vec<String>, ProviderError> {
        let response = self
            .client
            .get(self.api_url("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| transport_error("Groq", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("Groq", status, &body));
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| ProviderError::Other(format!("Invalid Groq model list: {}", e)))?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

/// Extracts the text delta from one SSE `data:` payload.
fn chunk_text(data: &str) -> Result<Option<String>, ProviderError> {
    let chunk = match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse Groq stream chunk");
            return Ok(None);
        }
    };
    if let Some(error) = chunk.error {
        let kind = error.kind.as_deref().unwrap_or("error");
        return Err(ProviderError::classify(format!("Groq stream {}: {}", kind, error.message)));
    }
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|content| !content.is_empty()))
}

#[async_trait]
impl LlmProvider for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    async fn generate_stream(&self, request: CompletionRequest) -> Result<TextStream, ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::Authentication("GROQ_API_KEY is not configured".into()));
        }

        let body = ChatCompletionRequest {
            model: &request.model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system_prompt },
                ChatMessage { role: "user", content: &request.prompt },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: true,
        };

        tracing::debug!(model = %request.model, max_tokens = request.max_tokens, "starting Groq stream");
        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("Groq", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error("Groq", status, &error_text));
        }

        let stream = try_stream! {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = LineBuffer::default();

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = chunk_result
                    .map_err(|e| ProviderError::Connection(format!("Stream read error: {}", e)))?;
                buffer.push(&chunk);

                while let Some(line) = buffer.next_line() {
                    if line.is_empty() || line == "data: [DONE]" {
                        continue;
                    }
                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    if let Some(text) = chunk_text(data)? {
                        yield text;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn test_connection(&self) -> ConnectionStatus {
        if self.config.api_key.is_empty() {
            return ConnectionStatus::failed("GROQ_API_KEY is not configured");
        }
        match self.fetch_model_ids().await {
            Ok(models) => ConnectionStatus::ok(format!(
                "Connected to Groq API ({} models available)",
                models.len()
            )),
            Err(e) => ConnectionStatus::failed(format!("Failed to connect to Groq API: {}", e)),
        }
    }

    async fn list_models(&self) -> Vec<String> {
        match self.fetch_model_ids().await {
            Ok(ids) => order_models(&ids),
            Err(e) => {
                tracing::warn!(error = %e, "Groq model discovery failed, using preferred list");
                PREFERRED_MODELS.iter().map(|m| m.to_string()).collect()
            }
        }
    }
}
