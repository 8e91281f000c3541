use crate::lines::LineBuffer;
use crate::provider::{CompletionRequest, LlmProvider, TextStream, status_error, transport_error};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strata_core::{ConnectionStatus, ProviderError};

pub const OLLAMA_DEFAULT_BASE: &str = "http://localhost:11434";

/// Context size requested on every call. Ollama otherwise defaults to 4K.
pub const DEFAULT_NUM_CTX: u32 = 32_768;

/// Longest silence tolerated between reads of a response body.
pub const READ_TIMEOUT: Duration = Duration::from_secs(300);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const LIST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_ctx: u32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Default, Deserialize)]
struct ChatLine {
    #[serde(default)]
    message: Option<LineMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LineMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    #[serde(default)]
    name: String,
}

/// Client for a local Ollama daemon.
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_read_timeout(base_url, READ_TIMEOUT)
    }

    /// Bounds the gap between reads, not the whole response.
    pub fn with_read_timeout(
        base_url: impl Into<String>,
        read_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(read_timeout)
            .build()
            .map_err(|e| ProviderError::Other(format!("Failed to create HTTP client: {}", e)))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_tags(&self, timeout: Duration) -> Result<Vec<String>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error("Ollama", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("Ollama", status, &body));
        }

        let tags: TagList = response
            .json()
            .await
            .map_err(|e| ProviderError::Other(format!("Invalid Ollama tag list: {}", e)))?;
        Ok(tags.models.into_iter().map(|m| m.name).filter(|n| !n.is_empty()).collect())
    }
}

/// Outcome of one NDJSON line.
enum LineOutcome {
    Text(String),
    Done,
    Skip,
    Failed(ProviderError),
}

fn parse_line(line: &str, model: &str) -> LineOutcome {
    let parsed: ChatLine = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed Ollama stream line");
            return LineOutcome::Skip;
        }
    };
    if let Some(error) = parsed.error {
        if error.to_lowercase().contains("not found") {
            return LineOutcome::Failed(ProviderError::Other(format!(
                "Model not found. Pull it first: ollama pull {}",
                model
            )));
        }
        return LineOutcome::Failed(ProviderError::classify(format!("Ollama: {}", error)));
    }
    let content = parsed.message.map(|m| m.content).unwrap_or_default();
    match (content.is_empty(), parsed.done) {
        (false, _) => LineOutcome::Text(content),
        (true, true) => LineOutcome::Done,
        (true, false) => LineOutcome::Skip,
    }
}

#[async_trait]
impl LlmProvider for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate_stream(&self, request: CompletionRequest) -> Result<TextStream, ProviderError> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system_prompt },
                ChatMessage { role: "user", content: &request.prompt },
            ],
            stream: true,
            options: ChatOptions {
                temperature: request.temperature,
                num_ctx: DEFAULT_NUM_CTX,
                num_predict: request.max_tokens,
            },
        };

        tracing::debug!(model = %request.model, base_url = %self.base_url, "starting Ollama stream");
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ProviderError::Connection(format!(
                        "Cannot connect to Ollama at {}. Is it running?",
                        self.base_url
                    ))
                } else {
                    transport_error("Ollama", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            if error_text.to_lowercase().contains("not found") {
                return Err(ProviderError::Other(format!(
                    "Model not found. Pull it first: ollama pull {}",
                    request.model
                )));
            }
            return Err(status_error("Ollama", status, &error_text));
        }

        let model = request.model;
        let stream = try_stream! {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = LineBuffer::default();

            'read: while let Some(chunk_result) = byte_stream.next().await {
                let chunk = chunk_result
                    .map_err(|e| ProviderError::Connection(format!("Stream read error: {}", e)))?;
                buffer.push(&chunk);

                while let Some(line) = buffer.next_line() {
                    if line.is_empty() {
                        continue;
                    }
                    match parse_line(&line, &model) {
                        LineOutcome::Text(text) => yield text,
                        LineOutcome::Done => break 'read,
                        LineOutcome::Skip => {}
                        LineOutcome::Failed(err) => Err(err)?,
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn test_connection(&self) -> ConnectionStatus {
        match self.fetch_tags(PROBE_TIMEOUT).await {
            Ok(models) => ConnectionStatus::ok(format!(
                "Connected to Ollama at {} ({} models available)",
                self.base_url,
                models.len()
            )),
            Err(ProviderError::Connection(_)) => ConnectionStatus::failed(format!(
                "Cannot connect to Ollama at {}. Start with: ollama serve",
                self.base_url
            )),
            Err(e) => ConnectionStatus::failed(format!("Ollama returned an error: {}", e)),
        }
    }

    async fn list_models(&self) -> Vec<String> {
        self.fetch_tags(LIST_TIMEOUT).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ollama model listing failed");
            Vec::new()
        })
    }
}
