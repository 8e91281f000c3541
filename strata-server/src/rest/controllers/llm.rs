use crate::{ApiError, ServerConfig};
use axum::{
    Json,
    extract::{Path, State},
};
use futures::{StreamExt, future::join_all};
use serde::{Deserialize, Serialize};
use strata_core::{ConnectionStatus, ProviderKind, StrataError};
use strata_model::CompletionRequest;

const TEST_SYSTEM_PROMPT: &str = "You are a test assistant. Be brief.";
const TEST_PROMPT: &str = "Say 'Test passed' in exactly 2 words.";
const TEST_MAX_TOKENS: u32 = 10;
const TEST_RESPONSE_CHARS: usize = 100;

#[derive(Clone)]
pub struct LlmController {
    config: ServerConfig,
}

impl LlmController {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Serialize)]
pub struct ProviderInfo {
    pub name: ProviderKind,
    pub display_name: &'static str,
    pub connected: bool,
    pub default_model: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_set: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub provider: ProviderKind,
    pub models: Vec<String>,
    pub default_model: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmTestRequest {
    pub provider: ProviderKind,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerationTest {
    pub success: bool,
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct LlmTestResponse {
    pub success: bool,
    pub connection_test: ConnectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_test: Option<GenerationTest>,
}

/// Every known provider with the result of a live probe. Probes run concurrently.
pub async fn list_providers(State(controller): State<LlmController>) -> Json<Vec<ProviderInfo>> {
    let config = &controller.config;
    let probes = ProviderKind::ALL.into_iter().map(|kind| async move {
        let status = match config.generator.providers().get(kind) {
            Ok(provider) => provider.test_connection().await,
            Err(err) => ConnectionStatus::failed(err.to_string()),
        };
        let settings = &config.settings;
        ProviderInfo {
            name: kind,
            display_name: kind.display_name(),
            connected: status.success,
            default_model: settings.default_model(kind).to_string(),
            message: status.message,
            api_key_set: (kind == ProviderKind::Groq).then(|| !settings.groq_api_key.is_empty()),
            base_url: (kind == ProviderKind::Ollama).then(|| settings.ollama_base_url.clone()),
        }
    });
    Json(join_all(probes).await)
}

pub async fn list_models(
    State(controller): State<LlmController>,
    Path(provider): Path<String>,
) -> Result<Json<ModelsResponse>, ApiError> {
    let kind: ProviderKind = provider.parse()?;
    let backend = controller.config.generator.providers().get(kind).map_err(StrataError::from)?;
    let models = backend.list_models().await;
    Ok(Json(ModelsResponse {
        provider: kind,
        models,
        default_model: controller.config.settings.default_model(kind).to_string(),
    }))
}

/// Probes a provider and, when a model is named, runs a tiny generation.
pub async fn test_llm(
    State(controller): State<LlmController>,
    Json(request): Json<LlmTestRequest>,
) -> Result<Json<LlmTestResponse>, ApiError> {
    let provider =
        controller.config.generator.providers().get(request.provider).map_err(StrataError::from)?;

    let connection_test = provider.test_connection().await;
    if !connection_test.success {
        return Err(ApiError::bad_request(connection_test.message));
    }

    let Some(model) = request.model.filter(|m| !m.trim().is_empty()) else {
        return Ok(Json(LlmTestResponse { success: true, connection_test, generation_test: None }));
    };

    let completion = CompletionRequest::new(TEST_SYSTEM_PROMPT, TEST_PROMPT, model)
        .with_temperature(0.0)
        .with_max_tokens(TEST_MAX_TOKENS);
    let mut stream = provider.generate_stream(completion).await.map_err(StrataError::from)?;
    let mut response = String::new();
    while let Some(chunk) = stream.next().await {
        response.push_str(&chunk.map_err(StrataError::from)?);
    }
    let response: String = response.chars().take(TEST_RESPONSE_CHARS).collect();

    Ok(Json(LlmTestResponse {
        success: true,
        connection_test,
        generation_test: Some(GenerationTest { success: true, response }),
    }))
}
