pub mod controllers;

pub use controllers::{GenerateController, JiraController, LlmController, TemplateController};

use crate::ServerConfig;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use strata_core::RedactedSettings;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build CORS layer from the configured origins
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.security.allowed_origins.is_empty() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> =
            config.security.allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

/// Create the HTTP application. Every route lives under `/api`.
pub fn create_app(config: ServerConfig) -> Router {
    let generate_controller = GenerateController::new(config.clone());
    let llm_controller = LlmController::new(config.clone());
    let jira_controller = JiraController::new(config.clone());
    let template_controller = TemplateController::new(config.clone());

    let api_router = Router::new()
        .route("/health", get(health_check))
        .route("/settings", get(get_settings))
        .with_state(config.clone())
        .route("/generate/stream", post(controllers::generate::generate_stream))
        .route("/generate/section", post(controllers::generate::regenerate_section))
        .with_state(generate_controller)
        .route("/llm/providers", get(controllers::llm::list_providers))
        .route("/llm/models/{provider}", get(controllers::llm::list_models))
        .route("/llm/test", post(controllers::llm::test_llm))
        .with_state(llm_controller)
        .route("/jira/test", get(controllers::jira::test_connection))
        .route("/jira/tickets", post(controllers::jira::fetch_tickets))
        .route("/jira/aggregate", post(controllers::jira::aggregate_tickets))
        .with_state(jira_controller)
        .route("/template/preview", get(controllers::template::preview_template))
        .with_state(template_controller);

    let cors_layer = build_cors_layer(&config);

    Router::new().nest("/api", api_router).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.security.request_timeout,
            ))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(cors_layer),
    )
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "strata" }))
}

async fn get_settings(State(config): State<ServerConfig>) -> Json<RedactedSettings> {
    Json(config.settings.redacted())
}

