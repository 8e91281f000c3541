use crate::{ApiError, ServerConfig};
use axum::{
    Json,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use std::convert::Infallible;
use strata_core::GenerationRequest;
use strata_runner::SectionRequest;

#[derive(Clone)]
pub struct GenerateController {
    config: ServerConfig,
}

impl GenerateController {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub success: bool,
    pub section_number: String,
    pub content: String,
}

/// Streams one generation run as server-sent events, one JSON event per frame.
///
/// Request problems are reported in-band as an `error` event. A client that
/// disconnects drops the event stream, which cancels the run.
pub async fn generate_stream(
    State(controller): State<GenerateController>,
    Json(request): Json<GenerationRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!(
        tickets = request.jira_ids.len(),
        provider = %request.provider,
        model = %request.model,
        "generation requested"
    );
    let events = controller
        .config
        .generator
        .stream(request)
        .map(|event| Ok::<_, Infallible>(Event::default().data(event.to_json())));

    Sse::new(events).keep_alive(KeepAlive::default())
}

pub async fn regenerate_section(
    State(controller): State<GenerateController>,
    Json(request): Json<SectionRequest>,
) -> Result<Json<SectionResponse>, ApiError> {
    let section_number = request.section_number.clone();
    let content = controller.config.generator.regenerate_section(request).await?;
    Ok(Json(SectionResponse { success: true, section_number, content }))
}
