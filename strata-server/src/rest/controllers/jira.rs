use crate::{ApiError, ServerConfig};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use strata_context::aggregate;
use strata_core::{AggregatedContext, ConnectionStatus, Ticket};
use strata_runner::{FetchReport, append_epic_children, fetch_all};

#[derive(Clone)]
pub struct JiraController {
    config: ServerConfig,
}

impl JiraController {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Deserialize)]
pub struct TicketsRequest {
    pub ticket_ids: Vec<String>,
    #[serde(default = "default_fetch_children")]
    pub fetch_children: bool,
}

fn default_fetch_children() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct TicketsResponse {
    pub success: bool,
    pub tickets: Vec<Ticket>,
    pub errors: Vec<String>,
    pub total_fetched: usize,
    pub total_requested: usize,
}

#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    pub success: bool,
    pub aggregated_context: AggregatedContext,
    pub errors: Vec<String>,
    pub total_tickets: usize,
}

/// Identity probe. A failed probe is a 401 carrying the probe's message.
pub async fn test_connection(
    State(controller): State<JiraController>,
) -> Result<Json<ConnectionStatus>, ApiError> {
    let status = controller.config.generator.ticket_source().test_connection().await;
    if status.success {
        Ok(Json(status))
    } else {
        Err(ApiError::new(StatusCode::UNAUTHORIZED, status.message))
    }
}

/// Bulk fetch. Individual failures are listed in `errors`; the request itself
/// succeeds as long as it was well formed.
pub async fn fetch_tickets(
    State(controller): State<JiraController>,
    Json(request): Json<TicketsRequest>,
) -> Json<TicketsResponse> {
    let source = controller.config.generator.ticket_source();
    let FetchReport { tickets, errors } = fetch_all(source.as_ref(), &request.ticket_ids).await;
    Json(TicketsResponse {
        success: !tickets.is_empty(),
        total_fetched: tickets.len(),
        total_requested: request.ticket_ids.len(),
        tickets,
        errors,
    })
}

pub async fn aggregate_tickets(
    State(controller): State<JiraController>,
    Json(request): Json<TicketsRequest>,
) -> Result<Json<AggregateResponse>, ApiError> {
    let source = controller.config.generator.ticket_source();
    let FetchReport { mut tickets, errors } = fetch_all(source.as_ref(), &request.ticket_ids).await;
    if tickets.is_empty() {
        return Err(ApiError::not_found("No tickets found"));
    }
    if request.fetch_children {
        append_epic_children(source.as_ref(), &mut tickets).await;
    }

    Ok(Json(AggregateResponse {
        success: true,
        aggregated_context: aggregate(&tickets),
        errors,
        total_tickets: tickets.len(),
    }))
}
