use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use strata_core::{ErrorCode, StrataError};

/// Error body returned by every JSON endpoint: `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into() }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }
}

impl From<StrataError> for ApiError {
    fn from(err: StrataError) -> Self {
        let status = match (&err, err.code()) {
            (StrataError::InvalidRequest(_), _) => StatusCode::BAD_REQUEST,
            (_, ErrorCode::NoTickets) => StatusCode::NOT_FOUND,
            (_, ErrorCode::Auth) => StatusCode::UNAUTHORIZED,
            (_, ErrorCode::RateLimit) => StatusCode::TOO_MANY_REQUESTS,
            (_, ErrorCode::Connection) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, detail = %self.detail, "request failed");
        } else {
            tracing::debug!(status = %self.status, detail = %self.detail, "request rejected");
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
