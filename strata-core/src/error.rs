use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Error codes reported to callers in terminal `error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoTickets,
    RateLimit,
    Auth,
    ContextLength,
    Connection,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoTickets => "NO_TICKETS",
            Self::RateLimit => "RATE_LIMIT",
            Self::Auth => "AUTH",
            Self::ContextLength => "CONTEXT_LENGTH",
            Self::Connection => "CONNECTION",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Best-effort classification of a free-form failure message.
    ///
    /// The checks are substring heuristics over the lowercased message and are
    /// evaluated in order, so a message mentioning both a rate limit and a
    /// connection problem is reported as `RATE_LIMIT`.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("rate limit") || lower.contains("429") {
            Self::RateLimit
        } else if lower.contains("authentication") || lower.contains("401") {
            Self::Auth
        } else if lower.contains("context") && lower.contains("length") {
            Self::ContextLength
        } else if lower.contains("connect") {
            Self::Connection
        } else {
            Self::Unknown
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures raised by an LLM backend, already sorted into the shared taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Context length exceeded: {0}")]
    ContextLength(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Provider error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Sorts an untyped backend message into a provider error kind.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        match ErrorCode::classify(&message) {
            ErrorCode::RateLimit => Self::RateLimited(message),
            ErrorCode::Auth => Self::Authentication(message),
            ErrorCode::ContextLength => Self::ContextLength(message),
            ErrorCode::Connection => Self::Connection(message),
            ErrorCode::NoTickets | ErrorCode::Unknown => Self::Other(message),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RateLimited(_) => ErrorCode::RateLimit,
            Self::Authentication(_) => ErrorCode::Auth,
            Self::ContextLength(_) => ErrorCode::ContextLength,
            Self::Connection(_) => ErrorCode::Connection,
            Self::Other(_) => ErrorCode::Unknown,
        }
    }
}

/// Failures raised by a ticket source while fetching a single ticket.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketSourceError {
    #[error("Ticket {0} not found")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("{0}")]
    Other(String),
}

impl TicketSourceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NoTickets,
            Self::Authentication(_) => ErrorCode::Auth,
            Self::Connection(_) => ErrorCode::Connection,
            Self::Other(message) => ErrorCode::classify(message),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Template parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    #[error("No tickets found or accessible")]
    NoTickets,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    TicketSource(#[from] TicketSourceError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Generation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StrataError {
    /// Code reported in the terminal error event for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoTickets => ErrorCode::NoTickets,
            Self::Provider(err) => err.code(),
            Self::TicketSource(err) => err.code(),
            other => ErrorCode::classify(&other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StrataError>;
