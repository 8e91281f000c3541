//! Narrow interfaces to the collaborators around the generation pipeline.

use crate::error::{TemplateError, TicketSourceError};
use crate::template::TemplateSection;
use crate::ticket::Ticket;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of a reachability or credential probe. Probes never fail; problems
/// are reported through `success = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub success: bool,
    pub message: String,
    /// Identity reported by the remote side, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
}

impl ConnectionStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), identity: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), identity: None }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identity {
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
}

/// Issue tracker the pipeline pulls tickets from.
#[async_trait]
pub trait TicketSource: Send + Sync {
    /// Fetches one ticket. A missing ticket is [`TicketSourceError::NotFound`].
    async fn fetch(&self, ticket_id: &str) -> Result<Ticket, TicketSourceError>;

    /// Child issues of an epic, in tracker order.
    async fn fetch_children(&self, epic_key: &str) -> Result<Vec<Ticket>, TicketSourceError>;

    async fn test_connection(&self) -> ConnectionStatus;
}

/// Supplier of the document outline.
pub trait TemplateSource: Send + Sync {
    fn locate(&self) -> Option<PathBuf>;

    /// Parses the outline at `path` into a section hierarchy.
    fn parse(&self, path: &std::path::Path) -> Result<Vec<TemplateSection>, TemplateError>;
}
