//! # strata-jira
//!
//! Jira Cloud implementation of [`TicketSource`](strata_core::TicketSource).
//!
//! Issues are read through REST API v3 with basic authentication (account
//! email plus API token). Descriptions, comments and rich-text acceptance
//! criteria arrive as Atlassian Document Format and are flattened to text.
//!
//! ```rust,no_run
//! use strata_core::TicketSource;
//! use strata_jira::{JiraClient, JiraConfig};
//!
//! # async fn run() -> Result<(), strata_core::TicketSourceError> {
//! let jira = JiraClient::new(JiraConfig::new("https://acme.atlassian.net", "qa@acme.io", "token"));
//! let epic = jira.fetch("PROJ-1").await?;
//! let stories = jira.fetch_children(&epic.key).await?;
//! println!("{} has {} children", epic.summary, stories.len());
//! # Ok(())
//! # }
//! ```

pub mod adf;
mod client;
mod parse;

pub use adf::adf_to_text;
pub use client::{JiraClient, JiraConfig};
pub use parse::SPRINT_FIELD;
