//! # strata-server
//!
//! HTTP surface for the generator. `POST /api/generate/stream` answers with
//! server-sent events, one JSON-encoded [`StreamEvent`](strata_core::StreamEvent)
//! per frame; the remaining routes probe and preview the collaborators.

pub mod config;
pub mod error;
pub mod rest;

pub use config::{SecurityConfig, ServerConfig};
pub use error::ApiError;
pub use rest::{GenerateController, JiraController, LlmController, TemplateController, create_app};
