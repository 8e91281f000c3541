//! # strata-core
//!
//! Core types shared by every Strata crate.
//!
//! - [`Ticket`] - a fetched issue-tracker record
//! - [`AggregatedContext`] / [`FeatureArea`] - project context built from tickets
//! - [`TemplateSection`] - one node of the document outline
//! - [`GenerationRequest`] - what the caller asked for
//! - [`StreamEvent`] - progress and output reported back to the caller
//! - [`TicketSource`] / [`TemplateSource`] - collaborator interfaces
//! - [`StrataError`] / [`ErrorCode`] - unified error handling
//! - [`ModelLimits`] - context window and output limits of a model
//! - [`Settings`] - process configuration snapshot

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod limits;
pub mod request;
pub mod source;
pub mod template;
pub mod ticket;

pub use config::{RedactedSettings, Settings, ValidationError, mask_sensitive};
pub use context::{
    AggregatedContext, FeatureArea, GENERAL_AREA_DESCRIPTION, GENERAL_AREA_KEY,
    GENERAL_AREA_TITLE, ProjectSummary, StorySummary,
};
pub use error::{
    ErrorCode, ProviderError, Result, StrataError, TemplateError, TicketSourceError,
};
pub use event::{STAGE_ANALYZING, STAGE_GENERATING, STAGE_TEMPLATE, StreamEvent};
pub use limits::ModelLimits;
pub use request::{Depth, FocusArea, GenerationRequest, ProviderKind};
pub use source::{ConnectionStatus, Identity, TemplateSource, TicketSource};
pub use template::{TemplateSection, TemplateStructure};
pub use ticket::{
    Comment, EPIC_ISSUE_TYPE, LinkDirection, LinkedIssue, MAX_TICKET_COMMENTS, Subtask, Ticket,
};
