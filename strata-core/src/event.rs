//! Events reported to the caller while a document is generated.

use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};

/// Pipeline stage numbers carried by `status` events.
pub const STAGE_ANALYZING: u8 = 1;
pub const STAGE_TEMPLATE: u8 = 2;
pub const STAGE_GENERATING: u8 = 3;

/// One frame of the generation event stream.
///
/// Within a single request the order is: one or more `status` events, then
/// either content directly (monolithic) or `section_start`, `content*`,
/// `section_complete` per section, then exactly one `done` or `error`.
/// `warning` may appear between status events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Progress through the pipeline stages
    Status { stage: u8, message: String },

    /// Sectional generation moved to a new top-level section
    SectionStart { section: String, section_number: String },

    /// Chunk of generated text
    Content { text: String },

    /// Sectional generation finished a section
    SectionComplete { section: String },

    /// Non-fatal problem, such as tickets that could not be fetched
    Warning { message: String },

    /// Terminal failure
    Error { error: String, code: ErrorCode },

    /// Terminal success
    Done { total_tokens_used: usize, generation_time_seconds: f64 },

    /// Any event type this build does not know about
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    pub fn status(stage: u8, message: impl Into<String>) -> Self {
        Self::Status { stage, message: message.into() }
    }

    pub fn section_start(section: impl Into<String>, section_number: impl Into<String>) -> Self {
        Self::SectionStart { section: section.into(), section_number: section_number.into() }
    }

    pub fn content(text: impl Into<String>) -> Self {
        Self::Content { text: text.into() }
    }

    pub fn section_complete(section: impl Into<String>) -> Self {
        Self::SectionComplete { section: section.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning { message: message.into() }
    }

    pub fn error(error: impl Into<String>, code: ErrorCode) -> Self {
        Self::Error { error: error.into(), code }
    }

    /// Elapsed time is rounded to two decimals.
    pub fn done(total_tokens_used: usize, elapsed_seconds: f64) -> Self {
        Self::Done {
            total_tokens_used,
            generation_time_seconds: (elapsed_seconds * 100.0).round() / 100.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }

    pub fn to_json(&self) -> String {
        // Serializing this enum cannot fail: every field is a string, number or unit enum.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{\"type\":\"unknown\"}"))
    }
}
