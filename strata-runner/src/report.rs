use serde::Serialize;
use strata_core::{ErrorCode, StreamEvent};

/// Everything observed on one event stream, folded into a summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    /// Generated text; sections are separated by a blank line.
    pub content: String,
    pub sections: Vec<String>,
    pub warnings: Vec<String>,
    pub total_tokens_used: usize,
    pub generation_time_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    pub completed: bool,
}

impl GenerationReport {
    pub fn record(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::Content { text } => self.content.push_str(text),
            StreamEvent::SectionStart { section, .. } => self.sections.push(section.clone()),
            StreamEvent::SectionComplete { .. } => {
                if !self.content.ends_with("\n\n") {
                    self.content.push_str("\n\n");
                }
            }
            StreamEvent::Warning { message } => self.warnings.push(message.clone()),
            StreamEvent::Error { error, code } => {
                self.error = Some(error.clone());
                self.error_code = Some(*code);
            }
            StreamEvent::Done { total_tokens_used, generation_time_seconds } => {
                self.total_tokens_used = *total_tokens_used;
                self.generation_time_seconds = *generation_time_seconds;
                self.completed = true;
            }
            StreamEvent::Status { .. } | StreamEvent::Unknown => {}
        }
    }

    /// Markdown document under a top-level `title` heading.
    pub fn to_markdown(&self, title: &str) -> String {
        format!("# {}\n\n{}\n", title, self.content.trim_end())
    }
}
