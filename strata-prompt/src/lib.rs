//! # strata-prompt
//!
//! Document outline handling and prompt rendering.
//!
//! ## Overview
//!
//! - [`FileTemplateSource`] reads a numbered outline from a plain-text file
//! - [`resolve_template`] falls back to [`default_outline`] when no file can be used
//! - [`build_generation_prompt`] and [`build_section_prompt`] render deterministic prompts
//!
//! ```rust,no_run
//! use strata_prompt::{FileTemplateSource, resolve_template};
//!
//! let outline = resolve_template(&FileTemplateSource::new("./teststrategy.txt"));
//! println!("{} top-level sections from {}", outline.sections.len(), outline.source);
//! ```

mod builder;
mod depth;
mod template;

pub use builder::{
    GENERATION_SYSTEM_PROMPT, PREVIOUS_CONTENT_TAIL_CHARS, PromptInputs,
    QA_ARCHITECT_SYSTEM_PROMPT, REGENERATE_SYSTEM_PROMPT, build_generation_prompt,
    build_section_prompt, document_title,
};
pub use depth::depth_instructions;
pub use template::{
    FileTemplateSource, TEMPLATE_FILE_NAME, build_hierarchy, default_outline, parse_outline_text,
    render_outline, resolve_template,
};
