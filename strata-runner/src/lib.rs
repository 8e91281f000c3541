//! # strata-runner
//!
//! The generation pipeline: fetch tickets, aggregate them, resolve the
//! outline, fit the context to the model, then stream the document.
//!
//! A run is an explicit state machine that reports progress through
//! [`StreamEvent`](strata_core::StreamEvent)s on a bounded channel.
//! [`Generator::stream`] spawns the run and hands back an [`EventStream`];
//! dropping that stream cancels the run.
//!
//! ```rust,ignore
//! use futures::StreamExt;
//!
//! let generator = Generator::new(tickets, templates, ProviderRegistry::from_settings(&settings)?);
//! let mut events = generator.stream(request);
//! while let Some(event) = events.next().await {
//!     println!("{}", event.to_json());
//! }
//! ```

mod budget;
mod fetch;
mod generator;
mod report;
mod stream;

pub use budget::{
    OUTPUT_HEADROOM, SECTIONAL_THRESHOLD, calculate_depth_tokens, per_section_tokens,
    should_use_sectional,
};
pub use fetch::{FetchReport, append_epic_children, fetch_all};
pub use generator::{EVENT_BUFFER, Generator, Outcome, REGENERATE_MAX_TOKENS, SectionRequest};
pub use report::GenerationReport;
pub use stream::EventStream;
