//! Output-token budgeting and generation mode selection.

use strata_core::{Depth, ModelLimits};

/// Output tokens held back from the model's maximum.
pub const OUTPUT_HEADROOM: u32 = 1000;

/// Share of the model's output limit above which a document is generated
/// one section at a time.
pub const SECTIONAL_THRESHOLD: f64 = 0.8;

/// Output tokens requested for a whole document at `depth`.
pub fn calculate_depth_tokens(depth: Depth, limits: ModelLimits) -> u32 {
    depth
        .target_output_tokens()
        .min(limits.max_output_tokens.saturating_sub(OUTPUT_HEADROOM))
}

/// Whether `depth` needs more output than one call can comfortably produce.
pub fn should_use_sectional(depth: Depth, limits: ModelLimits) -> bool {
    f64::from(depth.target_output_tokens()) > SECTIONAL_THRESHOLD * f64::from(limits.max_output_tokens)
}

/// Equal share of the document budget for each top-level section.
pub fn per_section_tokens(total: u32, sections: usize) -> u32 {
    let sections = u32::try_from(sections.max(1)).unwrap_or(u32::MAX);
    total / sections
}
