//! # strata-context
//!
//! Turns fetched tickets into prompt-ready project context.
//!
//! - [`aggregate`] groups tickets into feature areas and derives risk,
//!   technology and cross-cutting signals.
//! - [`ContextOptimizer`] shrinks the result through ordered reduction levels
//!   until it fits the model's context window.
//!
//! Both are pure functions of their inputs.

pub mod aggregator;
pub mod optimizer;
pub mod signals;

pub use aggregator::{aggregate, truncate_chars};
pub use optimizer::{
    ContextOptimizer, OptimizationMetadata, Overhead, REDUCTION_LEVELS, ReductionLevel,
    TRUNCATION_MARKER, context_tokens, estimate_tokens,
};
pub use signals::{risk_indicators, technical_signals};
