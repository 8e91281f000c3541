//! # Strata Telemetry
//!
//! Structured logging for Strata services built on `tracing`.
//!
//! ## Usage
//!
//! ```rust
//! use strata_telemetry::{init_telemetry, info, instrument};
//!
//! fn main() {
//!     init_telemetry("strata");
//!
//!     #[instrument]
//!     async fn fetch_tickets() {
//!         info!("fetching");
//!     }
//! }
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use init::{LogFormat, init_telemetry, init_with_format};
pub use spans::*;
