//! # strata-model
//!
//! Streaming LLM backends for Strata.
//!
//! ## Overview
//!
//! - [`GroqClient`] - Groq's OpenAI-compatible API over server-sent events
//! - [`OllamaClient`] - a local Ollama daemon over newline-delimited JSON
//! - [`MockProvider`] - scripted chunks for tests
//!
//! Every backend implements [`LlmProvider`] and reports failures as a
//! classified [`ProviderError`](strata_core::ProviderError).
//! [`ModelLimitsTable`] maps a provider and model name to token limits.
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use strata_model::{CompletionRequest, LlmProvider, OllamaClient};
//!
//! # async fn run() -> Result<(), strata_core::ProviderError> {
//! let ollama = OllamaClient::new("http://localhost:11434")?;
//! let mut stream = ollama
//!     .generate_stream(CompletionRequest::new("You are terse.", "Say hi", "llama3.1"))
//!     .await?;
//! while let Some(chunk) = stream.next().await {
//!     print!("{}", chunk?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod groq;
pub mod limits;
mod lines;
pub mod mock;
pub mod ollama;
pub mod provider;
pub mod registry;

pub use groq::{GroqClient, GroqConfig};
pub use limits::{FALLBACK_LIMITS, ModelLimitsTable};
pub use mock::MockProvider;
pub use ollama::OllamaClient;
pub use provider::{CompletionRequest, LlmProvider, TextStream};
pub use registry::ProviderRegistry;
