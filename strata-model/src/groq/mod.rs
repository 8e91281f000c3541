//! Groq provider: OpenAI-compatible chat completions streamed over SSE.

mod client;
mod config;

pub use client::GroqClient;
pub use config::{GROQ_API_BASE, GroqConfig, PREFERRED_MODELS, order_models};
