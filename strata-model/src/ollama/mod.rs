//! Ollama provider: local models streamed as newline-delimited JSON.

mod client;

pub use client::{DEFAULT_NUM_CTX, OLLAMA_DEFAULT_BASE, OllamaClient, READ_TIMEOUT};
