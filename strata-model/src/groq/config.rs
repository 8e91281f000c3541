//! Configuration for the Groq provider.

use serde::{Deserialize, Serialize};

/// Default Groq API base URL.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Models listed first, in this order, whenever Groq models are enumerated.
/// Also returned as-is when discovery fails.
pub const PREFERRED_MODELS: [&str; 5] = [
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "deepseek-r1-distill-llama-70b",
    "qwen-qwq-32b",
    "meta-llama/llama-4-scout-17b-16e-instruct",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    pub api_key: String,
    /// Custom base URL, mainly for tests against a local server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl GroqConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), base_url: None }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(GROQ_API_BASE).trim_end_matches('/')
    }
}

/// Orders discovered model ids: each preferred name first (every discovered
/// id containing it, in discovery order), then everything else.
pub fn order_models(discovered: &[String]) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::with_capacity(discovered.len());
    for preferred in PREFERRED_MODELS {
        for id in discovered.iter().filter(|id| id.contains(preferred)) {
            if !ordered.contains(id) {
                ordered.push(id.clone());
            }
        }
    }
    for id in discovered {
        if !ordered.contains(id) {
            ordered.push(id.clone());
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(GroqConfig::new("k").effective_base_url(), GROQ_API_BASE);
        assert_eq!(
            GroqConfig::new("k").with_base_url("http://localhost:9000/").effective_base_url(),
            "http://localhost:9000"
        );
    }

    #[test]
    fn test_order_models() {
        let discovered: Vec<String> = ["whisper-large-v3", "qwen-qwq-32b", "llama-3.3-70b-versatile"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            order_models(&discovered),
            vec!["llama-3.3-70b-versatile", "qwen-qwq-32b", "whisper-large-v3"]
        );
    }
}
