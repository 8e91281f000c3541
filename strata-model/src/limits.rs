//! Context window and output limits per provider and model.

use strata_core::{ModelLimits, ProviderKind};

/// Limits used when the provider itself is not recognized.
pub const FALLBACK_LIMITS: ModelLimits = ModelLimits::new(8192, 4096);

const GROQ_DEFAULT: ModelLimits = ModelLimits::new(131_072, 8192);
const OLLAMA_DEFAULT: ModelLimits = ModelLimits::new(32_768, 4096);

const BUILTIN: &[(ProviderKind, &str, ModelLimits)] = &[
    (ProviderKind::Groq, "llama-3.3-70b-versatile", ModelLimits::new(131_072, 32_768)),
    (ProviderKind::Groq, "llama-3.1-8b-instant", ModelLimits::new(131_072, 131_072)),
    (ProviderKind::Groq, "deepseek-r1-distill-llama-70b", ModelLimits::new(131_072, 16_384)),
    (ProviderKind::Groq, "qwen-qwq-32b", ModelLimits::new(131_072, 16_384)),
    (
        ProviderKind::Groq,
        "meta-llama/llama-4-scout-17b-16e-instruct",
        ModelLimits::new(131_072, 8192),
    ),
    (ProviderKind::Ollama, "llama3.1", ModelLimits::new(128_000, 4096)),
    (ProviderKind::Ollama, "mistral", ModelLimits::new(32_000, 4096)),
    (ProviderKind::Ollama, "qwen2.5", ModelLimits::new(128_000, 4096)),
    (ProviderKind::Ollama, "gemma2", ModelLimits::new(8000, 4096)),
];

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    provider: ProviderKind,
    pattern: String,
    limits: ModelLimits,
}

/// Lookup table keyed by provider and a model-name substring.
///
/// Entries are matched in order and the first pattern contained in the model
/// name wins. Entries added with [`ModelLimitsTable::with_entry`] are checked
/// before the built-in ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelLimitsTable {
    entries: Vec<Entry>,
}

impl Default for ModelLimitsTable {
    fn default() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(provider, pattern, limits)| Entry {
                    provider: *provider,
                    pattern: (*pattern).to_string(),
                    limits: *limits,
                })
                .collect(),
        }
    }
}

impl ModelLimitsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(
        mut self,
        provider: ProviderKind,
        pattern: impl Into<String>,
        limits: ModelLimits,
    ) -> Self {
        self.entries.insert(0, Entry { provider, pattern: pattern.into(), limits });
        self
    }

    pub fn provider_default(provider: ProviderKind) -> ModelLimits {
        match provider {
            ProviderKind::Groq => GROQ_DEFAULT,
            ProviderKind::Ollama => OLLAMA_DEFAULT,
        }
    }

    pub fn limits_for(&self, provider: ProviderKind, model: &str) -> ModelLimits {
        self.entries
            .iter()
            .find(|entry| entry.provider == provider && model.contains(entry.pattern.as_str()))
            .map(|entry| entry.limits)
            .unwrap_or_else(|| Self::provider_default(provider))
    }

    /// Like [`limits_for`](Self::limits_for) but with a free-form provider
    /// name; unknown providers get [`FALLBACK_LIMITS`].
    pub fn lookup(&self, provider: &str, model: &str) -> ModelLimits {
        match provider.parse::<ProviderKind>() {
            Ok(kind) => self.limits_for(kind, model),
            Err(_) => FALLBACK_LIMITS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_models() {
        let table = ModelLimitsTable::new();
        assert_eq!(
            table.limits_for(ProviderKind::Groq, "llama-3.3-70b-versatile"),
            ModelLimits::new(131_072, 32_768)
        );
        assert_eq!(
            table.limits_for(ProviderKind::Ollama, "llama3.1:70b"),
            ModelLimits::new(128_000, 4096)
        );
    }

    #[test]
    fn test_defaults() {
        let table = ModelLimitsTable::new();
        assert_eq!(table.limits_for(ProviderKind::Groq, "unknown"), GROQ_DEFAULT);
        assert_eq!(table.limits_for(ProviderKind::Ollama, "phi3"), OLLAMA_DEFAULT);
        assert_eq!(table.lookup("openai", "gpt-4o"), FALLBACK_LIMITS);
        assert_eq!(table.lookup("GROQ", "qwen-qwq-32b"), ModelLimits::new(131_072, 16_384));
    }

    #[test]
    fn test_added_entries_take_precedence() {
        let table = ModelLimitsTable::new().with_entry(
            ProviderKind::Ollama,
            "llama3.1:70b",
            ModelLimits::new(64_000, 2048),
        );
        assert_eq!(
            table.limits_for(ProviderKind::Ollama, "llama3.1:70b"),
            ModelLimits::new(64_000, 2048)
        );
        assert_eq!(table.limits_for(ProviderKind::Ollama, "llama3.1"), ModelLimits::new(128_000, 4096));
    }

    proptest! {
        #[test]
        fn prop_lookup_is_never_zero(provider in "[a-z]{0,8}", model in "[a-z0-9.:-]{0,24}") {
            let limits = ModelLimitsTable::new().lookup(&provider, &model);
            prop_assert!(limits.context_window > 0);
            prop_assert!(limits.max_output_tokens > 0);
        }
    }
}
