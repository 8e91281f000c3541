//! Process configuration.
//!
//! [`Settings`] is built once from the environment and then shared read-only.
//! Requests take an `Arc<Settings>` snapshot when they start.

use crate::request::{Depth, ProviderKind};
use serde::Serialize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_AC_FIELD: &str = "customfield_10016";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
pub const DEFAULT_TEMPLATE_PATH: &str = "./teststrategy.txt";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// A configuration field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into(), suggestion: None }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub jira_base_url: String,
    pub jira_email: String,
    pub jira_api_token: String,
    pub jira_acceptance_criteria_field: String,

    pub groq_api_key: String,
    pub groq_default_model: String,

    pub ollama_base_url: String,
    pub ollama_default_model: String,

    pub default_provider: ProviderKind,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,

    pub template_path: PathBuf,
    pub default_depth: Depth,

    pub bind_address: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            jira_base_url: String::new(),
            jira_email: String::new(),
            jira_api_token: String::new(),
            jira_acceptance_criteria_field: DEFAULT_AC_FIELD.to_string(),
            groq_api_key: String::new(),
            groq_default_model: DEFAULT_GROQ_MODEL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_default_model: DEFAULT_OLLAMA_MODEL.to_string(),
            default_provider: ProviderKind::Groq,
            llm_temperature: 0.3,
            llm_max_tokens: 8192,
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            default_depth: Depth::Detailed,
            bind_address: DEFAULT_BIND.to_string(),
        }
    }
}

impl Settings {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("JIRA_BASE_URL") {
            settings.jira_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(email) = get("JIRA_EMAIL") {
            settings.jira_email = email;
        }
        if let Some(token) = get("JIRA_API_TOKEN") {
            settings.jira_api_token = token;
        }
        if let Some(field) = get("JIRA_ACCEPTANCE_CRITERIA_FIELD") {
            settings.jira_acceptance_criteria_field = field;
        }
        if let Some(key) = get("GROQ_API_KEY") {
            settings.groq_api_key = key;
        }
        if let Some(model) = get("GROQ_DEFAULT_MODEL") {
            settings.groq_default_model = model;
        }
        if let Some(url) = get("OLLAMA_BASE_URL") {
            settings.ollama_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("OLLAMA_DEFAULT_MODEL") {
            settings.ollama_default_model = model;
        }
        if let Some(provider) = get("DEFAULT_PROVIDER") {
            settings.default_provider = provider.parse().map_err(|_| {
                ValidationError::new("DEFAULT_PROVIDER", format!("Unknown provider '{}'", provider))
                    .with_suggestion("Use one of: groq, ollama")
            })?;
        }
        if let Some(temperature) = get("LLM_TEMPERATURE") {
            settings.llm_temperature = temperature.parse().map_err(|_| {
                ValidationError::new("LLM_TEMPERATURE", format!("'{}' is not a number", temperature))
            })?;
        }
        if let Some(max_tokens) = get("LLM_MAX_TOKENS") {
            settings.llm_max_tokens = max_tokens.parse().map_err(|_| {
                ValidationError::new(
                    "LLM_MAX_TOKENS",
                    format!("'{}' is not a positive integer", max_tokens),
                )
            })?;
        }
        if let Some(path) = get("TEMPLATE_PATH") {
            settings.template_path = PathBuf::from(path);
        }
        if let Some(depth) = get("DEFAULT_DEPTH") {
            settings.default_depth = depth.parse().map_err(|_| {
                ValidationError::new("DEFAULT_DEPTH", format!("Unknown depth '{}'", depth))
                    .with_suggestion("Use one of: standard, detailed, comprehensive")
            })?;
        }
        if let Some(bind) = get("STRATA_BIND") {
            settings.bind_address = bind;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Checks value ranges. Missing credentials are not errors here; the
    /// adapters report them when they are used.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.llm_temperature) {
            return Err(ValidationError::new(
                "LLM_TEMPERATURE",
                format!("Temperature {} is out of range", self.llm_temperature),
            )
            .with_suggestion("Use a value between 0.0 and 1.0"));
        }
        if self.llm_max_tokens == 0 {
            return Err(ValidationError::new("LLM_MAX_TOKENS", "Max tokens must be positive"));
        }
        if !self.jira_base_url.is_empty()
            && !(self.jira_base_url.starts_with("http://")
                || self.jira_base_url.starts_with("https://"))
        {
            return Err(ValidationError::new("JIRA_BASE_URL", "URL must start with http(s)://")
                .with_suggestion("For example https://your-domain.atlassian.net"));
        }
        Ok(())
    }

    pub fn jira_configured(&self) -> bool {
        !self.jira_base_url.is_empty()
            && !self.jira_email.is_empty()
            && !self.jira_api_token.is_empty()
    }

    pub fn default_model(&self, provider: ProviderKind) -> &str {
        match provider {
            ProviderKind::Groq => &self.groq_default_model,
            ProviderKind::Ollama => &self.ollama_default_model,
        }
    }

    /// View of the settings that is safe to print or return to clients.
    pub fn redacted(&self) -> RedactedSettings {
        RedactedSettings {
            jira_base_url: self.jira_base_url.clone(),
            jira_email: self.jira_email.clone(),
            jira_acceptance_criteria_field: self.jira_acceptance_criteria_field.clone(),
            jira_api_token_set: !self.jira_api_token.is_empty(),
            jira_api_token_masked: mask_sensitive(&self.jira_api_token),
            groq_default_model: self.groq_default_model.clone(),
            groq_api_key_set: !self.groq_api_key.is_empty(),
            groq_api_key_masked: mask_sensitive(&self.groq_api_key),
            ollama_base_url: self.ollama_base_url.clone(),
            ollama_default_model: self.ollama_default_model.clone(),
            default_provider: self.default_provider,
            llm_temperature: self.llm_temperature,
            llm_max_tokens: self.llm_max_tokens,
            template_path: self.template_path.display().to_string(),
            default_depth: self.default_depth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedactedSettings {
    pub jira_base_url: String,
    pub jira_email: String,
    pub jira_acceptance_criteria_field: String,
    pub jira_api_token_set: bool,
    pub jira_api_token_masked: String,
    pub groq_default_model: String,
    pub groq_api_key_set: bool,
    pub groq_api_key_masked: String,
    pub ollama_base_url: String,
    pub ollama_default_model: String,
    pub default_provider: ProviderKind,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub template_path: String,
    pub default_depth: Depth,
}

/// Keeps the first and last four characters of a secret.
pub fn mask_sensitive(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
