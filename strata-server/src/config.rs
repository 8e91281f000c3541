use std::sync::Arc;
use std::time::Duration;
use strata_core::{ProviderError, Settings};
use strata_jira::{JiraClient, JiraConfig};
use strata_model::ProviderRegistry;
use strata_prompt::FileTemplateSource;
use strata_runner::Generator;

/// Request limits and CORS policy.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Allowed origins for CORS (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Maximum request body size in bytes (default: 2MB)
    pub max_body_size: usize,
    /// Time allowed to produce response headers (default: 120 seconds).
    /// Streaming bodies are not bounded by it.
    pub request_timeout: Duration,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_body_size: 2 * 1024 * 1024,
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Everything the HTTP handlers share.
#[derive(Clone)]
pub struct ServerConfig {
    pub settings: Arc<Settings>,
    pub generator: Generator,
    pub security: SecurityConfig,
}

impl ServerConfig {
    pub fn new(settings: Arc<Settings>, generator: Generator) -> Self {
        Self { settings, generator, security: SecurityConfig::default() }
    }

    /// Wires the Jira client, the outline file and both LLM backends from `settings`.
    pub fn from_settings(settings: Settings) -> Result<Self, ProviderError> {
        let tickets = Arc::new(JiraClient::new(JiraConfig::from_settings(&settings)));
        let templates = Arc::new(FileTemplateSource::new(settings.template_path.clone()));
        let providers = ProviderRegistry::from_settings(&settings)?;
        let generator = Generator::new(tickets, templates, providers);
        Ok(Self::new(Arc::new(settings), generator))
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }
}
