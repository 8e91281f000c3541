use crate::error::{Result, StrataError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Groq,
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Groq, ProviderKind::Ollama];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Ollama => "ollama",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Groq => "Groq",
            Self::Ollama => "Ollama (Local)",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "ollama" => Ok(Self::Ollama),
            other => Err(StrataError::InvalidRequest(format!(
                "Unknown provider '{}'. Supported providers: groq, ollama",
                other
            ))),
        }
    }
}

/// Requested verbosity of the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Standard,
    #[default]
    Detailed,
    Comprehensive,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Detailed => "detailed",
            Self::Comprehensive => "comprehensive",
        }
    }

    /// Output tokens the depth asks for before model limits are applied.
    pub fn target_output_tokens(&self) -> u32 {
        match self {
            Self::Standard => 4000,
            Self::Detailed => 8000,
            Self::Comprehensive => 12000,
        }
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Depth {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "detailed" => Ok(Self::Detailed),
            "comprehensive" => Ok(Self::Comprehensive),
            other => Err(StrataError::InvalidRequest(format!(
                "Unknown depth '{}'. Use standard, detailed or comprehensive",
                other
            ))),
        }
    }
}

/// Testing areas the caller wants emphasised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Functional,
    Performance,
    Security,
    Automation,
    Api,
    Accessibility,
    DisasterRecovery,
    DataMigration,
    Mobile,
}

impl FocusArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Functional => "functional",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::Automation => "automation",
            Self::Api => "api",
            Self::Accessibility => "accessibility",
            Self::DisasterRecovery => "disaster_recovery",
            Self::DataMigration => "data_migration",
            Self::Mobile => "mobile",
        }
    }

    /// `disaster_recovery` becomes `Disaster Recovery`.
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromStr for FocusArea {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_lowercase()))
            .map_err(|_| StrataError::InvalidRequest(format!("Unknown focus area '{}'", s)))
    }
}

fn default_true() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.3
}

/// One document generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub jira_ids: Vec<String>,
    #[serde(default = "default_true")]
    pub fetch_children: bool,
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default)]
    pub depth: Depth,
    #[serde(default)]
    pub focus_areas: Vec<FocusArea>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub additional_context: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        jira_ids: impl IntoIterator<Item = impl Into<String>>,
        provider: ProviderKind,
        model: impl Into<String>,
    ) -> Self {
        Self {
            jira_ids: jira_ids.into_iter().map(Into::into).collect(),
            fetch_children: true,
            provider,
            model: model.into(),
            depth: Depth::default(),
            focus_areas: Vec::new(),
            temperature: default_temperature(),
            additional_context: None,
        }
    }

    pub fn with_depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_focus_area(mut self, area: FocusArea) -> Self {
        if !self.focus_areas.contains(&area) {
            self.focus_areas.push(area);
        }
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_fetch_children(mut self, fetch_children: bool) -> Self {
        self.fetch_children = fetch_children;
        self
    }

    pub fn with_additional_context(mut self, context: impl Into<String>) -> Self {
        self.additional_context = Some(context.into());
        self
    }

    /// Trims ticket ids, drops blanks, and checks ranges.
    pub fn normalized(mut self) -> Result<Self> {
        self.jira_ids = self
            .jira_ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if self.jira_ids.is_empty() {
            return Err(StrataError::InvalidRequest("At least one ticket id is required".into()));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(StrataError::InvalidRequest(format!(
                "Temperature {} is outside 0.0..=1.0",
                self.temperature
            )));
        }
        if self.model.trim().is_empty() {
            return Err(StrataError::InvalidRequest("Model cannot be empty".into()));
        }
        Ok(self)
    }
}
