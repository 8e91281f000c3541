//! Aggregated project context handed from the aggregator to the optimizer and
//! prompt builder.
//!
//! Optional and empty fields are skipped during serialization so that every
//! reduction the optimizer applies is visible in the serialized size.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the synthetic feature area holding tickets when no epic was fetched.
pub const GENERAL_AREA_KEY: &str = "GENERAL";
pub const GENERAL_AREA_TITLE: &str = "General Features";
pub const GENERAL_AREA_DESCRIPTION: &str = "Features not associated with a specific epic";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedContext {
    pub project_summary: ProjectSummary,
    #[serde(default)]
    pub feature_areas: Vec<FeatureArea>,
    #[serde(default)]
    pub cross_cutting_concerns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments_summary: Option<String>,
}

impl AggregatedContext {
    pub fn total_stories(&self) -> usize {
        self.feature_areas.iter().map(|area| area.stories.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub total_tickets: usize,
    /// `"KEY: summary"` per fetched epic.
    #[serde(default)]
    pub epics: Vec<String>,
    #[serde(default)]
    pub issue_type_breakdown: BTreeMap<String, usize>,
    #[serde(default)]
    pub priority_breakdown: BTreeMap<String, usize>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureArea {
    pub epic_key: String,
    pub epic_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default)]
    pub stories: Vec<StorySummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub risk_indicators: Vec<String>,
}

impl FeatureArea {
    pub fn is_general(&self) -> bool {
        self.epic_key == GENERAL_AREA_KEY
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorySummary {
    pub key: String,
    pub summary: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl StorySummary {
    /// Reduces the story to its key and summary.
    pub fn stub(&self) -> Self {
        Self { key: self.key.clone(), summary: self.summary.clone(), ..Default::default() }
    }
}
