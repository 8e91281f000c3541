//! Progressive reduction of an [`AggregatedContext`] until it fits a model's
//! context window.
//!
//! Reduction runs through [`REDUCTION_LEVELS`] in order. Every level takes the
//! previous level's output and only removes or shortens content, so the token
//! estimate never grows from one level to the next.

use crate::aggregator::truncate_chars;
use serde::Serialize;
use strata_core::{AggregatedContext, FeatureArea, ModelLimits, StorySummary};

/// Appended to descriptions cut at level 2.
pub const TRUNCATION_MARKER: &str = "… [truncated]";
const LEVEL2_DESCRIPTION_CHARS: usize = 200;

/// Approximate token count of a text: characters ÷ 4.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Token estimate of a context's compact JSON serialization.
pub fn context_tokens(context: &AggregatedContext) -> usize {
    serde_json::to_string(context).map(|json| estimate_tokens(&json)).unwrap_or(0)
}

/// One reduction step.
pub struct ReductionLevel {
    pub level: u8,
    pub description: &'static str,
    pub apply: fn(&AggregatedContext) -> AggregatedContext,
}

pub const REDUCTION_LEVELS: [ReductionLevel; 4] = [
    ReductionLevel { level: 1, description: "Comments removed", apply: drop_comments },
    ReductionLevel {
        level: 2,
        description: "Long descriptions truncated",
        apply: truncate_descriptions,
    },
    ReductionLevel {
        level: 3,
        description: "Stories, acceptance criteria and concerns capped",
        apply: cap_collections,
    },
    ReductionLevel { level: 4, description: "Only essential info retained", apply: essentials },
];

fn drop_comments(context: &AggregatedContext) -> AggregatedContext {
    AggregatedContext { comments_summary: None, ..context.clone() }
}

// Stories carry no description, so only the feature-area text is cut.
fn truncate_descriptions(context: &AggregatedContext) -> AggregatedContext {
    let marker_chars = TRUNCATION_MARKER.chars().count();
    let feature_areas = context
        .feature_areas
        .iter()
        .map(|area| {
            let description = area.description.as_ref().map(|text| {
                if text.chars().count() > LEVEL2_DESCRIPTION_CHARS {
                    let kept = truncate_chars(text, LEVEL2_DESCRIPTION_CHARS - marker_chars);
                    format!("{}{}", kept, TRUNCATION_MARKER)
                } else {
                    text.clone()
                }
            });
            FeatureArea { description, ..area.clone() }
        })
        .collect();
    AggregatedContext { feature_areas, ..context.clone() }
}

fn cap_collections(context: &AggregatedContext) -> AggregatedContext {
    let feature_areas = context
        .feature_areas
        .iter()
        .map(|area| FeatureArea {
            acceptance_criteria: area.acceptance_criteria.iter().take(3).cloned().collect(),
            stories: area
                .stories
                .iter()
                .take(10)
                .map(|story| StorySummary {
                    key: story.key.clone(),
                    summary: story.summary.clone(),
                    issue_type: story.issue_type.clone(),
                    priority: story.priority.clone(),
                })
                .collect(),
            ..area.clone()
        })
        .collect();
    AggregatedContext {
        feature_areas,
        cross_cutting_concerns: context.cross_cutting_concerns.iter().take(3).cloned().collect(),
        ..context.clone()
    }
}

fn essentials(context: &AggregatedContext) -> AggregatedContext {
    let mut project_summary = context.project_summary.clone();
    project_summary.components.truncate(5);
    project_summary.labels.truncate(5);

    let feature_areas = context
        .feature_areas
        .iter()
        .map(|area| FeatureArea {
            epic_key: area.epic_key.clone(),
            epic_title: area.epic_title.clone(),
            description: None,
            priority: area.priority.clone(),
            stories: area.stories.iter().take(5).map(StorySummary::stub).collect(),
            acceptance_criteria: Vec::new(),
            risk_indicators: area.risk_indicators.iter().take(3).cloned().collect(),
        })
        .collect();

    AggregatedContext {
        project_summary,
        feature_areas,
        cross_cutting_concerns: context.cross_cutting_concerns.iter().take(2).cloned().collect(),
        technical_context: context.technical_context.clone(),
        comments_summary: None,
    }
}

/// Fixed prompt overhead reserved out of the context window, in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overhead {
    pub system_prompt: u32,
    pub template: u32,
    pub safety_buffer: u32,
}

impl Default for Overhead {
    fn default() -> Self {
        Self { system_prompt: 2000, template: 1500, safety_buffer: 500 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationMetadata {
    pub context_window: u32,
    pub reserved: u32,
    /// Negative when the overhead alone exceeds the window.
    pub available_for_context: i64,
    pub original_tokens: usize,
    pub final_tokens: usize,
    pub optimization_level: u8,
    pub utilization_pct: f64,
    pub truncated: bool,
}

impl OptimizationMetadata {
    /// Human-readable summary of the optimization outcome.
    pub fn recommendation(&self) -> String {
        let utilization = self.utilization_pct;
        match self.optimization_level {
            0 if utilization > 80.0 => format!(
                "Context utilization: {}%. Consider using 'Detailed' depth for more comprehensive output.",
                utilization
            ),
            0 => format!("Context utilization: {}%. Optimal.", utilization),
            4 => format!(
                "Context highly optimized (level 4): Only essential info retained. Utilization: {}%. Consider selecting fewer tickets.",
                utilization
            ),
            level => {
                let description = REDUCTION_LEVELS
                    .iter()
                    .find(|l| l.level == level)
                    .map(|l| l.description)
                    .unwrap_or("Reduced");
                format!(
                    "Context optimized (level {}): {}. Utilization: {}%.",
                    level, description, utilization
                )
            }
        }
    }
}

/// Fits aggregated context into one model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextOptimizer {
    limits: ModelLimits,
    output_tokens: u32,
    overhead: Overhead,
}

impl ContextOptimizer {
    /// `output_tokens` is the requested generation length; it is capped at the
    /// model's output limit when reserving space.
    pub fn new(limits: ModelLimits, output_tokens: u32) -> Self {
        Self { limits, output_tokens, overhead: Overhead::default() }
    }

    pub fn with_overhead(mut self, overhead: Overhead) -> Self {
        self.overhead = overhead;
        self
    }

    pub fn reserved(&self) -> u32 {
        self.overhead.system_prompt
            + self.overhead.template
            + self.output_tokens.min(self.limits.max_output_tokens)
            + self.overhead.safety_buffer
    }

    pub fn available(&self) -> i64 {
        i64::from(self.limits.context_window) - i64::from(self.reserved())
    }

    fn fits(&self, tokens: usize) -> bool {
        i64::try_from(tokens).map(|t| t <= self.available()).unwrap_or(false)
    }

    /// Returns the first reduction that fits, or the level-4 result if none
    /// does. Never fails.
    pub fn optimize(&self, context: &AggregatedContext) -> (AggregatedContext, OptimizationMetadata) {
        let original_tokens = context_tokens(context);

        let mut current = context.clone();
        let mut current_tokens = original_tokens;
        let mut level = 0;

        if !self.fits(current_tokens) {
            for reduction in &REDUCTION_LEVELS {
                current = (reduction.apply)(&current);
                current_tokens = context_tokens(&current);
                level = reduction.level;
                tracing::debug!(
                    level,
                    tokens = current_tokens,
                    available = self.available(),
                    "applied context reduction: {}",
                    reduction.description
                );
                if self.fits(current_tokens) {
                    break;
                }
            }
        }

        if !self.fits(current_tokens) {
            tracing::warn!(
                tokens = current_tokens,
                available = self.available(),
                "context still exceeds budget after maximum reduction"
            );
        }

        let metadata = OptimizationMetadata {
            context_window: self.limits.context_window,
            reserved: self.reserved(),
            available_for_context: self.available(),
            original_tokens,
            final_tokens: current_tokens,
            optimization_level: level,
            utilization_pct: utilization(current_tokens, self.available()),
            truncated: level > 0,
        };
        (current, metadata)
    }
}

/// Percentage of the available budget used, rounded to one decimal. A
/// non-positive budget is treated as one token so the overage stays visible.
fn utilization(tokens: usize, available: i64) -> f64 {
    let pct = tokens as f64 / available.max(1) as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ProjectSummary;

    fn sample() -> AggregatedContext {
        AggregatedContext {
            project_summary: ProjectSummary {
                total_tickets: 30,
                components: (0..8).map(|n| format!("component-{n}")).collect(),
                labels: (0..8).map(|n| format!("label-{n}")).collect(),
                ..Default::default()
            },
            feature_areas: vec![FeatureArea {
                epic_key: "P-1".into(),
                epic_title: "Payments".into(),
                description: Some("d".repeat(450)),
                priority: Some("High".into()),
                stories: (0..20)
                    .map(|n| StorySummary {
                        key: format!("P-{}", n + 2),
                        summary: format!("Story number {n}"),
                        issue_type: Some("Story".into()),
                        priority: Some("Medium".into()),
                    })
                    .collect(),
                acceptance_criteria: (0..8).map(|n| format!("[P-{n}] criteria...")).collect(),
                risk_indicators: (0..6).map(|n| format!("risk {n}")).collect(),
            }],
            cross_cutting_concerns: (0..5).map(|n| format!("concern {n}")).collect(),
            technical_context: Some("Detected technology signals: React frontend".into()),
            comments_summary: Some("Key discussion points from 4 comments analyzed.".into()),
        }
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("Hello world"), 2);
        assert_eq!(estimate_tokens("ééééé"), 1);
    }

    #[test]
    fn test_reserved_caps_output_at_model_limit() {
        let optimizer = ContextOptimizer::new(ModelLimits::new(32768, 4096), 8000);
        assert_eq!(optimizer.reserved(), 2000 + 1500 + 4096 + 500);
        assert_eq!(optimizer.available(), 32768 - 8096);
    }

    #[test]
    fn test_fits_returns_unchanged() {
        let context = sample();
        let (out, meta) = ContextOptimizer::new(ModelLimits::new(131072, 8192), 8000).optimize(&context);
        assert_eq!(out, context);
        assert_eq!(meta.optimization_level, 0);
        assert!(!meta.truncated);
        assert_eq!(meta.final_tokens, meta.original_tokens);
    }

    #[test]
    fn test_level_two_description_length() {
        let reduced = truncate_descriptions(&sample());
        let description = reduced.feature_areas[0].description.as_deref().unwrap();
        assert_eq!(description.chars().count(), LEVEL2_DESCRIPTION_CHARS);
        assert!(description.ends_with(TRUNCATION_MARKER));

        let short = AggregatedContext {
            feature_areas: vec![FeatureArea { description: Some("brief".into()), ..Default::default() }],
            ..Default::default()
        };
        assert_eq!(truncate_descriptions(&short), short);
    }

    #[test]
    fn test_essentials_shape() {
        let reduced = essentials(&sample());
        let area = &reduced.feature_areas[0];
        assert!(area.description.is_none());
        assert!(area.acceptance_criteria.is_empty());
        assert_eq!(area.stories.len(), 5);
        assert!(area.stories.iter().all(|s| s.issue_type.is_none() && s.priority.is_none()));
        assert_eq!(area.risk_indicators.len(), 3);
        assert_eq!(reduced.project_summary.components.len(), 5);
        assert_eq!(reduced.cross_cutting_concerns.len(), 2);
        assert!(reduced.technical_context.is_some());
        assert!(reduced.comments_summary.is_none());
    }

    #[test]
    fn test_over_budget_returns_level_four() {
        // 8192 - (2000 + 1500 + 4000 + 500) leaves 192 tokens.
        let optimizer = ContextOptimizer::new(ModelLimits::new(8192, 4096), 4000);
        let (out, meta) = optimizer.optimize(&sample());
        assert_eq!(meta.optimization_level, 4);
        assert!(meta.truncated);
        assert_eq!(meta.final_tokens, context_tokens(&out));
        assert!(meta.final_tokens < meta.original_tokens);
    }

    #[test]
    fn test_negative_budget_utilization() {
        let optimizer = ContextOptimizer::new(ModelLimits::new(4000, 4096), 4000);
        assert!(optimizer.available() < 0);
        let (_, meta) = optimizer.optimize(&sample());
        assert_eq!(meta.optimization_level, 4);
        assert!(meta.utilization_pct > 100.0);
    }

    #[test]
    fn test_recommendation_text() {
        let mut meta = OptimizationMetadata {
            context_window: 1,
            reserved: 0,
            available_for_context: 1,
            original_tokens: 0,
            final_tokens: 0,
            optimization_level: 0,
            utilization_pct: 12.5,
            truncated: false,
        };
        assert_eq!(meta.recommendation(), "Context utilization: 12.5%. Optimal.");
        meta.optimization_level = 1;
        assert_eq!(
            meta.recommendation(),
            "Context optimized (level 1): Comments removed. Utilization: 12.5%."
        );
        meta.optimization_level = 4;
        assert!(meta.recommendation().starts_with("Context highly optimized (level 4)"));
    }
}
