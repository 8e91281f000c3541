//! Prompt rendering for whole-document and single-section generation.
//!
//! Everything here is a pure function of its inputs.

use crate::depth::depth_instructions;
use crate::template::render_outline;
use std::collections::BTreeMap;
use strata_core::{AggregatedContext, Depth, FocusArea, TemplateSection};

/// Short system prompt sent with every generation call.
pub const GENERATION_SYSTEM_PROMPT: &str =
    "You are a Principal QA Architect generating test strategy documents.";

/// System prompt for regenerating a single section on request.
pub const REGENERATE_SYSTEM_PROMPT: &str =
    "You are a Principal QA Architect. Regenerate only the requested section.";

/// Full role description for callers that want a richer system prompt.
pub const QA_ARCHITECT_SYSTEM_PROMPT: &str = r#"You are a Principal QA Architect and Test Strategist with two decades of enterprise quality assurance experience in fintech, healthcare, e-commerce and SaaS.

You write enterprise-grade Test Strategy documents from three inputs:
1. A template structure that you MUST follow exactly
2. Issue tracker context: epics, stories, priorities, risks and requirements
3. Any extra context supplied by the user

Rules:
1. A Test Strategy is strategic, not a test plan. Cover why we test (risk, business impact, compliance), what kinds of testing are needed and in what priority, how testing is organised, who owns what, and when quality gates apply. Never list individual test cases.
2. Every template section gets substantive, project-specific content. No placeholders, no boilerplate.
3. Derive recommendations from the ticket context. API work implies an API testing strategy. Payments or personal data imply heavier security testing. Mobile components imply a mobile strategy. Performance labels imply a performance approach. Use priorities to allocate risk-based effort.
4. Be concrete: name tools that fit the implied stack, give coverage targets with reasons, metrics with target values, and realistic risks with mitigations.
5. Use professional QA terminology at an executive reading level.
6. Stay consistent across sections: a tool chosen for automation reappears in environments and reporting.
7. Write clean Markdown whose heading hierarchy matches the template. Use tables where the template does.
"#;

const STORY_LIMIT: usize = 8;
const CRITERIA_LIMIT: usize = 3;
const CRITERIA_CHARS: usize = 100;
const RISK_LIMIT: usize = 5;
const DESCRIPTION_CHARS: usize = 300;
const PREVIOUS_SECTIONS_CHARS: usize = 2000;
/// Tail of earlier output carried into a section prompt.
pub const PREVIOUS_CONTENT_TAIL_CHARS: usize = 3000;

/// Everything a prompt is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    pub sections: &'a [TemplateSection],
    pub context: &'a AggregatedContext,
    pub depth: Depth,
    pub focus_areas: &'a [FocusArea],
    pub additional_context: Option<&'a str>,
}

fn head_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn tail_chars(text: &str, max: usize) -> &str {
    let total = text.chars().count();
    if total <= max {
        return text;
    }
    match text.char_indices().nth(total - max) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

fn render_counts(counts: &BTreeMap<String, usize>) -> String {
    counts.iter().map(|(name, n)| format!("{}: {}", name, n)).collect::<Vec<_>>().join(", ")
}

/// Prompt for generating the whole document in one call.
///
/// `previous_sections` is earlier output to stay consistent with; only its
/// first 2000 characters are included.
pub fn build_generation_prompt(inputs: &PromptInputs<'_>, previous_sections: Option<&str>) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(depth_instructions(inputs.depth).to_string());
    lines.push(String::new());

    lines.push("## TEST STRATEGY TEMPLATE STRUCTURE".into());
    lines.push("Follow this exact structure for your response:".into());
    lines.push(String::new());
    lines.push(render_outline(inputs.sections));
    lines.push(String::new());

    if let Some(previous) = previous_sections.filter(|p| !p.is_empty()) {
        lines.push("## PREVIOUSLY GENERATED SECTIONS".into());
        lines.push("Keep the new content consistent with these sections:".into());
        lines.push(String::new());
        lines.push(head_chars(previous, PREVIOUS_SECTIONS_CHARS).to_string());
        lines.push(String::new());
    }

    lines.push("## JIRA PROJECT CONTEXT".into());
    lines.push(String::new());
    render_project_summary(inputs.context, &mut lines);
    render_feature_areas(inputs.context, &mut lines);

    let context = inputs.context;
    if !context.cross_cutting_concerns.is_empty() {
        lines.push("### Cross-Cutting Concerns Identified".into());
        lines.extend(context.cross_cutting_concerns.iter().map(|c| format!("- {}", c)));
        lines.push(String::new());
    }

    if let Some(technical) = &context.technical_context {
        lines.push("### Technical Context Signals".into());
        lines.push(technical.clone());
        lines.push(String::new());
    }

    if let Some(comments) = &context.comments_summary {
        lines.push("### Key Discussion Points".into());
        lines.push(comments.clone());
        lines.push(String::new());
    }

    if !inputs.focus_areas.is_empty() {
        lines.push("### User-Selected Focus Areas".into());
        lines.push("Emphasize these areas in your strategy:".into());
        lines.extend(inputs.focus_areas.iter().map(|area| format!("- ☑ {}", area.title())));
        lines.push(String::new());
    }

    if let Some(extra) = inputs.additional_context.filter(|c| !c.trim().is_empty()) {
        lines.push("### Additional Context Provided by User".into());
        lines.push(extra.to_string());
        lines.push(String::new());
    }

    lines.push("---".into());
    lines.push(String::new());
    lines.push(
        "Generate the complete Test Strategy document now, following the template structure exactly."
            .into(),
    );
    lines.push(
        "Populate every section with project-specific, actionable content derived from the JIRA context above."
            .into(),
    );
    lines.push(
        "Do not emit placeholders such as '[fill in]'. Where context is missing, make an informed recommendation and state the assumption."
            .into(),
    );

    lines.join("\n")
}

fn render_project_summary(context: &AggregatedContext, lines: &mut Vec<String>) {
    let summary = &context.project_summary;
    lines.push("### Project Summary".into());
    lines.push(format!("- **Total Tickets Analyzed**: {}", summary.total_tickets));
    let epics =
        if summary.epics.is_empty() { "None specified".to_string() } else { summary.epics.join(", ") };
    lines.push(format!("- **Epics**: {}", epics));
    if !summary.issue_type_breakdown.is_empty() {
        lines.push(format!("- **Issue Types**: {}", render_counts(&summary.issue_type_breakdown)));
    }
    if !summary.priority_breakdown.is_empty() {
        lines.push(format!(
            "- **Priority Distribution**: {}",
            render_counts(&summary.priority_breakdown)
        ));
    }
    if !summary.components.is_empty() {
        lines.push(format!("- **Components**: {}", summary.components.join(", ")));
    }
    if !summary.labels.is_empty() {
        lines.push(format!("- **Labels**: {}", summary.labels.join(", ")));
    }
    lines.push(String::new());
}

fn render_feature_areas(context: &AggregatedContext, lines: &mut Vec<String>) {
    lines.push("### Feature Areas".into());
    for area in &context.feature_areas {
        lines.push(String::new());
        lines.push(format!("#### {}: {}", area.epic_key, area.epic_title));
        lines.push(format!("- **Priority**: {}", area.priority.as_deref().unwrap_or("Not set")));

        if let Some(description) = area.description.as_deref().filter(|d| !d.is_empty()) {
            let shown = if description.chars().count() > DESCRIPTION_CHARS {
                format!("{}...", head_chars(description, DESCRIPTION_CHARS))
            } else {
                description.to_string()
            };
            lines.push(format!("- **Description**: {}", shown));
        }

        if !area.stories.is_empty() {
            lines.push(format!("- **Related Tickets** ({}):", area.stories.len()));
            for story in area.stories.iter().take(STORY_LIMIT) {
                let mut line = format!("  - {}: {}", story.key, story.summary);
                if story.issue_type.is_some() || story.priority.is_some() {
                    line.push_str(&format!(
                        " ({}, {})",
                        story.issue_type.as_deref().unwrap_or("Ticket"),
                        story.priority.as_deref().unwrap_or("No priority")
                    ));
                }
                lines.push(line);
            }
            if area.stories.len() > STORY_LIMIT {
                lines.push(format!("  - ... and {} more", area.stories.len() - STORY_LIMIT));
            }
        }

        if !area.acceptance_criteria.is_empty() {
            lines.push("- **Acceptance Criteria**:".into());
            for criteria in area.acceptance_criteria.iter().take(CRITERIA_LIMIT) {
                lines.push(format!("  - {}...", head_chars(criteria, CRITERIA_CHARS)));
            }
        }

        if !area.risk_indicators.is_empty() {
            let risks: Vec<&str> =
                area.risk_indicators.iter().take(RISK_LIMIT).map(String::as_str).collect();
            lines.push(format!("- **Risk Indicators**: {}", risks.join(", ")));
        }
    }
    lines.push(String::new());
}

/// Prompt for generating one top-level section.
///
/// Only the last 3000 characters of `previous_content` are included.
pub fn build_section_prompt(
    inputs: &PromptInputs<'_>,
    section: &TemplateSection,
    previous_content: &str,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(depth_instructions(inputs.depth).to_string());
    lines.push(String::new());

    lines.push(format!("## SECTION TO GENERATE: {}. {}", section.number, section.title));
    lines.push(String::new());

    if !section.subsections.is_empty() {
        lines.push("This section includes the following subsections:".into());
        lines.extend(
            section.subsections.iter().map(|sub| format!("- {}. {}", sub.number, sub.title)),
        );
        lines.push(String::new());
    }

    lines.push("## FULL TEMPLATE STRUCTURE (for context)".into());
    lines.push(render_outline(inputs.sections));
    lines.push(String::new());

    lines.push("## PREVIOUSLY GENERATED CONTENT (for consistency)".into());
    lines.push(tail_chars(previous_content, PREVIOUS_CONTENT_TAIL_CHARS).to_string());
    lines.push(String::new());

    let summary = &inputs.context.project_summary;
    lines.push("## PROJECT CONTEXT".into());
    lines.push(format!("- Total Tickets: {}", summary.total_tickets));
    let epics: Vec<&str> = summary.epics.iter().take(3).map(String::as_str).collect();
    lines.push(format!("- Epics: {}", epics.join(", ")));
    lines.push(format!("- Issue Types: {}", render_counts(&summary.issue_type_breakdown)));
    lines.push(String::new());

    if !inputs.focus_areas.is_empty() {
        let focus: Vec<String> = inputs.focus_areas.iter().map(FocusArea::title).collect();
        lines.push(format!("- Focus Areas: {}", focus.join(", ")));
        lines.push(String::new());
    }

    if let Some(extra) = inputs.additional_context.filter(|c| !c.trim().is_empty()) {
        lines.push("## Additional Context".into());
        lines.push(extra.to_string());
        lines.push(String::new());
    }

    lines.push("---".into());
    lines.push(format!("Generate ONLY section {}. {} now.", section.number, section.title));
    lines.push("Stay consistent with the previously generated content.".into());
    lines.push("Use Markdown with heading levels that match the template.".into());

    lines.join("\n")
}

/// Title for a generated document, taken from the first epic when there is one.
pub fn document_title(context: &AggregatedContext) -> String {
    match context.project_summary.epics.first() {
        Some(epic) => {
            let name = epic.split_once(':').map(|(_, title)| title.trim()).unwrap_or(epic);
            format!("Test Strategy: {}", name)
        }
        None => "Test Strategy Document".to_string(),
    }
}
