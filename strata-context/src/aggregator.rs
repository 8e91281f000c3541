//! Groups fetched tickets into feature areas and derives project-level signals.

use crate::signals::{dedup_preserving_order, risk_indicators, technical_signals};
use std::collections::{BTreeMap, BTreeSet};
use strata_core::{
    AggregatedContext, FeatureArea, GENERAL_AREA_DESCRIPTION, GENERAL_AREA_KEY,
    GENERAL_AREA_TITLE, ProjectSummary, StorySummary, Ticket,
};

/// Acceptance-criteria excerpts kept per feature area.
pub const MAX_ACCEPTANCE_CRITERIA: usize = 10;
const AC_EXCERPT_CHARS: usize = 200;
const EPIC_DESCRIPTION_CHARS: usize = 500;
const MAX_TECH_SIGNALS: usize = 10;
const MAX_COMMON_LABELS: usize = 5;
const MAX_COMMENT_EXCERPTS: usize = 10;

/// Builds the aggregated context for a ticket set.
///
/// Non-epic tickets are all attached to the first fetched epic. When no epic
/// was fetched they go to a synthetic `GENERAL` area. An empty slice yields
/// [`AggregatedContext::default`].
pub fn aggregate(tickets: &[Ticket]) -> AggregatedContext {
    if tickets.is_empty() {
        return AggregatedContext::default();
    }

    let project_summary = summarize(tickets);

    let general = Ticket::new(GENERAL_AREA_KEY, GENERAL_AREA_TITLE, "Epic")
        .with_description(GENERAL_AREA_DESCRIPTION);
    let mut groups: Vec<(&Ticket, Vec<&Ticket>)> = Vec::new();
    let mut orphans: Vec<&Ticket> = Vec::new();
    for ticket in tickets {
        if ticket.is_epic() {
            // A repeated epic replaces the earlier copy but keeps its position.
            match groups.iter_mut().find(|(epic, _)| epic.key == ticket.key) {
                Some(group) => group.0 = ticket,
                None => groups.push((ticket, Vec::new())),
            }
        } else {
            orphans.push(ticket);
        }
    }

    if !orphans.is_empty() {
        if groups.is_empty() {
            groups.push((&general, orphans));
        } else {
            groups[0].1.extend(orphans);
        }
    }

    let mut feature_areas = Vec::with_capacity(groups.len());
    let mut all_risks: Vec<String> = Vec::new();
    let mut all_signals: Vec<&'static str> = Vec::new();

    for (epic, stories) in &groups {
        let epic_risks = risk_indicators(epic);
        all_risks.extend(epic_risks.iter().cloned());

        let mut area_risks = epic_risks;
        for story in stories {
            let story_risks = risk_indicators(story);
            all_risks.extend(story_risks.iter().cloned());
            area_risks.extend(story_risks);
        }

        all_signals.extend(technical_signals(epic.description.as_deref()));
        for story in stories {
            all_signals.extend(technical_signals(story.description.as_deref()));
        }

        let acceptance_criteria = stories
            .iter()
            .filter_map(|story| {
                story.acceptance_criteria.as_deref().filter(|ac| !ac.trim().is_empty()).map(|ac| {
                    format!("[{}] {}...", story.key, truncate_chars(ac, AC_EXCERPT_CHARS))
                })
            })
            .take(MAX_ACCEPTANCE_CRITERIA)
            .collect();

        feature_areas.push(FeatureArea {
            epic_key: epic.key.clone(),
            epic_title: epic.summary.clone(),
            description: epic
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| truncate_chars(d, EPIC_DESCRIPTION_CHARS).to_string()),
            priority: epic.priority.clone(),
            stories: stories
                .iter()
                .map(|story| StorySummary {
                    key: story.key.clone(),
                    summary: story.summary.clone(),
                    issue_type: Some(story.issue_type.clone()),
                    priority: story.priority.clone(),
                })
                .collect(),
            acceptance_criteria,
            risk_indicators: dedup_preserving_order(area_risks),
        });
    }

    let cross_cutting_concerns = cross_cutting_concerns(tickets, &all_risks, &project_summary);

    let mut unique_signals: Vec<&str> = Vec::new();
    for signal in all_signals {
        if !unique_signals.contains(&signal) {
            unique_signals.push(signal);
        }
    }
    let technical_context = (!unique_signals.is_empty()).then(|| {
        let shown: Vec<&str> = unique_signals.into_iter().take(MAX_TECH_SIGNALS).collect();
        format!("Detected technology signals: {}", shown.join(", "))
    });

    let context = AggregatedContext {
        project_summary,
        feature_areas,
        cross_cutting_concerns,
        technical_context,
        comments_summary: comments_summary(tickets),
    };

    tracing::debug!(
        tickets = tickets.len(),
        feature_areas = context.feature_areas.len(),
        concerns = context.cross_cutting_concerns.len(),
        "aggregated ticket context"
    );

    context
}

fn summarize(tickets: &[Ticket]) -> ProjectSummary {
    let mut issue_type_breakdown = BTreeMap::new();
    let mut priority_breakdown = BTreeMap::new();
    let mut components = BTreeSet::new();
    let mut labels = BTreeSet::new();
    let mut epics = Vec::new();

    for ticket in tickets {
        *issue_type_breakdown.entry(ticket.issue_type.clone()).or_insert(0) += 1;
        let priority = ticket.priority.clone().unwrap_or_else(|| "None".to_string());
        *priority_breakdown.entry(priority).or_insert(0) += 1;
        components.extend(ticket.components.iter().cloned());
        labels.extend(ticket.labels.iter().cloned());
        if ticket.is_epic() {
            epics.push(format!("{}: {}", ticket.key, ticket.summary));
        }
    }

    ProjectSummary {
        total_tickets: tickets.len(),
        epics,
        issue_type_breakdown,
        priority_breakdown,
        components: components.into_iter().collect(),
        labels: labels.into_iter().collect(),
    }
}

fn cross_cutting_concerns(
    tickets: &[Ticket],
    all_risks: &[String],
    summary: &ProjectSummary,
) -> Vec<String> {
    let mut concerns = Vec::new();

    // Labels in first-seen order, then stable-sorted by frequency.
    let mut label_counts: Vec<(&str, usize)> = Vec::new();
    for label in tickets.iter().flat_map(|t| t.labels.iter()) {
        match label_counts.iter_mut().find(|(l, _)| *l == label.as_str()) {
            Some(entry) => entry.1 += 1,
            None => label_counts.push((label.as_str(), 1)),
        }
    }
    label_counts.sort_by(|a, b| b.1.cmp(&a.1));
    let common: Vec<&str> = label_counts
        .iter()
        .take(MAX_COMMON_LABELS)
        .filter(|(_, count)| *count > 1)
        .map(|(label, _)| *label)
        .collect();
    if !common.is_empty() {
        concerns.push(format!("Common labels across tickets: {}", common.join(", ")));
    }

    let count_mentioning = |terms: &[&str]| {
        all_risks
            .iter()
            .filter(|risk| {
                let lower = risk.to_lowercase();
                terms.iter().any(|term| lower.contains(term))
            })
            .count()
    };

    let security = count_mentioning(&["security", "pci", "gdpr", "hipaa", "compliance"]);
    if security > 0 {
        concerns.push(format!("Security/compliance requirements noted in {} tickets", security));
    }

    let performance = count_mentioning(&["performance", "scal"]);
    if performance > 0 {
        concerns.push(format!("Performance/scalability concerns in {} tickets", performance));
    }

    let integration = count_mentioning(&["integration", "third-party", "external"]);
    if integration > 0 {
        concerns.push(format!("External integrations mentioned in {} tickets", integration));
    }

    let critical_high: usize = ["Critical", "High", "Highest"]
        .iter()
        .filter_map(|p| summary.priority_breakdown.get(*p))
        .sum();
    if critical_high > 0 {
        concerns.push(format!("{} tickets marked as Critical/High priority", critical_high));
    }

    concerns
}

fn comments_summary(tickets: &[Ticket]) -> Option<String> {
    let excerpts: Vec<String> = tickets
        .iter()
        .flat_map(|ticket| {
            ticket.comments.iter().map(move |comment| {
                format!(
                    "[{}] {}: {}...",
                    ticket.key,
                    comment.author,
                    truncate_chars(&comment.body, 100)
                )
            })
        })
        .collect();

    if excerpts.is_empty() {
        return None;
    }

    let mut summary = format!("Key discussion points from {} comments analyzed.", excerpts.len());
    for excerpt in excerpts.iter().take(MAX_COMMENT_EXCERPTS) {
        summary.push('\n');
        summary.push_str(excerpt);
    }
    Some(summary)
}

/// First `max` characters of `text`, on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
