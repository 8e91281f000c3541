//! Jira issue JSON to [`Ticket`].

use crate::adf::adf_to_text;
use serde::Deserialize;
use serde_json::{Map, Value};
use strata_core::{Comment, LinkDirection, LinkedIssue, MAX_TICKET_COMMENTS, Subtask, Ticket};

const COMMENT_BODY_CHARS: usize = 500;

/// Custom field holding the sprint list on most Jira Cloud sites.
pub const SPRINT_FIELD: &str = "customfield_10020";

#[derive(Debug, Deserialize)]
pub(crate) struct RawIssue {
    #[serde(default)]
    key: String,
    #[serde(default)]
    fields: RawFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFields {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    issuetype: Option<Named>,
    #[serde(default)]
    status: Option<Named>,
    #[serde(default)]
    priority: Option<Named>,
    #[serde(default)]
    labels: Option<Vec<String>>,
    #[serde(default)]
    components: Option<Vec<Named>>,
    #[serde(default)]
    comment: Option<CommentPage>,
    #[serde(default)]
    issuelinks: Option<Vec<RawLink>>,
    #[serde(default)]
    subtasks: Option<Vec<IssueRef>>,
    #[serde(default)]
    fix_versions: Option<Vec<Named>>,
    #[serde(flatten)]
    custom: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct CommentPage {
    #[serde(default)]
    comments: Vec<RawComment>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    #[serde(default)]
    author: Option<RawUser>,
    #[serde(default)]
    body: Option<Value>,
    #[serde(default)]
    created: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLink {
    #[serde(rename = "type", default)]
    link_type: Option<Named>,
    #[serde(default)]
    inward_issue: Option<IssueRef>,
    #[serde(default)]
    outward_issue: Option<IssueRef>,
}

#[derive(Debug, Deserialize)]
struct IssueRef {
    #[serde(default)]
    key: String,
    #[serde(default)]
    fields: Option<RefFields>,
}

#[derive(Debug, Default, Deserialize)]
struct RefFields {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    status: Option<Named>,
}

impl IssueRef {
    fn summary(&self) -> String {
        self.fields.as_ref().map(|f| f.summary.clone()).unwrap_or_default()
    }

    fn status(&self) -> String {
        self.fields
            .as_ref()
            .and_then(|f| f.status.as_ref())
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }
}

fn named(value: Option<Named>) -> String {
    value.map(|n| n.name).unwrap_or_default()
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Object(_) | Value::String(_) => non_empty(adf_to_text(value)),
        other => non_empty(other.to_string()),
    }
}

fn sprint_name(value: Option<&Value>) -> Option<String> {
    match value?.as_array()?.first()? {
        Value::Object(sprint) => sprint.get("name").and_then(Value::as_str).map(str::to_string),
        Value::String(name) => Some(name.clone()),
        _ => None,
    }
}

/// Builds a ticket from one issue payload.
///
/// `criteria_field` is the custom field id holding acceptance criteria;
/// `base_url` is used for the browse link.
pub(crate) fn to_ticket(issue: RawIssue, criteria_field: &str, base_url: &str) -> Ticket {
    let RawIssue { key, fields } = issue;

    // Only the five most recent comments are kept, newest first.
    let comments: Vec<Comment> = fields
        .comment
        .map(|page| page.comments)
        .unwrap_or_default()
        .into_iter()
        .rev()
        .take(MAX_TICKET_COMMENTS)
        .map(|raw| Comment {
            author: raw
                .author
                .map(|a| a.display_name)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            body: raw
                .body
                .as_ref()
                .map(adf_to_text)
                .unwrap_or_default()
                .chars()
                .take(COMMENT_BODY_CHARS)
                .collect(),
            created: raw.created.chars().take(10).collect(),
        })
        .collect();

    let mut linked_issues = Vec::new();
    for link in fields.issuelinks.unwrap_or_default() {
        let link_type = named(link.link_type);
        for (direction, issue) in [
            (LinkDirection::Inward, link.inward_issue),
            (LinkDirection::Outward, link.outward_issue),
        ] {
            if let Some(issue) = issue {
                linked_issues.push(LinkedIssue {
                    link_type: link_type.clone(),
                    direction,
                    summary: issue.summary(),
                    key: issue.key,
                });
            }
        }
    }

    let subtasks = fields
        .subtasks
        .unwrap_or_default()
        .into_iter()
        .map(|sub| Subtask { summary: sub.summary(), status: sub.status(), key: sub.key })
        .collect();

    Ticket {
        url: Some(format!("{}/browse/{}", base_url, key)),
        summary: fields.summary,
        description: fields.description.as_ref().and_then(field_text),
        issue_type: named(fields.issuetype),
        status: named(fields.status),
        priority: fields.priority.map(|p| p.name).filter(|p| !p.is_empty()),
        labels: fields.labels.unwrap_or_default(),
        components: fields.components.unwrap_or_default().into_iter().map(|c| c.name).collect(),
        acceptance_criteria: fields.custom.get(criteria_field).and_then(field_text),
        comments,
        linked_issues,
        subtasks,
        fix_versions: fields.fix_versions.unwrap_or_default().into_iter().map(|v| v.name).collect(),
        sprint: sprint_name(fields.custom.get(SPRINT_FIELD)),
        key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(value: Value) -> RawIssue {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_issue() {
        let comments: Vec<Value> = (1..=7)
            .map(|n| {
                json!({
                    "author": {"displayName": format!("user{n}")},
                    "body": format!("comment {n}"),
                    "created": format!("2024-03-0{n}T10:00:00.000+0000")
                })
            })
            .collect();
        let raw = issue(json!({
            "key": "PROJ-2",
            "fields": {
                "summary": "Pay by card",
                "description": {"type": "doc", "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "Use a credit card."}]}
                ]},
                "issuetype": {"name": "Story"},
                "status": {"name": "To Do"},
                "priority": {"name": "High"},
                "labels": ["payments"],
                "components": [{"name": "Checkout"}],
                "customfield_10016": "Order is confirmed",
                "customfield_10020": [{"id": 1, "name": "Sprint 4"}],
                "comment": {"comments": comments},
                "issuelinks": [{
                    "type": {"name": "Blocks"},
                    "outwardIssue": {"key": "PROJ-9", "fields": {"summary": "Refunds"}}
                }],
                "subtasks": [{"key": "PROJ-3", "fields": {"summary": "UI", "status": {"name": "Done"}}}],
                "fixVersions": [{"name": "1.0"}]
            }
        }));

        let ticket = to_ticket(raw, "customfield_10016", "https://acme.atlassian.net");

        assert_eq!(ticket.key, "PROJ-2");
        assert_eq!(ticket.description.as_deref(), Some("Use a credit card."));
        assert_eq!(ticket.priority.as_deref(), Some("High"));
        assert_eq!(ticket.acceptance_criteria.as_deref(), Some("Order is confirmed"));
        assert_eq!(ticket.sprint.as_deref(), Some("Sprint 4"));
        assert_eq!(ticket.url.as_deref(), Some("https://acme.atlassian.net/browse/PROJ-2"));
        assert_eq!(ticket.comments.len(), 5);
        assert_eq!(ticket.comments[0].author, "user7");
        assert_eq!(ticket.comments[0].created, "2024-03-07");
        assert_eq!(ticket.comments[4].body, "comment 3");
        assert_eq!(ticket.linked_issues[0].direction, LinkDirection::Outward);
        assert_eq!(ticket.linked_issues[0].summary, "Refunds");
        assert_eq!(ticket.subtasks[0].status, "Done");
        assert_eq!(ticket.fix_versions, vec!["1.0"]);
    }

    #[test]
    fn test_sparse_issue() {
        let raw = issue(json!({
            "key": "PROJ-1",
            "fields": {"summary": "Epic", "issuetype": {"name": "Epic"}, "priority": null, "description": null}
        }));
        let ticket = to_ticket(raw, "customfield_10016", "https://acme.atlassian.net");
        assert!(ticket.is_epic());
        assert_eq!(ticket.priority, None);
        assert_eq!(ticket.description, None);
        assert!(ticket.labels.is_empty());
        assert_eq!(ticket.sprint, None);
    }
}
