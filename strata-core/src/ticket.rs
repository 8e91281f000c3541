use serde::{Deserialize, Serialize};

/// Issue type name that marks a ticket as an epic.
pub const EPIC_ISSUE_TYPE: &str = "Epic";

/// Maximum number of comments kept per ticket.
pub const MAX_TICKET_COMMENTS: usize = 5;

/// A fetched issue-tracker record. Tickets are never modified after fetching.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ticket {
    pub key: String,
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    pub issue_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub acceptance_criteria: Option<String>,
    /// Most recent first.
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub linked_issues: Vec<LinkedIssue>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub fix_versions: Vec<String>,
    #[serde(default)]
    pub sprint: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Ticket {
    pub fn new(
        key: impl Into<String>,
        summary: impl Into<String>,
        issue_type: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            issue_type: issue_type.into(),
            ..Default::default()
        }
    }

    pub fn is_epic(&self) -> bool {
        self.issue_type == EPIC_ISSUE_TYPE
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn with_acceptance_criteria(mut self, criteria: impl Into<String>) -> Self {
        self.acceptance_criteria = Some(criteria.into());
        self
    }

    /// Adds a comment, keeping newest first and at most [`MAX_TICKET_COMMENTS`].
    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comments.insert(0, comment);
        self.comments.truncate(MAX_TICKET_COMMENTS);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
    /// `YYYY-MM-DD`
    pub created: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    Inward,
    Outward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedIssue {
    pub link_type: String,
    pub direction: LinkDirection,
    pub key: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub key: String,
    pub summary: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(n: usize) -> Comment {
        Comment { author: "a".into(), body: format!("c{n}"), created: "2024-01-01".into() }
    }

    #[test]
    fn test_is_epic() {
        assert!(Ticket::new("P-1", "Epic", "Epic").is_epic());
        assert!(!Ticket::new("P-2", "Story", "Story").is_epic());
    }

    #[test]
    fn test_comments_newest_first_and_capped() {
        let mut ticket = Ticket::new("P-1", "s", "Story");
        for n in 0..7 {
            ticket = ticket.with_comment(comment(n));
        }
        assert_eq!(ticket.comments.len(), MAX_TICKET_COMMENTS);
        assert_eq!(ticket.comments[0].body, "c6");
        assert_eq!(ticket.comments[4].body, "c2");
    }

    #[test]
    fn test_deserialize_minimal() {
        let ticket: Ticket =
            serde_json::from_str(r#"{"key":"P-1","summary":"Login","issue_type":"Story"}"#)
                .unwrap();
        assert_eq!(ticket.key, "P-1");
        assert!(ticket.labels.is_empty());
        assert!(ticket.priority.is_none());
    }
}
