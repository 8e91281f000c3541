//! Atlassian Document Format to plain text.
//!
//! Jira Cloud returns descriptions and comment bodies as a JSON node tree.
//! Block nodes are flattened to lines with light Markdown-style markers.

use serde_json::Value;

fn attr<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    node.get("attrs").and_then(|attrs| attrs.get(name))
}

fn attr_str<'a>(node: &'a Value, name: &str) -> &'a str {
    attr(node, name).and_then(Value::as_str).unwrap_or("")
}

fn apply_marks(mut text: String, marks: Option<&Value>) -> String {
    for mark in marks.and_then(Value::as_array).into_iter().flatten() {
        text = match mark.get("type").and_then(Value::as_str) {
            Some("strong") => format!("**{}**", text),
            Some("em") => format!("*{}*", text),
            Some("code") => format!("`{}`", text),
            _ => text,
        };
    }
    text
}

/// Flattens an ADF node (or a plain string) to text.
pub fn adf_to_text(node: &Value) -> String {
    let node_type = match node {
        Value::Null => return String::new(),
        Value::String(text) => return text.clone(),
        Value::Object(_) => node.get("type").and_then(Value::as_str).unwrap_or(""),
        _ => return String::new(),
    };

    match node_type {
        "text" => {
            let text = node.get("text").and_then(Value::as_str).unwrap_or("").to_string();
            return apply_marks(text, node.get("marks"));
        }
        "hardBreak" => return "\n".to_string(),
        "mention" => return attr_str(node, "text").to_string(),
        "emoji" => return attr_str(node, "shortName").to_string(),
        "inlineCard" | "blockCard" => {
            let url = attr_str(node, "url");
            return if url.is_empty() { String::new() } else { format!(" [{}] ", url) };
        }
        _ => {}
    }

    let inner: String = node
        .get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(adf_to_text)
        .collect();

    match node_type {
        "paragraph" | "table" => format!("{}\n", inner),
        "heading" => {
            let level = attr(node, "level").and_then(Value::as_u64).unwrap_or(1).clamp(1, 6);
            format!("{} {}\n", "#".repeat(level as usize), inner)
        }
        "listItem" => format!("• {}\n", inner),
        "codeBlock" => format!("```{}\n{}\n```\n", attr_str(node, "language"), inner),
        "blockquote" => format!("> {}\n", inner),
        "panel" => {
            let panel = attr(node, "panelType").and_then(Value::as_str).unwrap_or("info");
            format!("[{}] {}\n", panel.to_uppercase(), inner)
        }
        "tableRow" => format!("| {}\n", inner),
        "tableCell" | "tableHeader" => format!("{} | ", inner),
        _ => inner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paragraphs_and_marks() {
        let doc = json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Goal"}]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Pay "},
                    {"type": "text", "text": "securely", "marks": [{"type": "strong"}]},
                    {"type": "hardBreak"},
                    {"type": "mention", "attrs": {"text": "@ana"}}
                ]}
            ]
        });
        assert_eq!(adf_to_text(&doc), "## Goal\nPay **securely**\n@ana\n");
    }

    #[test]
    fn test_lists_code_and_panels() {
        let doc = json!({
            "type": "doc",
            "content": [
                {"type": "bulletList", "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "one"}]}]}
                ]},
                {"type": "codeBlock", "attrs": {"language": "sql"}, "content": [{"type": "text", "text": "select 1"}]},
                {"type": "panel", "attrs": {"panelType": "warning"}, "content": [{"type": "text", "text": "careful"}]},
                {"type": "inlineCard", "attrs": {"url": "https://example.com"}}
            ]
        });
        assert_eq!(
            adf_to_text(&doc),
            "• one\n\n```sql\nselect 1\n```\n[WARNING] careful\n [https://example.com] "
        );
    }

    #[test]
    fn test_table_and_plain_values() {
        let table = json!({
            "type": "table",
            "content": [{"type": "tableRow", "content": [
                {"type": "tableHeader", "content": [{"type": "text", "text": "A"}]},
                {"type": "tableCell", "content": [{"type": "text", "text": "B"}]}
            ]}]
        });
        assert_eq!(adf_to_text(&table), "| A | B | \n\n");
        assert_eq!(adf_to_text(&json!("plain")), "plain");
        assert_eq!(adf_to_text(&Value::Null), "");
    }
}
