//! Document outline: hierarchy building, the built-in default outline, and a
//! plain-text outline file source.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use strata_core::{TemplateError, TemplateSection, TemplateSource, TemplateStructure};

/// File name searched for when the configured template path does not exist.
pub const TEMPLATE_FILE_NAME: &str = "teststrategy.txt";

/// Fewer numbered headings than this triggers the keyword scan.
const MIN_NUMBERED_SECTIONS: usize = 5;

const SECTION_KEYWORDS: &[&str] = &[
    "Introduction",
    "Project Overview",
    "Test Approach",
    "Test Methodology",
    "Test Automation",
    "Test Environment",
    "Defect Management",
    "Risk Management",
    "Entry Criteria",
    "Exit Criteria",
    "Test Metrics",
    "KPIs",
    "Roles and Responsibilities",
    "Test Schedule",
    "Communication Plan",
    "Appendices",
];

/// Nests a flat, document-ordered section list by level.
///
/// A stack holds the currently open ancestors. Each section closes every open
/// section at its level or deeper, then becomes a child of whatever is left on
/// top (or a root when nothing is).
pub fn build_hierarchy(flat: Vec<TemplateSection>) -> Vec<TemplateSection> {
    fn close(stack: &mut Vec<TemplateSection>, roots: &mut Vec<TemplateSection>) {
        if let Some(node) = stack.pop() {
            match stack.last_mut() {
                Some(parent) => parent.subsections.push(node),
                None => roots.push(node),
            }
        }
    }

    let mut roots = Vec::new();
    let mut stack: Vec<TemplateSection> = Vec::new();
    for node in flat {
        while stack.last().is_some_and(|top| top.level >= node.level) {
            close(&mut stack, &mut roots);
        }
        stack.push(node);
    }
    while !stack.is_empty() {
        close(&mut stack, &mut roots);
    }
    roots
}

/// The built-in 13-section outline used whenever no template can be read.
pub fn default_outline() -> Vec<TemplateSection> {
    fn section(number: &str, title: &str, subsections: &[(&str, &str)]) -> TemplateSection {
        TemplateSection::new(number, title).with_subsections(
            subsections.iter().map(|(n, t)| TemplateSection::new(*n, *t)).collect(),
        )
    }

    vec![
        section("1", "Introduction", &[("1.1", "Purpose"), ("1.2", "Scope"), ("1.3", "Objectives")]),
        section(
            "2",
            "Project Overview",
            &[("2.1", "Description"), ("2.2", "Stakeholders"), ("2.3", "Architecture")],
        ),
        section(
            "3",
            "Test Approach & Methodology",
            &[("3.1", "Testing Philosophy"), ("3.2", "Testing Levels"), ("3.3", "Testing Types")],
        ),
        section(
            "4",
            "Test Automation Strategy",
            &[("4.1", "Automation Approach"), ("4.2", "Framework & Tools")],
        ),
        section(
            "5",
            "Test Environment Strategy",
            &[("5.1", "Environment Topology"), ("5.2", "Test Data Management")],
        ),
        section(
            "6",
            "Defect Management Strategy",
            &[("6.1", "Defect Lifecycle"), ("6.2", "Severity & Priority")],
        ),
        section(
            "7",
            "Risk-Based Testing & Risk Management",
            &[("7.1", "Risk Assessment Framework"), ("7.2", "Risk Register")],
        ),
        section("8", "Entry & Exit Criteria", &[("8.1", "Entry Criteria"), ("8.2", "Exit Criteria")]),
        section(
            "9",
            "Test Metrics, KPIs & Reporting",
            &[("9.1", "Key Metrics"), ("9.2", "Reporting Cadence")],
        ),
        section("10", "Roles and Responsibilities", &[]),
        section(
            "11",
            "Test Schedule & Milestones",
            &[("11.1", "Schedule"), ("11.2", "Quality Gates")],
        ),
        section(
            "12",
            "Communication & Escalation Plan",
            &[("12.1", "Communication Matrix"), ("12.2", "Escalation Path")],
        ),
        section(
            "13",
            "Appendices",
            &[("13.1", "Glossary"), ("13.2", "Assumptions"), ("13.3", "Constraints")],
        ),
    ]
}

/// Indented numbered outline, two spaces per nesting level.
pub fn render_outline(sections: &[TemplateSection]) -> String {
    fn walk(sections: &[TemplateSection], indent: usize, lines: &mut Vec<String>) {
        for section in sections {
            lines.push(format!("{}{}. {}", "  ".repeat(indent), section.number, section.title));
            walk(&section.subsections, indent + 1, lines);
        }
    }

    let mut lines = Vec::new();
    walk(sections, 0, &mut lines);
    lines.join("\n")
}

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // "2.1 Test Data Management", optionally with a trailing dot after the
        // number and a table-of-contents page number.
        Regex::new(r"^(\d+(?:\.\d+){0,2})\.?\s+([A-Z][A-Za-z &,/\-]*?)\s*(?:\.{2,}\s*)?\d*\s*$")
            .expect("Invalid heading pattern")
    })
}

/// Extracts a flat section list from outline text.
pub fn parse_outline_text(text: &str) -> Vec<TemplateSection> {
    let mut sections: Vec<TemplateSection> = Vec::new();

    for line in text.lines() {
        let Some(caps) = heading_pattern().captures(line.trim()) else {
            continue;
        };
        let number = &caps[1];
        let title = caps[2].trim();
        if title.len() < 3 || title.len() > 100 || title.matches(' ').count() > 15 {
            continue;
        }
        // Tables of contents repeat headings; keep the first occurrence.
        if sections.iter().any(|s| s.number == number) {
            continue;
        }
        sections.push(TemplateSection::new(number, title));
    }

    if sections.len() < MIN_NUMBERED_SECTIONS {
        for line in text.lines().map(str::trim) {
            let lower = line.to_lowercase();
            let is_heading = SECTION_KEYWORDS
                .iter()
                .any(|keyword| lower.starts_with(&keyword.to_lowercase()))
                && line.chars().all(|c| c.is_alphabetic() || c == ' ');
            if is_heading && !sections.iter().any(|s| s.title.eq_ignore_ascii_case(line)) {
                let number = (sections.len() + 1).to_string();
                let mut section = TemplateSection::new(number, line);
                section.level = 1;
                sections.push(section);
            }
        }
    }

    sections
}

/// Template outline read from a plain-text file.
#[derive(Debug, Clone)]
pub struct FileTemplateSource {
    configured: PathBuf,
    search_dirs: Vec<PathBuf>,
}

impl FileTemplateSource {
    /// Looks at `configured` first, then for [`TEMPLATE_FILE_NAME`] in the
    /// working directory and its two parents.
    pub fn new(configured: impl Into<PathBuf>) -> Self {
        Self {
            configured: configured.into(),
            search_dirs: vec![PathBuf::from("."), PathBuf::from(".."), PathBuf::from("../..")],
        }
    }

    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }
}

impl TemplateSource for FileTemplateSource {
    fn locate(&self) -> Option<PathBuf> {
        if self.configured.is_file() {
            return Some(self.configured.clone());
        }
        self.search_dirs.iter().map(|dir| dir.join(TEMPLATE_FILE_NAME)).find(|path| path.is_file())
    }

    fn parse(&self, path: &Path) -> Result<Vec<TemplateSection>, TemplateError> {
        if !path.exists() {
            return Err(TemplateError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let flat = parse_outline_text(&text);
        if flat.is_empty() {
            return Err(TemplateError::Parse(format!(
                "no section headings found in {}",
                path.display()
            )));
        }
        Ok(build_hierarchy(flat))
    }
}

/// Outline from `source`, or [`default_outline`] when it is missing or unreadable.
pub fn resolve_template(source: &dyn TemplateSource) -> TemplateStructure {
    let parsed = source.locate().map(|path| (source.parse(&path), path));
    match parsed {
        Some((Ok(sections), path)) => {
            tracing::info!(path = %path.display(), sections = sections.len(), "using template outline");
            TemplateStructure { sections, source: "file".to_string() }
        }
        Some((Err(err), path)) => {
            tracing::warn!(path = %path.display(), error = %err, "template unreadable, using default outline");
            TemplateStructure { sections: default_outline(), source: "default".to_string() }
        }
        None => {
            tracing::debug!("no template file found, using default outline");
            TemplateStructure { sections: default_outline(), source: "default".to_string() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(entries: &[&str]) -> Vec<TemplateSection> {
        entries.iter().map(|n| TemplateSection::new(*n, format!("Section {n}"))).collect()
    }

    #[test]
    fn test_build_hierarchy_two_roots() {
        let tree = build_hierarchy(flat(&["1", "1.1", "1.2", "2"]));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].number, "1");
        let children: Vec<&str> = tree[0].subsections.iter().map(|s| s.number.as_str()).collect();
        assert_eq!(children, vec!["1.1", "1.2"]);
        assert_eq!(tree[1].number, "2");
        assert!(tree[1].subsections.is_empty());
    }

    #[test]
    fn test_build_hierarchy_three_levels() {
        let tree = build_hierarchy(flat(&["1", "1.1", "1.1.1", "1.1.2", "1.2", "2", "2.1"]));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].subsections[0].subsections.len(), 2);
        assert_eq!(tree[0].subsections[1].number, "1.2");
        assert_eq!(tree[1].subsections[0].number, "2.1");
    }

    #[test]
    fn test_build_hierarchy_empty() {
        assert!(build_hierarchy(Vec::new()).is_empty());
    }

    #[test]
    fn test_default_outline_shape() {
        let outline = default_outline();
        assert_eq!(outline.len(), 13);
        assert_eq!(outline[9].title, "Roles and Responsibilities");
        assert!(outline[9].subsections.is_empty());
        assert!(outline.iter().flat_map(|s| &s.subsections).all(|s| s.level == 2));
    }

    #[test]
    fn test_render_outline_indents() {
        let rendered = render_outline(&default_outline()[..1]);
        assert_eq!(rendered, "1. Introduction\n  1.1. Purpose\n  1.2. Scope\n  1.3. Objectives");
    }

    #[test]
    fn test_parse_outline_text() {
        let text = "Contents\n\
                    1 Introduction ..... 3\n\
                    1.1 Purpose\n\
                    1.2 Scope\n\
                    2. Test Approach & Methodology\n\
                    2.1 Testing Levels\n\
                    this line is prose and is ignored\n\
                    1 Introduction\n";
        let sections = parse_outline_text(text);
        let numbers: Vec<&str> = sections.iter().map(|s| s.number.as_str()).collect();
        assert_eq!(numbers, vec!["1", "1.1", "1.2", "2", "2.1"]);
        assert_eq!(sections[3].title, "Test Approach & Methodology");
        assert_eq!(sections[0].title, "Introduction");
    }

    #[test]
    fn test_keyword_fallback() {
        let text = "Introduction\nSome prose here.\nRisk Management\nAppendices\n";
        let sections = parse_outline_text(text);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Introduction", "Risk Management", "Appendices"]);
        assert_eq!(sections[2].number, "3");
    }
}
