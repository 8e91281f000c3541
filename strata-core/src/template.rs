use serde::{Deserialize, Serialize};

/// A numbered section of the document outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSection {
    /// Dot-delimited number such as `"2.1"`.
    pub number: String,
    pub title: String,
    /// Dot count + 1.
    pub level: usize,
    #[serde(default)]
    pub subsections: Vec<TemplateSection>,
}

impl TemplateSection {
    /// Creates a leaf section, deriving its level from the number.
    pub fn new(number: impl Into<String>, title: impl Into<String>) -> Self {
        let number = number.into();
        let level = number.matches('.').count() + 1;
        Self { number, title: title.into(), level, subsections: Vec::new() }
    }

    pub fn with_subsections(mut self, subsections: Vec<TemplateSection>) -> Self {
        self.subsections = subsections;
        self
    }

    /// `"2.1 Description"` style label.
    pub fn heading(&self) -> String {
        format!("{} {}", self.number, self.title)
    }
}

/// Parsed outline plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStructure {
    pub sections: Vec<TemplateSection>,
    /// `"file"` or `"default"`.
    pub source: String,
}

impl TemplateStructure {
    pub fn total_sections(&self) -> usize {
        fn count(sections: &[TemplateSection]) -> usize {
            sections.iter().map(|s| 1 + count(&s.subsections)).sum()
        }
        count(&self.sections)
    }
}
