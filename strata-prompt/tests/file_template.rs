use std::fs;
use strata_core::TemplateSource;
use strata_prompt::{FileTemplateSource, TEMPLATE_FILE_NAME, resolve_template};
use tempfile::TempDir;

const OUTLINE: &str = "\
Test Strategy Template

1. Introduction
1.1 Purpose
1.2 Scope
2. Quality Objectives
2.1 Coverage Targets
3. Test Environment Strategy
3.1 Environments
3.1.1 Staging
4. Release Criteria
";

#[test]
fn configured_file_is_parsed_into_a_tree() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("outline.txt");
    fs::write(&path, OUTLINE).unwrap();

    let structure = resolve_template(&FileTemplateSource::new(&path));

    assert_eq!(structure.source, "file");
    let roots: Vec<&str> = structure.sections.iter().map(|s| s.number.as_str()).collect();
    assert_eq!(roots, vec!["1", "2", "3", "4"]);
    assert_eq!(structure.sections[2].subsections[0].subsections[0].title, "Staging");
    assert_eq!(structure.total_sections(), 9);
}

#[test]
fn search_dirs_are_used_when_configured_path_is_missing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(TEMPLATE_FILE_NAME), OUTLINE).unwrap();

    let source = FileTemplateSource::new(dir.path().join("missing.txt"))
        .with_search_dirs(vec![dir.path().to_path_buf()]);

    assert_eq!(source.locate(), Some(dir.path().join(TEMPLATE_FILE_NAME)));
}

#[test]
fn missing_template_falls_back_to_default() {
    let dir = TempDir::new().unwrap();
    let source =
        FileTemplateSource::new(dir.path().join("none.txt")).with_search_dirs(Vec::new());

    let structure = resolve_template(&source);

    assert_eq!(structure.source, "default");
    assert_eq!(structure.sections.len(), 13);
}

#[test]
fn file_without_headings_falls_back_to_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blank.txt");
    fs::write(&path, "just some prose\nwith no headings at all\n").unwrap();

    let source = FileTemplateSource::new(&path).with_search_dirs(Vec::new());
    assert!(source.parse(&path).is_err());
    assert_eq!(resolve_template(&source).source, "default");
}
