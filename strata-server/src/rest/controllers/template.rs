use crate::ServerConfig;
use axum::{Json, extract::State};
use serde::Serialize;
use strata_core::TemplateStructure;

#[derive(Clone)]
pub struct TemplateController {
    config: ServerConfig,
}

impl TemplateController {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Serialize)]
pub struct TemplatePreview {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<TemplateStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sections: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub file_path: Option<String>,
}

/// The outline parsed from the configured template file. Unlike generation,
/// this does not fall back to the default outline.
pub async fn preview_template(State(controller): State<TemplateController>) -> Json<TemplatePreview> {
    let source = controller.config.generator.template_source();
    let Some(path) = source.locate() else {
        return Json(TemplatePreview {
            success: false,
            structure: None,
            total_sections: None,
            error: Some("Template file not found".to_string()),
            file_path: None,
        });
    };

    let file_path = Some(path.display().to_string());
    match source.parse(&path) {
        Ok(sections) => {
            let structure = TemplateStructure { sections, source: "file".to_string() };
            Json(TemplatePreview {
                success: true,
                total_sections: Some(structure.total_sections()),
                structure: Some(structure),
                error: None,
                file_path,
            })
        }
        Err(err) => Json(TemplatePreview {
            success: false,
            structure: None,
            total_sections: None,
            error: Some(err.to_string()),
            file_path,
        }),
    }
}
