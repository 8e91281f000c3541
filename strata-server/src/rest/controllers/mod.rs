pub mod generate;
pub mod jira;
pub mod llm;
pub mod template;

pub use generate::GenerateController;
pub use jira::JiraController;
pub use llm::LlmController;
pub use template::TemplateController;
