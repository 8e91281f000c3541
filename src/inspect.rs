use anyhow::{Result, bail};
use strata_core::{ConnectionStatus, ProviderKind, Settings, TemplateSource, TicketSource};
use strata_jira::{JiraClient, JiraConfig};
use strata_model::ProviderRegistry;
use strata_prompt::{FileTemplateSource, render_outline, resolve_template};

pub async fn models(settings: &Settings, provider: ProviderKind) -> Result<()> {
    let registry = ProviderRegistry::from_settings(settings)?;
    let models = registry.get(provider)?.list_models().await;
    if models.is_empty() {
        bail!("{} returned no models", provider.display_name());
    }

    let default_model = settings.default_model(provider);
    for model in models {
        let marker = if model == default_model { "*" } else { " " };
        println!("{} {}", marker, model);
    }
    Ok(())
}

fn template_status(settings: &Settings) -> ConnectionStatus {
    let source = FileTemplateSource::new(settings.template_path.clone());
    let Some(path) = source.locate() else {
        return ConnectionStatus::failed(format!(
            "No template at {} and no teststrategy.txt nearby",
            settings.template_path.display()
        ));
    };
    match source.parse(&path) {
        Ok(sections) => ConnectionStatus::ok(format!(
            "{} top-level sections in {}",
            sections.len(),
            path.display()
        )),
        Err(err) => ConnectionStatus::failed(err.to_string()),
    }
}

/// Probes every collaborator. Jira and the template must pass, and at least
/// one LLM backend must be reachable.
pub async fn check(settings: &Settings) -> Result<()> {
    let registry = ProviderRegistry::from_settings(settings)?;
    let jira = JiraClient::new(JiraConfig::from_settings(settings)).test_connection().await;
    let groq = registry.get(ProviderKind::Groq)?.test_connection().await;
    let ollama = registry.get(ProviderKind::Ollama)?.test_connection().await;
    let template = template_status(settings);

    let results = [
        ("Jira", &jira),
        ("Groq", &groq),
        ("Ollama", &ollama),
        ("Template", &template),
    ];
    for (name, status) in results {
        let verdict = if status.success { "PASS" } else { "FAIL" };
        println!("{:<8} {:<9} {}", verdict, name, status.message);
    }

    let mut problems = Vec::new();
    if !jira.success {
        problems.push("Jira");
    }
    if !template.success {
        problems.push("template");
    }
    if !groq.success && !ollama.success {
        problems.push("LLM provider (Groq or Ollama)");
    }
    if !problems.is_empty() {
        bail!("checks failed: {}", problems.join(", "));
    }
    Ok(())
}

pub fn template(settings: &Settings) -> Result<()> {
    let structure = resolve_template(&FileTemplateSource::new(settings.template_path.clone()));
    println!("# source: {} ({} sections)", structure.source, structure.total_sections());
    println!("{}", render_outline(&structure.sections));
    Ok(())
}

pub fn config(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
    Ok(())
}
