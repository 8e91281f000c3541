use crate::cli::GenerateArgs;
use anyhow::{Context, Result, bail};
use strata_core::{GenerationRequest, Settings};
use strata_runner::{EVENT_BUFFER, GenerationReport, Outcome};
use strata_server::ServerConfig;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Fills unset options from the settings.
fn build_request(settings: &Settings, args: GenerateArgs) -> GenerationRequest {
    let provider = args.provider.unwrap_or(settings.default_provider);
    let model = args.model.unwrap_or_else(|| settings.default_model(provider).to_string());

    let mut request = GenerationRequest::new(args.tickets, provider, model)
        .with_depth(args.depth.unwrap_or(settings.default_depth))
        .with_temperature(args.temperature.unwrap_or(settings.llm_temperature))
        .with_fetch_children(!args.no_children);
    for area in args.focus {
        request = request.with_focus_area(area);
    }
    if let Some(context) = args.context {
        request = request.with_additional_context(context);
    }
    request
}

/// Runs one generation, echoing events to stdout. Ctrl+C cancels the run.
pub async fn run(settings: Settings, args: GenerateArgs) -> Result<()> {
    let output = args.output.clone();
    let request = build_request(&settings, args);
    let generator = ServerConfig::from_settings(settings)?.generator;

    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { generator.run(request, tx, cancel).await })
    };
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let mut report = GenerationReport::default();
    while let Some(event) = rx.recv().await {
        println!("{}", event.to_json());
        report.record(&event);
    }
    interrupt.abort();

    match task.await.context("generation task panicked")? {
        Outcome::Completed { title, .. } => {
            if let Some(path) = output {
                std::fs::write(&path, report.to_markdown(&title))
                    .with_context(|| format!("cannot write {}", path.display()))?;
                tracing::info!(path = %path.display(), "document written");
            }
            Ok(())
        }
        Outcome::Failed(code) => {
            bail!("generation failed [{}]: {}", code, report.error.unwrap_or_default())
        }
        Outcome::Cancelled => bail!("generation cancelled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use strata_core::{Depth, FocusArea, ProviderKind};

    fn args(argv: &[&str]) -> GenerateArgs {
        let cli = crate::cli::Cli::try_parse_from(argv).unwrap();
        match cli.command {
            crate::cli::Commands::Generate(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let settings = Settings {
            default_provider: ProviderKind::Ollama,
            default_depth: Depth::Standard,
            llm_temperature: 0.5,
            ..Settings::default()
        };
        let request = build_request(&settings, args(&["strata", "generate", "PROJ-1"]));

        assert_eq!(request.provider, ProviderKind::Ollama);
        assert_eq!(request.model, "llama3.1");
        assert_eq!(request.depth, Depth::Standard);
        assert_eq!(request.temperature, 0.5);
        assert!(request.fetch_children);
        assert!(request.additional_context.is_none());
    }

    #[test]
    fn test_flags_override_settings() {
        let request = build_request(
            &Settings::default(),
            args(&[
                "strata",
                "generate",
                "PROJ-1",
                "--model",
                "llama-3.1-8b-instant",
                "--focus",
                "api",
                "--focus",
                "api",
                "--no-children",
                "--context",
                "Mobile first",
            ]),
        );

        assert_eq!(request.provider, ProviderKind::Groq);
        assert_eq!(request.model, "llama-3.1-8b-instant");
        assert_eq!(request.focus_areas, vec![FocusArea::Api]);
        assert!(!request.fetch_children);
        assert_eq!(request.additional_context.as_deref(), Some("Mobile first"));
    }
}
