mod cli;
mod generate;
mod inspect;
mod serve;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use strata_core::Settings;
use strata_telemetry::{LogFormat, init_with_format};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_with_format("strata", LogFormat::from_name(&cli.log_format));

    let settings = Settings::from_env().context("invalid configuration")?;

    match cli.command {
        Commands::Serve { bind } => serve::run(settings, bind).await,
        Commands::Generate(args) => generate::run(settings, args).await,
        Commands::Models { provider } => inspect::models(&settings, provider).await,
        Commands::Check => inspect::check(&settings).await,
        Commands::Template => inspect::template(&settings),
        Commands::Config => inspect::config(&settings),
    }
}
