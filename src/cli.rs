use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use strata_core::{Depth, FocusArea, ProviderKind};

#[derive(Parser, Debug)]
#[command(name = "strata", version)]
#[command(about = "Generate test strategy documents from Jira tickets", long_about = None)]
pub struct Cli {
    /// Log output format: pretty or json
    #[arg(long, global = true, env = "STRATA_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to listen on (defaults to STRATA_BIND)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Generate a test strategy, printing each event as one JSON line
    Generate(GenerateArgs),

    /// List the models a provider offers
    Models {
        provider: ProviderKind,
    },

    /// Probe Jira, Groq, Ollama and the template file
    Check,

    /// Print the outline that generation would use
    Template,

    /// Print the effective configuration with secrets masked
    Config,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Ticket keys such as PROJ-1
    #[arg(required = true)]
    pub tickets: Vec<String>,

    /// LLM backend (defaults to DEFAULT_PROVIDER)
    #[arg(short, long)]
    pub provider: Option<ProviderKind>,

    /// Model name (defaults to the provider's configured model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// standard, detailed or comprehensive
    #[arg(short, long)]
    pub depth: Option<Depth>,

    /// Testing area to emphasise; repeatable
    #[arg(long = "focus")]
    pub focus: Vec<FocusArea>,

    #[arg(long)]
    pub temperature: Option<f32>,

    /// Do not pull in the children of epics
    #[arg(long)]
    pub no_children: bool,

    /// Extra instructions appended to the prompt
    #[arg(long)]
    pub context: Option<String>,

    /// Also write the finished document as Markdown
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
