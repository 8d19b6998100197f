use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quizgen::Config;
use quizgen_cli::commands::{ConfigCommand, GenerateCommand, GradeCommand};
use quizgen_cli::error::CliResult;
use quizgen_cli::output::OutputFormat;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quizgen")]
#[command(about = "Generate quizzes from your notes and grade your answers with an LLM")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(long, short = 'c', global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Generate questions from notes")]
    Generate(GenerateCommand),

    #[clap(about = "Grade answers to a saved quiz")]
    Grade(GradeCommand),

    #[clap(about = "Configuration commands")]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        if let Some(hint) = e.hint() {
            eprintln!("Hint: {hint}");
        }
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    match &cli.command {
        Command::Config(cmd) => cmd.execute(cli.config.as_deref(), format).await,
        Command::Generate(cmd) => {
            let config = Config::load(cli.config.as_deref())?;
            cmd.execute(&config, format).await
        }
        Command::Grade(cmd) => {
            let config = Config::load(cli.config.as_deref())?;
            cmd.execute(&config, format).await
        }
    }
}

/// Logs go to stderr so JSON on stdout stays parseable.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,quizgen=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
