use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use quizgen::{Config, ProviderKind};

use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct ConfigCommand {
    #[clap(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    #[clap(about = "Show the effective configuration")]
    Show,

    #[clap(about = "Write a default config file")]
    Init(InitArgs),

    #[clap(about = "Show where config files are looked up")]
    Path,
}

#[derive(Parser)]
pub struct InitArgs {
    #[clap(long, short, help = "Overwrite an existing file")]
    pub force: bool,
}

impl ConfigCommand {
    pub async fn execute(&self, config_path: Option<&Path>, format: OutputFormat) -> CliResult<()> {
        match &self.command {
            ConfigSubcommand::Show => Self::show(config_path, format),
            ConfigSubcommand::Init(args) => Self::init(config_path, args, format),
            ConfigSubcommand::Path => Self::path(config_path, format),
        }
    }

    fn show(config_path: Option<&Path>, format: OutputFormat) -> CliResult<()> {
        let config = Config::load(config_path)?;

        match format {
            OutputFormat::Json => {
                let providers: Vec<_> = ProviderKind::ALL
                    .iter()
                    .map(|&kind| {
                        let call = config.provider_config(kind);
                        serde_json::json!({
                            "provider": kind,
                            "model": call.model,
                            "api_key": key_status(&config, kind, call.api_key().is_some()),
                            "base_url": call.endpoint_override,
                        })
                    })
                    .collect();
                let output = serde_json::json!({
                    "provider": config.provider,
                    "quiz": {
                        "question_count": config.quiz.question_count,
                        "generation_max_tokens": config.quiz.generation_max_tokens,
                        "grading_max_tokens": config.quiz.grading_max_tokens,
                    },
                    "http": {
                        "timeout_secs": config.http.timeout_secs,
                        "connect_timeout_secs": config.http.connect_timeout_secs,
                    },
                    "providers": providers,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Setting", "Value"]);

                table.add_row(["Default provider", config.provider.as_str()]);
                table.add_row(["Questions per set", &config.quiz.question_count.to_string()]);
                table.add_row([
                    "Generation max tokens",
                    &config.quiz.generation_max_tokens.to_string(),
                ]);
                table.add_row([
                    "Grading max tokens",
                    &config.quiz.grading_max_tokens.to_string(),
                ]);
                table.add_row([
                    "HTTP timeout",
                    &config
                        .http
                        .timeout_secs
                        .map_or("-".to_string(), |s| format!("{s}s")),
                ]);
                println!("{table}");

                let mut providers = Table::new();
                providers
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Provider", "Model", "API key", "Base URL"]);

                for kind in ProviderKind::ALL {
                    let call = config.provider_config(kind);
                    providers.add_row([
                        kind.as_str().to_string(),
                        call.model.clone(),
                        key_status(&config, kind, call.api_key().is_some()),
                        call.endpoint_override.clone().unwrap_or_else(|| "-".to_string()),
                    ]);
                }
                println!("{providers}");
            }
        }

        Ok(())
    }

    fn init(config_path: Option<&Path>, args: &InitArgs, format: OutputFormat) -> CliResult<()> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Config::default_path);

        if path.exists() && !args.force {
            return Err(format!(
                "Config file already exists at {} (use --force to overwrite)",
                path.display()
            )
            .into());
        }

        Config::default().save(&path)?;

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "path": path,
                    "created": true,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                println!("Wrote default config to {}", path.display());
            }
        }

        Ok(())
    }

    fn path(config_path: Option<&Path>, format: OutputFormat) -> CliResult<()> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.to_path_buf()],
            None => Config::search_paths(),
        };
        let active = candidates.iter().find(|p| p.exists());

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "search_paths": candidates,
                    "active": active,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                for candidate in &candidates {
                    let marker = if Some(candidate) == active { "*" } else { " " };
                    println!("{marker} {}", candidate.display());
                }
                if active.is_none() {
                    println!("\nNo config file found, using defaults.");
                }
            }
        }

        Ok(())
    }
}

/// How the key is supplied, never the key itself
fn key_status(config: &Config, kind: ProviderKind, present: bool) -> String {
    if !kind.requires_api_key() {
        return "not required".to_string();
    }

    let settings = config.settings(kind);
    let literal = settings
        .api_key
        .as_deref()
        .is_some_and(|k| !k.trim().is_empty());
    match (present, literal, &settings.api_key_env) {
        (true, true, _) => "set in config".to_string(),
        (true, false, Some(env)) => format!("from ${env}"),
        (_, _, Some(env)) => format!("missing (set ${env})"),
        _ => "missing".to_string(),
    }
}
