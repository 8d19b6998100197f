pub mod config;
pub mod generate;
pub mod grade;

pub use config::ConfigCommand;
pub use generate::GenerateCommand;
pub use grade::GradeCommand;

use quizgen::{Config, ProviderConfig, ProviderKind};

/// Provider call settings from config, with command-line overrides applied.
pub(crate) fn resolve_provider(
    config: &Config,
    provider: Option<ProviderKind>,
    model: Option<&str>,
) -> ProviderConfig {
    let mut call = config.provider_config(provider.unwrap_or(config.provider));
    if let Some(model) = model.map(str::trim).filter(|m| !m.is_empty()) {
        call.model = model.to_string();
    }
    call
}
