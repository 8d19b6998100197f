use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{QuizError, Result};
use crate::provider::{ProviderConfig, ProviderKind};
use crate::quiz::QuizOptions;

/// File name looked up in the working directory
const LOCAL_CONFIG_FILE: &str = "quizgen.toml";

/// Main configuration structure for quizgen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider used when none is given on the command line
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    /// Question generation and grading settings
    #[serde(default)]
    pub quiz: QuizConfig,
    /// HTTP client settings shared by all providers
    #[serde(default)]
    pub http: HttpConfig,
    /// Per-provider credentials and models
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            quiz: QuizConfig::default(),
            http: HttpConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

fn default_provider() -> ProviderKind {
    ProviderKind::OpenAi
}

/// Question generation and grading settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Questions requested per generation
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    /// Output token budget for generation
    #[serde(default = "default_generation_max_tokens")]
    pub generation_max_tokens: u32,
    /// Output token budget for grading
    #[serde(default = "default_grading_max_tokens")]
    pub grading_max_tokens: u32,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            generation_max_tokens: default_generation_max_tokens(),
            grading_max_tokens: default_grading_max_tokens(),
        }
    }
}

fn default_question_count() -> usize {
    QuizOptions::default().question_count
}

fn default_generation_max_tokens() -> u32 {
    QuizOptions::default().generation_max_tokens
}

fn default_grading_max_tokens() -> u32 {
    QuizOptions::default().grading_max_tokens
}

/// HTTP client settings
///
/// Both timeouts are unset by default, leaving the transport defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Connection timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
}

/// Settings for every provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_openai")]
    pub openai: ProviderSettings,
    #[serde(default = "default_anthropic")]
    pub anthropic: ProviderSettings,
    #[serde(default = "default_deepseek")]
    pub deepseek: ProviderSettings,
    #[serde(default = "default_gemini")]
    pub gemini: ProviderSettings,
    #[serde(default = "default_mistral")]
    pub mistral: ProviderSettings,
    #[serde(default = "default_ollama")]
    pub ollama: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: default_openai(),
            anthropic: default_anthropic(),
            deepseek: default_deepseek(),
            gemini: default_gemini(),
            mistral: default_mistral(),
            ollama: default_ollama(),
        }
    }
}

fn default_openai() -> ProviderSettings {
    ProviderSettings::for_kind(ProviderKind::OpenAi)
}

fn default_anthropic() -> ProviderSettings {
    ProviderSettings::for_kind(ProviderKind::Anthropic)
}

fn default_deepseek() -> ProviderSettings {
    ProviderSettings::for_kind(ProviderKind::DeepSeek)
}

fn default_gemini() -> ProviderSettings {
    ProviderSettings::for_kind(ProviderKind::Gemini)
}

fn default_mistral() -> ProviderSettings {
    ProviderSettings::for_kind(ProviderKind::Mistral)
}

fn default_ollama() -> ProviderSettings {
    ProviderSettings::for_kind(ProviderKind::Ollama)
}

/// Credentials and model for one provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Literal API key (takes precedence over `api_key_env`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Model identifier (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Server base URL, used by the local provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderSettings {
    /// Stock settings: the conventional key variable and the default model
    pub fn for_kind(kind: ProviderKind) -> Self {
        Self {
            api_key: None,
            api_key_env: kind.default_api_key_env().map(str::to_string),
            model: Some(kind.default_model().to_string()),
            base_url: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from the first default location that exists,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                tracing::info!("Loading config from: {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Default locations, in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        [
            dirs::home_dir().map(|h| h.join(".quizgen").join("config.toml")),
            dirs::config_dir().map(|c| c.join("quizgen").join("config.toml")),
            Some(PathBuf::from(LOCAL_CONFIG_FILE)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Where `config init` writes when no path is given
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".quizgen").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            QuizError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| QuizError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| QuizError::Config(format!("Failed to serialize config: {e}")))
    }

    /// Write the config as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    pub fn settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.providers.openai,
            ProviderKind::Anthropic => &self.providers.anthropic,
            ProviderKind::DeepSeek => &self.providers.deepseek,
            ProviderKind::Gemini => &self.providers.gemini,
            ProviderKind::Mistral => &self.providers.mistral,
            ProviderKind::Ollama => &self.providers.ollama,
        }
    }

    /// Call settings for `kind`, reading key variables from the process
    /// environment.
    pub fn provider_config(&self, kind: ProviderKind) -> ProviderConfig {
        self.provider_config_with(kind, |name| std::env::var(name).ok())
    }

    /// Call settings for the default provider
    pub fn active_provider_config(&self) -> ProviderConfig {
        self.provider_config(self.provider)
    }

    /// Like [`provider_config`](Self::provider_config) with a custom
    /// variable lookup.
    pub fn provider_config_with(
        &self,
        kind: ProviderKind,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ProviderConfig {
        let settings = self.settings(kind);
        let model = settings
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(kind.default_model());

        let mut config = ProviderConfig::new(kind, model);
        config.api_key = resolve_api_key(settings, lookup);
        if kind == ProviderKind::Ollama {
            config.endpoint_override = settings.base_url.clone();
        }
        config
    }

    pub fn quiz_options(&self) -> QuizOptions {
        QuizOptions {
            question_count: self.quiz.question_count,
            generation_max_tokens: self.quiz.generation_max_tokens,
            grading_max_tokens: self.quiz.grading_max_tokens,
        }
    }
}

fn resolve_api_key(
    settings: &ProviderSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let literal = settings
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());
    if let Some(key) = literal {
        return Some(key.to_string());
    }

    settings
        .api_key_env
        .as_deref()
        .and_then(|name| lookup(name))
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.quiz.question_count, 5);
        assert_eq!(config.quiz.generation_max_tokens, 4096);
        assert_eq!(config.quiz.grading_max_tokens, 2048);
        assert_eq!(config.http.timeout_secs, None);
        assert_eq!(
            config.providers.anthropic.api_key_env.as_deref(),
            Some("ANTHROPIC_API_KEY")
        );
        assert_eq!(config.providers.ollama.model.as_deref(), Some("llama3.2"));
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
provider = "ollama"

[quiz]
question_count = 8

[http]
timeout_secs = 90

[providers.ollama]
base_url = "http://gpu-box:11434"
model = "qwen2.5"
"#,
        )
        .unwrap();

        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.quiz.question_count, 8);
        assert_eq!(config.quiz.grading_max_tokens, 2048);
        assert_eq!(config.http.timeout_secs, Some(90));

        let call = config.active_provider_config();
        assert_eq!(call.model, "qwen2.5");
        assert_eq!(call.endpoint_override.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(call.api_key, None);
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let err = Config::from_toml_str("provider = \"cohere\"").unwrap_err();
        assert!(matches!(err, QuizError::Config(_)));
    }

    #[test]
    fn test_literal_key_wins_over_env() {
        let mut config = Config::default();
        config.providers.openai.api_key = Some("sk-literal".to_string());

        let call =
            config.provider_config_with(ProviderKind::OpenAi, |_| Some("sk-env".to_string()));
        assert_eq!(call.api_key.as_deref(), Some("sk-literal"));
    }

    #[test]
    fn test_key_from_named_env_var() {
        let mut config = Config::default();
        config.providers.gemini.api_key_env = Some("MY_GEMINI".to_string());

        let call = config.provider_config_with(ProviderKind::Gemini, |name| {
            (name == "MY_GEMINI").then(|| " g-key ".to_string())
        });
        assert_eq!(call.api_key.as_deref(), Some("g-key"));
        assert_eq!(call.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_missing_or_blank_key_is_none() {
        let mut config = Config::default();
        config.providers.mistral.api_key = Some("  ".to_string());

        let call = config.provider_config_with(ProviderKind::Mistral, no_env);
        assert_eq!(call.api_key, None);
        assert_eq!(call.endpoint_override, None);
    }

    #[test]
    fn test_base_url_only_applies_to_ollama() {
        let mut config = Config::default();
        config.providers.openai.base_url = Some("http://proxy".to_string());

        let call = config.provider_config_with(ProviderKind::OpenAi, no_env);
        assert_eq!(call.endpoint_override, None);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.provider = ProviderKind::DeepSeek;
        config.quiz.question_count = 3;
        config.providers.deepseek.api_key = Some("ds-key".to_string());
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.provider, ProviderKind::DeepSeek);
        assert_eq!(loaded.quiz.question_count, 3);
        assert_eq!(loaded.providers.deepseek, config.providers.deepseek);
        assert_eq!(loaded.quiz_options().question_count, 3);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, QuizError::Config(_)));
    }
}
