//! Configuration loading from crm-assistant.toml.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "crm-assistant.toml";
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Top-level configuration. Every section may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub store: StoreConfig,
    pub scoring: ScoringConfig,
    pub logging: LoggingConfig,
}

/// Backend provider configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Provider name (currently only "anthropic" supported).
    pub provider: String,

    /// Model to use.
    pub model: String,

    /// Anthropic API key. Falls back to `ANTHROPIC_API_KEY`.
    pub api_key: Option<String>,

    pub max_tokens: u32,

    /// Messages endpoint override, e.g. for a proxy.
    pub base_url: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key: None,
            max_tokens: 1024,
            base_url: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database holding pipeline records.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("pipeline.db"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Pause before each scoring request, in milliseconds.
    pub delay_ms: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { delay_ms: 1000 }
    }
}

impl ScoringConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load `path` if given, else `crm-assistant.toml` if present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The API key from config, or from the environment.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        Self::resolve_api_key(
            self.backend.api_key.as_deref(),
            std::env::var(API_KEY_ENV).ok(),
        )
    }

    fn resolve_api_key(configured: Option<&str>, env: Option<String>) -> Result<String, ConfigError> {
        configured
            .map(str::to_string)
            .or(env)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("API key not configured: set backend.api_key or ANTHROPIC_API_KEY")]
    MissingApiKey,

    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),
}
