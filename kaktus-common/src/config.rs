//! Configuration loading for Kaktus services
//!
//! Settings are resolved with the following priority order:
//! 1. Command-line argument (highest priority, applied by the binary)
//! 2. Environment variable (`KAKTUS_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the service logs a warning and starts
//! with compiled defaults. A TOML file that exists but cannot be parsed is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Groq's OpenAI-compatible endpoint
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Complete TOML configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5730,
        }
    }
}

/// Upstream LLM provider settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key (prefer the environment for secrets)
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub base_url: String,
    /// Model identifier sent with every completion request
    pub model: String,
    /// Per-call timeout
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: 60,
        }
    }
}

/// Batching, throttling and concurrency knobs for an analysis run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Reviews per classification request
    pub batch_size: usize,
    /// Minimum spacing between outbound provider calls.
    /// 4000 ms keeps a free-tier quota of 15 calls/minute.
    pub min_interval_ms: u64,
    /// Maximum simultaneous insight extraction calls
    pub insight_concurrency: usize,
    /// Retries per provider call after the first attempt
    pub max_retries: u32,
    /// Backoff before retry N is `N * retry_backoff_ms`
    pub retry_backoff_ms: u64,
    /// Data rows read from an uploaded CSV; later rows are ignored
    pub csv_row_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            min_interval_ms: 4000,
            insight_concurrency: 5,
            max_retries: 1,
            retry_backoff_ms: 2000,
            csv_row_limit: 100,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter (`RUST_LOG` still takes precedence)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Apply `KAKTUS_*` environment variables on top of file values
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Some(host) = env_value::<String>("KAKTUS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_value("KAKTUS_PORT") {
            self.server.port = port;
        }
        if let Some(url) = env_value::<String>("KAKTUS_PROVIDER_URL") {
            self.provider.base_url = url;
        }
        if let Some(model) = env_value::<String>("KAKTUS_MODEL") {
            self.provider.model = model;
        }
        if let Some(secs) = env_value("KAKTUS_TIMEOUT_SECONDS") {
            self.provider.timeout_seconds = secs;
        }
        if let Some(size) = env_value("KAKTUS_BATCH_SIZE") {
            self.analysis.batch_size = size;
        }
        if let Some(ms) = env_value("KAKTUS_MIN_INTERVAL_MS") {
            self.analysis.min_interval_ms = ms;
        }
        if let Some(n) = env_value("KAKTUS_INSIGHT_CONCURRENCY") {
            self.analysis.insight_concurrency = n;
        }
        if let Some(n) = env_value("KAKTUS_MAX_RETRIES") {
            self.analysis.max_retries = n;
        }
        if let Some(n) = env_value("KAKTUS_CSV_ROW_LIMIT") {
            self.analysis.csv_row_limit = n;
        }
        if let Some(level) = env_value::<String>("KAKTUS_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Reject settings that would stall or divide a run by zero
    pub fn validate(&self) -> Result<()> {
        if self.analysis.batch_size == 0 {
            return Err(Error::Config("analysis.batch_size must be at least 1".to_string()));
        }
        if self.analysis.insight_concurrency == 0 {
            return Err(Error::Config(
                "analysis.insight_concurrency must be at least 1".to_string(),
            ));
        }
        if self.analysis.csv_row_limit == 0 {
            return Err(Error::Config(
                "analysis.csv_row_limit must be at least 1".to_string(),
            ));
        }
        if self.provider.timeout_seconds == 0 {
            return Err(Error::Config(
                "provider.timeout_seconds must be at least 1".to_string(),
            ));
        }
        if self.provider.model.trim().is_empty() {
            return Err(Error::Config("provider.model must not be empty".to_string()));
        }
        Ok(())
    }
}

fn env_value<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable environment variable {}={:?}", name, raw);
            None
        }
    }
}

/// Default config file location: `<config_dir>/kaktus/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kaktus").join(format!("{}.toml", module_name)))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Locates and loads a module's TOML configuration
pub struct ConfigLoader {
    module_name: String,
    explicit_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            explicit_path: None,
        }
    }

    /// Use this path instead of the platform default (e.g. from `--config`)
    pub fn with_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    /// Path that [`load`](Self::load) will read, if one can be determined
    pub fn config_path(&self) -> Option<PathBuf> {
        self.explicit_path
            .clone()
            .or_else(|| default_config_path(&self.module_name))
    }

    /// Load TOML (or defaults) and apply environment overrides
    pub fn load(&self) -> Result<TomlConfig> {
        let mut config = match self.config_path() {
            Some(path) if path.exists() => {
                let config = load_toml_config(&path)?;
                info!("Loaded configuration from {}", path.display());
                config
            }
            Some(path) => {
                // An explicitly requested file must exist
                if self.explicit_path.is_some() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                warn!(
                    "No config file at {}; using compiled defaults",
                    path.display()
                );
                TomlConfig::default()
            }
            None => {
                warn!("Could not determine config directory; using compiled defaults");
                TomlConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
