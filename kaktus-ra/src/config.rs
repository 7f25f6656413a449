//! Configuration resolution for kaktus-ra
//!
//! Provides provider API key resolution with ENV → TOML priority.

use kaktus_common::config::{is_valid_key, TomlConfig};
use kaktus_common::{Error, Result};
use tracing::{info, warn};

/// Environment variable holding the provider API key
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Resolve the provider API key from 2-tier configuration
///
/// **Priority:** ENV → TOML
pub fn resolve_provider_api_key(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .provider
        .api_key
        .as_ref()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Provider API key found in environment and TOML. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Provider API key loaded from environment variable");
        return Ok(key);
    }

    if let Some(key) = toml_key {
        info!("Provider API key loaded from TOML config");
        return Ok(key.clone());
    }

    Err(Error::Config(format!(
        "Provider API key not configured. Please configure using one of:\n\
         - Environment: {}=your-key\n\
         - TOML: [provider] api_key = \"your-key\"",
        API_KEY_ENV
    )))
}

