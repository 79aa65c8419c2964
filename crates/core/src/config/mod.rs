//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SIEVE_*)
//! 2. TOML config file (if SIEVE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::num::NonZeroUsize;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SIEVE_*)
/// 2. TOML config file (if SIEVE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host to listen on.
    ///
    /// Set via SIEVE_HOST environment variable or `--host`.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    ///
    /// Set via SIEVE_PORT environment variable or `--port`.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum number of cached responses.
    ///
    /// Set via SIEVE_CACHE_CAPACITY environment variable.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Lifetime of a cached response in seconds.
    ///
    /// Set via SIEVE_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// How often the background sweeper drops expired entries, in seconds.
    ///
    /// Set via SIEVE_SWEEP_INTERVAL_SECS environment variable.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Upstream request timeout in milliseconds.
    ///
    /// Unset means the HTTP client's own default applies.
    /// Set via SIEVE_TIMEOUT_MS environment variable.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_host() -> String {
    "localhost".into()
}

fn default_port() -> u16 {
    8080
}

fn default_cache_capacity() -> usize {
    10
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            timeout_ms: None,
        }
    }
}

impl AppConfig {
    /// Cache TTL as Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Cache capacity, clamped to at least one entry.
    pub fn cache_capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.cache_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    /// Sweep interval as Duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Upstream timeout as Duration, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Socket address string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SIEVE_`
    /// 2. TOML file from `SIEVE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// Validation is left to the caller so command-line overrides can be
    /// applied first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if the configuration file cannot be
    /// read or a value cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SIEVE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(Env::prefixed("SIEVE_").ignore(&["config_file"]));

        figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))
    }
}
