//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, defaults, or flags.

use crate::config::AppConfig;
use thiserror::Error;

/// Largest cache the service will agree to hold.
const MAX_CACHE_CAPACITY: usize = 100_000;

/// Longest cache lifetime accepted, one year.
const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `host` is empty
    /// - `cache_capacity` is 0 or exceeds 100 000 entries
    /// - `cache_ttl_secs` or `sweep_interval_secs` is 0
    /// - `cache_ttl_secs` exceeds one year
    /// - `timeout_ms` is set and is less than 100ms or exceeds 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Invalid { field: "host".into(), reason: "must not be empty".into() });
        }

        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid { field: "cache_capacity".into(), reason: "must be greater than 0".into() });
        }
        if self.cache_capacity > MAX_CACHE_CAPACITY {
            return Err(ConfigError::Invalid {
                field: "cache_capacity".into(),
                reason: format!("must not exceed {MAX_CACHE_CAPACITY}"),
            });
        }

        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::Invalid {
                field: "cache_ttl_secs".into(),
                reason: format!("must not exceed {MAX_CACHE_TTL_SECS} (one year)"),
            });
        }

        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sweep_interval_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms < 100 {
                return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
            }
            if timeout_ms > 300_000 {
                return Err(ConfigError::Invalid {
                    field: "timeout_ms".into(),
                    reason: "must not exceed 5 minutes (300000ms)".into(),
                });
            }
        }

        if self.sweep_interval_secs > self.cache_ttl_secs {
            tracing::warn!(
                sweep_interval_secs = self.sweep_interval_secs,
                cache_ttl_secs = self.cache_ttl_secs,
                "sweep interval is longer than the cache TTL; expired entries rely on lazy removal"
            );
        }

        Ok(())
    }
}
