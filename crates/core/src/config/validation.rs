//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

const MAX_BYTES_LIMIT: usize = 100 * 1024 * 1024;
const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 300_000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < MIN_TIMEOUT_MS {
        return Err(invalid(field, "must be at least 100ms"));
    }
    if value > MAX_TIMEOUT_MS {
        return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 100MB
    /// - a fetch timeout is below 100ms or above 5 minutes
    /// - `max_depth` or `max_concurrency` is outside 1..=32
    /// - `max_documents` is 0
    /// - a cache duration is 0 or the negative TTL exceeds the TTL
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > MAX_BYTES_LIMIT {
            return Err(invalid("max_bytes", "must not exceed 100MB"));
        }

        check_timeout("robots_timeout_ms", self.robots_timeout_ms)?;
        check_timeout("sitemap_timeout_ms", self.sitemap_timeout_ms)?;
        if let Some(deadline) = self.resolve_timeout_ms
            && deadline < MIN_TIMEOUT_MS
        {
            return Err(invalid("resolve_timeout_ms", "must be at least 100ms"));
        }

        if !(1..=32).contains(&self.max_depth) {
            return Err(invalid("max_depth", "must be between 1 and 32"));
        }
        if !(1..=32).contains(&self.max_concurrency) {
            return Err(invalid("max_concurrency", "must be between 1 and 32"));
        }
        if self.max_documents == 0 {
            return Err(invalid("max_documents", "must be greater than 0"));
        }

        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }
        if self.cache_sweep_interval_secs == 0 {
            return Err(invalid("cache_sweep_interval_secs", "must be greater than 0"));
        }
        if self.negative_cache_ttl_secs > self.cache_ttl_secs {
            return Err(invalid("negative_cache_ttl_secs", "must not exceed cache_ttl_secs"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.username.is_some() != self.password.is_some() {
            tracing::warn!(
                username_set = self.username.is_some(),
                password_set = self.password.is_some(),
                "Only one of username and password is set; basic authentication stays disabled"
            );
        }

        Ok(())
    }
}
