//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SITESCAN_*)
//! 2. TOML config file (if SITESCAN_CONFIG_FILE set)
//! 3. Built-in defaults

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// How the server exposes the `get_sitemap` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON API over HTTP (`POST /get-sitemap`).
    #[default]
    Http,
    /// MCP tools over stdin/stdout.
    Stdio,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SITESCAN_*)
/// 2. TOML config file (if SITESCAN_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string for HTTP requests.
    ///
    /// Set via SITESCAN_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to read per fetched document.
    ///
    /// Set via SITESCAN_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Timeout for `robots.txt` requests in milliseconds.
    #[serde(default = "default_robots_timeout_ms")]
    pub robots_timeout_ms: u64,

    /// Timeout for each sitemap document in milliseconds.
    #[serde(default = "default_sitemap_timeout_ms")]
    pub sitemap_timeout_ms: u64,

    /// Optional deadline for a whole resolution in milliseconds.
    #[serde(default)]
    pub resolve_timeout_ms: Option<u64>,

    /// Deepest allowed sitemap-index nesting.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum sitemap documents fetched for one resolution.
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,

    /// Maximum sitemap fetches in flight for one resolution.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Lifetime of a cached result, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// How often expired cache records are swept, in seconds.
    #[serde(default = "default_cache_sweep_interval_secs")]
    pub cache_sweep_interval_secs: u64,

    /// Lifetime of a cached result that carries an error. 0 disables it.
    #[serde(default = "default_negative_cache_ttl_secs")]
    pub negative_cache_ttl_secs: u64,

    /// Server transport.
    ///
    /// Set via SITESCAN_TRANSPORT environment variable (`http` or `stdio`).
    #[serde(default)]
    pub transport: Transport,

    /// Address the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Basic auth username. Auth is enabled only when password is set too.
    #[serde(default)]
    pub username: Option<String>,

    /// Basic auth password.
    #[serde(default)]
    pub password: Option<String>,
}

fn default_user_agent() -> String {
    "sitescan/0.1".into()
}

fn default_max_bytes() -> usize {
    52_428_800 // 50MB, the sitemap protocol limit
}

fn default_robots_timeout_ms() -> u64 {
    10_000
}

fn default_sitemap_timeout_ms() -> u64 {
    30_000
}

fn default_max_depth() -> usize {
    5
}

fn default_max_documents() -> usize {
    1_000
}

fn default_max_concurrency() -> usize {
    4
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_cache_sweep_interval_secs() -> u64 {
    default_cache_ttl_secs() / 48
}

fn default_negative_cache_ttl_secs() -> u64 {
    10 * 60
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    4000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            robots_timeout_ms: default_robots_timeout_ms(),
            sitemap_timeout_ms: default_sitemap_timeout_ms(),
            resolve_timeout_ms: None,
            max_depth: default_max_depth(),
            max_documents: default_max_documents(),
            max_concurrency: default_max_concurrency(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_sweep_interval_secs: default_cache_sweep_interval_secs(),
            negative_cache_ttl_secs: default_negative_cache_ttl_secs(),
            transport: Transport::default(),
            host: default_host(),
            port: default_port(),
            username: None,
            password: None,
        }
    }
}

impl AppConfig {
    pub fn robots_timeout(&self) -> Duration {
        Duration::from_millis(self.robots_timeout_ms)
    }

    pub fn sitemap_timeout(&self) -> Duration {
        Duration::from_millis(self.sitemap_timeout_ms)
    }

    pub fn resolve_timeout(&self) -> Option<Duration> {
        self.resolve_timeout_ms.map(Duration::from_millis)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }

    pub fn negative_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.negative_cache_ttl_secs)
    }

    /// Socket address for the HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| ConfigError::Invalid {
            field: "host".into(),
            reason: format!("not an IP address: {}", self.host),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Basic auth credentials, present only when both halves are configured.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SITESCAN_`
    /// 2. TOML file from `SITESCAN_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The layered figment used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SITESCAN_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("SITESCAN_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }
}
