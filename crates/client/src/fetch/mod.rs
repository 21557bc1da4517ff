//! HTTP fetch pipeline for robots.txt and sitemap documents.
//!
//! ### Target normalization
//! - Trim whitespace, ensure scheme (default: `https`)
//! - Reduce to an authority (`scheme://host[:port]`)
//!
//! ### Fetch rules
//! - Every request carries its own timeout, covering the body as well
//! - Only `200 OK` counts as success
//! - Max body bytes: 50MB (configurable)

pub mod robots;
pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{Client, StatusCode, Url, header};

pub use robots::{RobotsError, RobotsResolver, fallback_candidates, parse_sitemap_directives};
pub use self::url::{Target, UrlError, normalize_target};

use sitescan_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "sitescan/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 50MB)
    pub max_bytes: usize,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "sitescan/0.1".to_string(), max_bytes: 50 * 1024 * 1024, max_redirects: 5 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), max_bytes: config.max_bytes, ..Default::default() }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// A single-resource GET with a per-call timeout.
///
/// Implementations must fail on any status other than `200 OK`.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, Error>;
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn too_large(&self, len: usize) -> Error {
        Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes))
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("{}: {}", url, err))
    } else {
        Error::HttpError(format!("{}: network error: {}", url, err))
    }
}

#[async_trait]
impl Fetch for FetchClient {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

        let mut response = self
            .http
            .get(parsed)
            .timeout(timeout)
            .header(header::ACCEPT, "application/xml,text/xml;q=0.9,text/plain;q=0.8,*/*;q=0.5")
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::HttpError(format!("{}: status {}", url, status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(self.too_large(len as usize));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| transport_error(url, e))? {
            if body.len() + chunk.len() > self.config.max_bytes {
                return Err(self.too_large(body.len() + chunk.len()));
            }
            body.extend_from_slice(&chunk);
        }
        let bytes = body.freeze();

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, bytes.len());

        Ok(FetchResponse { final_url, status, content_type, bytes, fetch_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "sitescan/0.1");
        assert_eq!(config.max_bytes, 50 * 1024 * 1024);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "custom/1.0".into(), max_bytes: 1024, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "custom/1.0");
        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.max_redirects, 5);
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        let client = FetchClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_rejects_unparseable_url() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let result = client.fetch("not a url", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
