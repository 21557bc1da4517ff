//! Sitemap discovery through robots.txt.
//!
//! Only `Sitemap:` lines are read. Allow/Disallow and crawl-delay rules are
//! not interpreted.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;

use super::Fetch;
use super::url::resolve_location;

/// Conventional sitemap paths tried when robots.txt declares none.
pub const FALLBACK_PATHS: [&str; 3] = ["/sitemap.xml", "/sitemap_index.xml", "/sitemaps.xml"];

/// Default timeout for robots.txt requests.
pub const ROBOTS_TIMEOUT: Duration = Duration::from_secs(10);

static SITEMAP_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sitemap:\s*(.+)").expect("sitemap directive pattern is valid"));

/// Error type for robots.txt operations.
#[derive(Debug, thiserror::Error)]
pub enum RobotsError {
    #[error("failed to fetch robots.txt from {robots_url}: {reason}")]
    FetchError { robots_url: String, reason: String },
}

/// Extract every `Sitemap:` value in file order, duplicates kept.
///
/// Matching is case-insensitive and per line; the captured value is trimmed.
pub fn parse_sitemap_directives(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| SITEMAP_DIRECTIVE.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|value| value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// `{authority}/sitemap.xml`, `{authority}/sitemap_index.xml`, `{authority}/sitemaps.xml`.
pub fn fallback_candidates(authority: &str) -> Vec<String> {
    FALLBACK_PATHS
        .iter()
        .map(|path| format!("{}{}", authority, path))
        .collect()
}

/// Reads sitemap declarations from a host's robots.txt.
#[derive(Clone)]
pub struct RobotsResolver {
    fetcher: Arc<dyn Fetch>,
    timeout: Duration,
}

impl RobotsResolver {
    pub fn new(fetcher: Arc<dyn Fetch>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// Sitemap URLs declared in `{authority}/robots.txt`.
    ///
    /// Relative declarations are joined onto the authority. A missing or
    /// unreachable robots.txt is an error; a robots.txt without `Sitemap:`
    /// lines yields an empty list.
    pub async fn sitemap_urls(&self, authority: &str) -> Result<Vec<String>, RobotsError> {
        let robots_url = format!("{}/robots.txt", authority);

        let response = self
            .fetcher
            .fetch(&robots_url, self.timeout)
            .await
            .map_err(|e| RobotsError::FetchError { robots_url: robots_url.clone(), reason: e.to_string() })?;

        let content = String::from_utf8_lossy(&response.bytes);
        let base = url::Url::parse(&robots_url).ok();

        let urls: Vec<String> = parse_sitemap_directives(&content)
            .iter()
            .map(|value| resolve_location(base.as_ref(), value))
            .collect();

        tracing::debug!("robots.txt at {} declares {} sitemap(s)", robots_url, urls.len());

        Ok(urls)
    }
}
