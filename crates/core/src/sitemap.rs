//! Sitemap records and the aggregated resolution result.
//!
//! These are the types that cross the cache boundary and the wire, so their
//! serde layout is the public JSON format.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Message reported when no candidate sitemap produced any entry.
pub const NO_SITEMAP_DATA: &str = "No sitemap data found";

/// One page URL listed in a leaf sitemap (`<urlset><url>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SitemapEntry {
    /// The sitemap document this entry was read from.
    pub sitemap: String,
    pub loc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// A reference from a sitemap index (`<sitemapindex><sitemap>`) to another
/// sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapIndexEntry {
    pub loc: String,
    pub lastmod: Option<String>,
}

/// Aggregated result of resolving every sitemap reachable from a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResolutionResult {
    /// Leaf entries in discovery order. Duplicates are kept.
    pub urls: Vec<SitemapEntry>,

    /// Candidate sitemaps that contributed at least one entry.
    pub sitemap_urls: Vec<String>,

    /// Set only when `urls` is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolutionResult {
    /// Build a result from merged entries, setting `error` when nothing was found.
    pub fn from_parts(urls: Vec<SitemapEntry>, sitemap_urls: Vec<String>) -> Self {
        let error = urls.is_empty().then(|| NO_SITEMAP_DATA.to_string());
        Self { urls, sitemap_urls, error }
    }

    /// An empty result that only carries an error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self { urls: Vec::new(), sitemap_urls: Vec::new(), error: Some(message.into()) }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}
