//! get_sitemap tool implementation.
//!
//! Serves a site's resolved sitemap from the cache, resolving and storing
//! it on a miss. Shared by the MCP tool and `POST /get-sitemap`.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sitescan_core::{Error, ResolutionResult};

use crate::state::AppState;

/// Parameters for the get_sitemap tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetSitemapParams {
    /// Site to resolve. Any URL on the site works; it is also the cache key.
    #[serde(default)]
    pub url: String,

    /// Drop any cached result and resolve again.
    #[serde(default)]
    pub refresh_cache: bool,
}

/// Output from the get_sitemap tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetSitemapOutput {
    pub sitemap: ResolutionResult,
    /// Whether the result came from the cache.
    pub cached: bool,
}

/// Look up, or resolve and store, the sitemap for `params.url`.
pub async fn get_sitemap(state: &AppState, params: GetSitemapParams) -> Result<GetSitemapOutput, Error> {
    let url = params.url;
    if url.trim().is_empty() {
        return Err(Error::InvalidInput("URL is required".into()));
    }

    if params.refresh_cache {
        state.cache.invalidate(&url);
        tracing::info!(url = %url, "cache refreshed");
    } else if let Some(sitemap) = state.cache.lookup(&url) {
        tracing::info!(url = %url, "cache hit");
        return Ok(GetSitemapOutput { sitemap, cached: true });
    }

    tracing::info!(url = %url, "cache miss, resolving");
    let sitemap = state.scanner.resolve(&url).await?;

    if sitemap.is_failure() {
        let ttl = state.config.negative_cache_ttl();
        if !ttl.is_zero() {
            state.cache.store_with_ttl(url.clone(), sitemap.clone(), ttl);
        }
        tracing::info!(url = %url, error = sitemap.error.as_deref().unwrap_or_default(), "no sitemap data");
    } else {
        state.cache.store(url.clone(), sitemap.clone());
        tracing::info!(url = %url, urls = sitemap.urls.len(), "sitemap stored in cache");
    }

    Ok(GetSitemapOutput { sitemap, cached: false })
}

/// Implementation of the get_sitemap tool.
pub async fn get_sitemap_impl(state: &AppState, params: GetSitemapParams) -> Result<CallToolResult, McpError> {
    let output = get_sitemap(state, params).await?;
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize sitemap: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
