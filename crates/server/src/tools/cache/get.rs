//! cache_get tool implementation.
//!
//! Retrieves a cached resolution by the URL it was requested with.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sitescan_core::{Error, ResolutionResult, SitemapCache};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// The URL exactly as it was passed to get_sitemap.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub url: String,
    pub sitemap: ResolutionResult,
    /// RFC 3339 timestamp of when the result was stored.
    pub stored_at: String,
    /// Seconds until the record expires.
    pub expires_in_secs: u64,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(cache: &SitemapCache, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let record = cache
        .get(&params.url)
        .ok_or_else(|| Error::CacheMiss(params.url.clone()))?;

    let output = CacheGetOutput {
        url: params.url,
        expires_in_secs: record.remaining().as_secs(),
        stored_at: record.stored_at.to_rfc3339(),
        sitemap: record.result,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize record: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
