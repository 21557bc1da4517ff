//! cache_invalidate tool implementation.
//!
//! Drops the cached resolution for one URL so the next get_sitemap call
//! resolves it again.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sitescan_core::{Error, SitemapCache};

/// Parameters for the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateParams {
    /// The URL exactly as it was passed to get_sitemap.
    pub url: String,
}

/// Output from the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateOutput {
    pub url: String,
    /// Whether a record was present.
    pub removed: bool,
}

/// Implementation of the cache_invalidate tool.
pub async fn invalidate_impl(cache: &SitemapCache, params: CacheInvalidateParams) -> Result<CallToolResult, McpError> {
    if params.url.is_empty() {
        return Err(Error::InvalidInput("URL is required".to_string()).into());
    }

    let removed = cache.invalidate(&params.url);
    tracing::info!(url = %params.url, removed, "cache invalidated");

    let output = CacheInvalidateOutput { url: params.url, removed };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitescan_core::ResolutionResult;
    use std::time::Duration;

    fn output_of(result: &CallToolResult) -> CacheInvalidateOutput {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_invalidate_present() {
        let cache = SitemapCache::new(Duration::from_secs(60));
        cache.store("https://example.com", ResolutionResult::failed("No sitemap data found"));

        let params = CacheInvalidateParams { url: "https://example.com".to_string() };
        let result = invalidate_impl(&cache, params).await.unwrap();

        assert!(output_of(&result).removed);
        assert!(cache.lookup("https://example.com").is_none());
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let cache = SitemapCache::new(Duration::from_secs(60));

        let params = CacheInvalidateParams { url: "https://example.com".to_string() };
        let result = invalidate_impl(&cache, params).await.unwrap();

        assert!(!output_of(&result).removed);
    }

    #[tokio::test]
    async fn test_invalidate_empty_url() {
        let cache = SitemapCache::new(Duration::from_secs(60));
        let params = CacheInvalidateParams { url: String::new() };

        assert!(invalidate_impl(&cache, params).await.is_err());
    }
}
