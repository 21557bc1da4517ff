//! In-memory result cache keyed by the caller's target URL.
//!
//! Records expire after a TTL. Expired records read as absent immediately
//! and are physically removed by [`SitemapCache::sweep`], which the
//! background [`Sweeper`] runs on a fixed interval. The map is sharded, so a
//! sweep only locks one shard at a time.

mod sweeper;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::time::Instant;

use crate::sitemap::ResolutionResult;

pub use sweeper::Sweeper;

/// A stored resolution with its expiry.
#[derive(Debug, Clone)]
pub struct CacheRecord {
    pub result: ResolutionResult,
    pub stored_at: DateTime<Utc>,
    expires_at: Instant,
}

impl CacheRecord {
    fn new(result: ResolutionResult, ttl: Duration) -> Self {
        Self { result, stored_at: Utc::now(), expires_at: Instant::now() + ttl }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Time left before the record expires.
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Result cache shared by every request of one server instance.
#[derive(Debug)]
pub struct SitemapCache {
    records: DashMap<String, CacheRecord>,
    default_ttl: Duration,
}

impl SitemapCache {
    /// Create a cache whose records live for `default_ttl` unless stored
    /// with an explicit TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self { records: DashMap::new(), default_ttl }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Fetch the live record for `key`, if any.
    pub fn get(&self, key: &str) -> Option<CacheRecord> {
        self.records
            .get(key)
            .filter(|record| !record.is_expired())
            .map(|record| record.clone())
    }

    /// Fetch the cached result for `key`. Expired records count as missing.
    pub fn lookup(&self, key: &str) -> Option<ResolutionResult> {
        self.get(key).map(|record| record.result)
    }

    /// Remove `key`. Returns whether a record was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.records.remove(key).is_some()
    }

    /// Store `result` under `key` with the default TTL, replacing any record.
    pub fn store(&self, key: impl Into<String>, result: ResolutionResult) {
        self.store_with_ttl(key, result, self.default_ttl);
    }

    /// Store `result` under `key` with an explicit TTL, replacing any record.
    pub fn store_with_ttl(&self, key: impl Into<String>, result: ResolutionResult, ttl: Duration) {
        self.records.insert(key.into(), CacheRecord::new(result, ttl));
    }

    /// Remove every expired record. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired());
        before.saturating_sub(self.records.len())
    }

    /// Number of records held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Start a background task that sweeps this cache every `interval`.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> Sweeper {
        Sweeper::spawn(Arc::clone(self), interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sitemap::{NO_SITEMAP_DATA, SitemapEntry};

    const TTL: Duration = Duration::from_secs(24 * 60 * 60);

    fn result(loc: &str) -> ResolutionResult {
        ResolutionResult::from_parts(
            vec![SitemapEntry {
                sitemap: "https://a.example/sitemap.xml".into(),
                loc: loc.into(),
                lastmod: None,
                changefreq: None,
                priority: None,
            }],
            vec!["https://a.example/sitemap.xml".into()],
        )
    }

    #[tokio::test]
    async fn test_lookup_missing() {
        let cache = SitemapCache::new(TTL);
        assert!(cache.lookup("https://a.example").is_none());
    }

    #[tokio::test]
    async fn test_store_then_lookup() {
        let cache = SitemapCache::new(TTL);
        cache.store("https://a.example", result("https://a.example/"));

        let found = cache.lookup("https://a.example").unwrap();
        assert_eq!(found.urls[0].loc, "https://a.example/");
    }

    #[tokio::test]
    async fn test_keys_are_not_normalized() {
        let cache = SitemapCache::new(TTL);
        cache.store("a.example", result("https://a.example/"));

        assert!(cache.lookup("a.example").is_some());
        assert!(cache.lookup("https://a.example").is_none());
    }

    #[tokio::test]
    async fn test_store_replaces_record() {
        let cache = SitemapCache::new(TTL);
        cache.store("k", result("https://a.example/old"));
        cache.store("k", result("https://a.example/new"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup("k").unwrap().urls[0].loc, "https://a.example/new");
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let cache = SitemapCache::new(TTL);
        cache.store("k", result("https://a.example/"));

        assert!(cache.invalidate("k"));
        assert!(!cache.invalidate("k"));
        assert!(cache.lookup("k").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_record_reads_as_absent() {
        let cache = SitemapCache::new(Duration::from_secs(60));
        cache.store("k", result("https://a.example/"));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.lookup("k").is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.lookup("k").is_none());
        // still physically present until swept
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_restarts_ttl() {
        let cache = SitemapCache::new(Duration::from_secs(60));
        cache.store("k", result("https://a.example/"));

        tokio::time::advance(Duration::from_secs(50)).await;
        cache.store("k", result("https://a.example/"));
        tokio::time::advance(Duration::from_secs(50)).await;

        assert!(cache.lookup("k").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let cache = SitemapCache::new(Duration::from_secs(60));
        cache.store_with_ttl("short", ResolutionResult::failed(NO_SITEMAP_DATA), Duration::from_secs(10));
        cache.store("long", result("https://a.example/"));

        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(cache.sweep(), 1);
        assert!(cache.lookup("short").is_none());
        assert!(cache.lookup("long").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_remaining() {
        let cache = SitemapCache::new(Duration::from_secs(60));
        cache.store("k", result("https://a.example/"));
        tokio::time::advance(Duration::from_secs(20)).await;

        let record = cache.get("k").unwrap();
        assert_eq!(record.remaining(), Duration::from_secs(40));
    }
}
