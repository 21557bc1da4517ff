//! Whole-site sitemap resolution.
//!
//! [`SitemapScanner::resolve`] turns a user-supplied URL into the merged
//! entries of every sitemap the site exposes. Candidates come from
//! robots.txt, or from the conventional fallback paths when robots.txt
//! declares none. A candidate that fails or yields nothing is dropped.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};

use sitescan_core::{AppConfig, Error, ResolutionResult};

use crate::fetch::robots::ROBOTS_TIMEOUT;
use crate::fetch::{Fetch, FetchClient, FetchConfig, RobotsResolver, Target, fallback_candidates, normalize_target};
use crate::sitemap::resolve::SITEMAP_TIMEOUT;
use crate::sitemap::{ResolveLimits, SitemapResolver, Traversal};

/// Scanner settings.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub robots_timeout: Duration,
    pub sitemap_timeout: Duration,
    /// Deadline for one whole resolution (default: none)
    pub resolve_timeout: Option<Duration>,
    pub limits: ResolveLimits,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            robots_timeout: ROBOTS_TIMEOUT,
            sitemap_timeout: SITEMAP_TIMEOUT,
            resolve_timeout: None,
            limits: ResolveLimits::default(),
        }
    }
}

impl From<&AppConfig> for ScanConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            robots_timeout: config.robots_timeout(),
            sitemap_timeout: config.sitemap_timeout(),
            resolve_timeout: config.resolve_timeout(),
            limits: ResolveLimits::from(config),
        }
    }
}

/// Discovers and resolves every sitemap of a site.
#[derive(Clone)]
pub struct SitemapScanner {
    robots: RobotsResolver,
    sitemaps: SitemapResolver,
    config: ScanConfig,
}

impl SitemapScanner {
    pub fn new(fetcher: Arc<dyn Fetch>, config: ScanConfig) -> Self {
        Self {
            robots: RobotsResolver::new(fetcher.clone(), config.robots_timeout),
            sitemaps: SitemapResolver::new(fetcher, config.sitemap_timeout, config.limits),
            config,
        }
    }

    /// Build a scanner backed by a reqwest [`FetchClient`].
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let fetcher = FetchClient::new(FetchConfig::from(config))?;
        Ok(Self::new(Arc::new(fetcher), ScanConfig::from(config)))
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Sitemap candidates for a site: robots.txt declarations, or the
    /// fallback paths when there are none or robots.txt is unavailable.
    pub async fn candidates(&self, authority: &str) -> Vec<String> {
        let declared = match self.robots.sitemap_urls(authority).await {
            Ok(urls) => urls,
            Err(e) => {
                tracing::debug!("{}", e);
                Vec::new()
            }
        };

        if declared.is_empty() {
            tracing::debug!(authority, "no sitemap declarations, using fallback paths");
            fallback_candidates(authority)
        } else {
            declared
        }
    }

    /// Resolve every sitemap reachable from `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] when `target` cannot be normalized.
    /// Every other failure is folded into the result: an empty result
    /// carries an error message instead.
    pub async fn resolve(&self, target: &str) -> Result<ResolutionResult, Error> {
        let target = normalize_target(target).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        match self.config.resolve_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, self.resolve_target(&target)).await {
                Ok(result) => Ok(result),
                Err(_) => {
                    tracing::warn!(authority = %target.authority, "resolution deadline of {:?} elapsed", deadline);
                    Ok(ResolutionResult::failed(format!(
                        "sitemap resolution timed out after {}ms",
                        deadline.as_millis()
                    )))
                }
            },
            None => Ok(self.resolve_target(&target).await),
        }
    }

    async fn resolve_target(&self, target: &Target) -> ResolutionResult {
        let candidates = self.candidates(&target.authority).await;
        let traversal = Traversal::new(self.sitemaps.limits());

        let resolved: Vec<_> = stream::iter(candidates)
            .map(|candidate| {
                let traversal = &traversal;
                async move {
                    let result = self.sitemaps.resolve_with(&candidate, traversal).await;
                    (candidate, result)
                }
            })
            .buffered(self.config.limits.max_concurrency.max(1))
            .collect()
            .await;

        let mut urls = Vec::new();
        let mut sitemap_urls = Vec::new();
        for (candidate, result) in resolved {
            match result {
                Ok(entries) if !entries.is_empty() => {
                    urls.extend(entries);
                    sitemap_urls.push(candidate);
                }
                Ok(_) => tracing::debug!(sitemap = %candidate, "sitemap yielded no entries"),
                Err(e) => tracing::debug!(sitemap = %candidate, "dropping sitemap: {}", e),
            }
        }

        tracing::debug!(
            authority = %target.authority,
            urls = urls.len(),
            sitemaps = sitemap_urls.len(),
            documents = traversal.fetched(),
            "resolution finished"
        );

        ResolutionResult::from_parts(urls, sitemap_urls)
    }
}
