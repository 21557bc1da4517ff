//! Recursive sitemap-index expansion.
//!
//! A sitemap URL resolves to the leaf entries reachable from it. Index
//! children are resolved concurrently but merged in document order, so a
//! given remote tree always yields the same sequence. A child that fails
//! contributes nothing; only the URL being resolved can fail the call.
//!
//! Reference graphs come from remote documents and may be cyclic, so every
//! traversal is bounded three ways: a URL already on the ancestor path is a
//! cycle, nesting is capped at `max_depth`, and the number of documents
//! fetched per [`Traversal`] is capped at `max_documents`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{self, StreamExt};
use tokio::sync::Semaphore;

use sitescan_core::{AppConfig, Error, SitemapEntry};

use super::parse::{SitemapDocument, parse_document};
use crate::fetch::Fetch;
use crate::fetch::url::resolve_location;

/// Default timeout for a single sitemap document.
pub const SITEMAP_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounds applied to one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveLimits {
    /// Deepest index nesting below the starting sitemap.
    pub max_depth: usize,
    /// Sitemap documents fetched per traversal.
    pub max_documents: usize,
    /// Sitemap fetches in flight per traversal.
    pub max_concurrency: usize,
}

impl Default for ResolveLimits {
    fn default() -> Self {
        Self { max_depth: 5, max_documents: 1_000, max_concurrency: 4 }
    }
}

impl From<&AppConfig> for ResolveLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_documents: config.max_documents,
            max_concurrency: config.max_concurrency,
        }
    }
}

/// Shared budget for one top-level resolution.
///
/// One traversal may span several starting sitemaps; they share the fetch
/// permits and the document budget.
#[derive(Debug)]
pub struct Traversal {
    permits: Semaphore,
    fetched: AtomicUsize,
    max_documents: usize,
}

impl Traversal {
    pub fn new(limits: &ResolveLimits) -> Self {
        Self {
            permits: Semaphore::new(limits.max_concurrency.max(1)),
            fetched: AtomicUsize::new(0),
            max_documents: limits.max_documents,
        }
    }

    /// Documents fetched (or attempted) so far.
    pub fn fetched(&self) -> usize {
        self.fetched.load(Ordering::Relaxed)
    }

    fn charge(&self, url: &str) -> Result<(), Error> {
        let used = self.fetched.fetch_add(1, Ordering::Relaxed);
        if used >= self.max_documents {
            return Err(Error::FetchBudgetExceeded(format!(
                "{}: more than {} sitemap documents",
                url, self.max_documents
            )));
        }
        Ok(())
    }
}

/// Resolves sitemap URLs into leaf entries.
#[derive(Clone)]
pub struct SitemapResolver {
    fetcher: Arc<dyn Fetch>,
    timeout: Duration,
    limits: ResolveLimits,
}

impl SitemapResolver {
    pub fn new(fetcher: Arc<dyn Fetch>, timeout: Duration, limits: ResolveLimits) -> Self {
        Self { fetcher, timeout, limits }
    }

    pub fn limits(&self) -> &ResolveLimits {
        &self.limits
    }

    /// Resolve `url` with a fresh traversal budget.
    pub async fn resolve(&self, url: &str) -> Result<Vec<SitemapEntry>, Error> {
        let traversal = Traversal::new(&self.limits);
        self.resolve_with(url, &traversal).await
    }

    /// Resolve `url`, charging fetches to `traversal`.
    ///
    /// # Errors
    ///
    /// Fails when the document at `url` cannot be fetched or parsed, is an
    /// index with no entries, or trips a traversal bound. Failures of index
    /// children are logged and skipped.
    pub async fn resolve_with(&self, url: &str, traversal: &Traversal) -> Result<Vec<SitemapEntry>, Error> {
        self.resolve_at(url.to_string(), 0, Vec::new(), traversal).await
    }

    fn resolve_at<'a>(
        &'a self, url: String, depth: usize, mut ancestors: Vec<String>, traversal: &'a Traversal,
    ) -> BoxFuture<'a, Result<Vec<SitemapEntry>, Error>> {
        async move {
            if ancestors.contains(&url) {
                return Err(Error::CycleDetected(format!("{} references itself through {:?}", url, ancestors)));
            }
            if depth > self.limits.max_depth {
                return Err(Error::DepthExceeded(format!(
                    "{} is nested {} levels deep (max {})",
                    url, depth, self.limits.max_depth
                )));
            }
            traversal.charge(&url)?;

            let response = {
                let _permit = traversal
                    .permits
                    .acquire()
                    .await
                    .map_err(|e| Error::HttpError(format!("{}: {}", url, e)))?;
                self.fetcher.fetch(&url, self.timeout).await?
            };

            let document =
                parse_document(&response.bytes, &url).map_err(|e| Error::ParseFailed(format!("{}: {}", url, e)))?;

            match document {
                SitemapDocument::UrlSet(entries) => {
                    tracing::debug!(sitemap = %url, entries = entries.len(), "parsed leaf sitemap");
                    Ok(entries)
                }
                SitemapDocument::Index(children) if children.is_empty() => {
                    Err(Error::ParseFailed(format!("{}: sitemap index has no entries", url)))
                }
                SitemapDocument::Index(children) => {
                    tracing::debug!(sitemap = %url, children = children.len(), depth, "expanding sitemap index");

                    let base = url::Url::parse(&url).ok();
                    ancestors.push(url.clone());

                    let resolved: Vec<(String, Result<Vec<SitemapEntry>, Error>)> = stream::iter(children)
                        .map(|child| {
                            let loc = resolve_location(base.as_ref(), &child.loc);
                            let ancestors = ancestors.clone();
                            async move {
                                let result = self.resolve_at(loc.clone(), depth + 1, ancestors, traversal).await;
                                (loc, result)
                            }
                        })
                        .buffered(self.limits.max_concurrency.max(1))
                        .collect()
                        .await;

                    let mut entries = Vec::new();
                    for (child, result) in resolved {
                        match result {
                            Ok(found) => entries.extend(found),
                            Err(e) => tracing::debug!(index = %url, child = %child, "skipping child sitemap: {}", e),
                        }
                    }

                    Ok(entries)
                }
            }
        }
        .boxed()
    }
}
