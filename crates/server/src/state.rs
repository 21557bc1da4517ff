//! Shared server state.

use std::sync::Arc;

use sitescan_client::SitemapScanner;
use sitescan_core::{AppConfig, Error, SitemapCache};

/// Everything a request needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<SitemapScanner>,
    pub cache: Arc<SitemapCache>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state with a network-backed scanner.
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let scanner = SitemapScanner::from_config(&config)?;
        Ok(Self::with_scanner(config, scanner))
    }

    pub fn with_scanner(config: AppConfig, scanner: SitemapScanner) -> Self {
        Self {
            scanner: Arc::new(scanner),
            cache: Arc::new(SitemapCache::new(config.cache_ttl())),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use sitescan_client::{FetchClient, FetchConfig, ScanConfig};

    /// State whose scanner talks to whatever `config` allows, with
    /// fetch settings suitable for a local mock server.
    pub fn state(config: AppConfig) -> AppState {
        let fetcher = FetchClient::new(FetchConfig::default()).unwrap();
        let scanner = SitemapScanner::new(Arc::new(fetcher), ScanConfig::from(&config));
        AppState::with_scanner(config, scanner)
    }
}
