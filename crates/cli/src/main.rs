//! sitescan command line: resolve one site's sitemaps and print the JSON.
//!
//! Runs without the cache. Configuration is loaded the same way as the
//! server (`SITESCAN_*` variables, `SITESCAN_CONFIG_FILE`), and flags
//! override it.

use anyhow::{Context, Result};
use clap::Parser;
use sitescan_client::SitemapScanner;
use sitescan_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sitescan-cli",
    version,
    about = "Resolve every sitemap of a website into one list of page URLs",
    long_about = None
)]
struct Cli {
    /// Any URL on the site to scan
    url: String,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Override the sitemap-index nesting ceiling
    #[arg(long)]
    max_depth: Option<usize>,

    /// Give up on the whole resolution after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load().context("failed to load configuration")?;
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    if cli.timeout_ms.is_some() {
        config.resolve_timeout_ms = cli.timeout_ms;
    }
    config.validate().context("invalid option")?;

    let scanner = SitemapScanner::from_config(&config)?;
    let result = scanner.resolve(&cli.url).await?;

    tracing::debug!(urls = result.urls.len(), sitemaps = result.sitemap_urls.len(), "resolved {}", cli.url);

    let json = if cli.compact { serde_json::to_string(&result)? } else { serde_json::to_string_pretty(&result)? };
    println!("{json}");

    Ok(())
}
