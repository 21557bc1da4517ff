//! sitescan server entry point.
//!
//! Serves `get_sitemap` either as a JSON API over HTTP or as MCP tools on
//! stdio, depending on the configured transport. Logging goes to stderr to
//! avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use sitescan_core::{AppConfig, Transport};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod http;
mod state;
mod tools;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let state = AppState::new(config)?;
    let sweeper = state.cache.spawn_sweeper(state.config.cache_sweep_interval());

    let outcome = match state.config.transport {
        Transport::Http => http::serve(state.clone()).await,
        Transport::Stdio => serve_stdio(state.clone()).await,
    };

    sweeper.shutdown().await;
    tracing::info!("sitescan stopped");

    outcome
}

async fn serve_stdio(state: AppState) -> Result<()> {
    tracing::info!("Starting sitescan server on stdio transport");

    let handler = handler::SitescanServer::new(state);
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    Ok(())
}
