//! shellcache server entry point.
//!
//! Boots the offline cache manager and serves it as an MCP server on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shellcache_client::{FetchConfig, HttpNetwork};
use shellcache_core::{AppConfig, CacheDb};
use shellcache_worker::OfflineCacheManager;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        origin = %config.origin,
        db = %config.db_path.display(),
        "Starting shellcache server on stdio transport"
    );

    let storage = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache database {}", config.db_path.display()))?;
    let network = HttpNetwork::new(&FetchConfig::from(&config))?;
    let manager = Arc::new(OfflineCacheManager::new(&config, Arc::new(storage), Arc::new(network))?);

    if config.install_on_start {
        match manager.start().await {
            Ok(state) => tracing::info!(%state, "worker started"),
            Err(e) => tracing::error!(error = %e, state = %manager.state(), "worker failed to start"),
        }
    }

    let handler = handler::ShellcacheServer::new(manager);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
