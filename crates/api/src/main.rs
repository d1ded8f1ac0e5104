//! Traffic Violation Service - Main Entry Point
//!
//! Usage: `traffic-law [CONFIG_FILE]` (defaults to `traffic.toml` when present).

use anyhow::Context;
use api::{config::ServiceConfig, init_logging, run_server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "traffic".to_string());
    let config = ServiceConfig::load(Some(&path))
        .with_context(|| format!("failed to load configuration from {path}"))?;

    init_logging(&config.logging);

    info!("=== Traffic Violation Service v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(config).await
}
