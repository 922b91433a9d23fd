//! SURGE — Momentum Market Scanner and Quote Service
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the provider, cache, and scan engine together, and serves the
//! HTTP API with graceful shutdown.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use surge::cache::TtlCache;
use surge::config;
use surge::engine::scanner::ScanEngine;
use surge::provider::client::FallbackClient;
use surge::provider::yahoo::YahooProvider;
use surge::provider::MarketData;
use surge::server;
use surge::server::routes::ApiState;

const BANNER: &str = r#"
 ____  _   _ ____   ____ _____
/ ___|| | | |  _ \ / ___| ____|
\___ \| | | | |_) | |  _|  _|
 ___) | |_| |  _ <| |_| | |___
|____/ \___/|_| \_\\____|_____|

  Scan, Rank, Surface Momentum
  v0.1.0 — Market Scan Service
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML (defaults when the file is absent)
    let cfg = config::AppConfig::load_or_default("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        port = cfg.server.port,
        primary = %cfg.provider.primary_base,
        fallback = %cfg.provider.fallback_base,
        batch_size = cfg.scan.batch_size,
        max_pool = cfg.scan.max_pool_size,
        "SURGE starting up"
    );

    // -- Wire components ---------------------------------------------------

    let client = FallbackClient::new(&cfg.provider)?;
    let provider: Arc<dyn MarketData> = Arc::new(YahooProvider::new(client));

    // Process-wide cache, injected everywhere it is consulted
    let cache = Arc::new(TtlCache::new());

    let engine = ScanEngine::new(Arc::clone(&provider), Arc::clone(&cache), &cfg.scan);

    let state = Arc::new(ApiState {
        provider,
        cache,
        engine,
        quote_ttl: Duration::from_secs(cfg.scan.quote_ttl_secs),
        history_ttl: Duration::from_secs(cfg.scan.history_ttl_secs),
    });

    // -- Serve ---------------------------------------------------------------

    server::serve(state, cfg.server.port).await?;

    info!("SURGE shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("surge=info"));

    let json_logging = std::env::var("SURGE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
