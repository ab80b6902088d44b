// =============================================================================
// markets-signal — Main Entry Point
// =============================================================================
//
// Loads configuration, builds the shared state and serves the REST API until
// Ctrl+C. A background task rolls the Binance request-weight window over once
// a minute.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use markets_signal::api;
use markets_signal::api::auth::API_TOKEN_ENV;
use markets_signal::app_state::AppState;
use markets_signal::runtime_config::{RuntimeConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "markets-signal starting up");

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides();

    let api_token = std::env::var(API_TOKEN_ENV).ok();
    if api_token.as_deref().map_or(true, str::is_empty) {
        warn!("{API_TOKEN_ENV} is not set, API is open to all callers");
    }

    // ── 2. Build shared state ────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(
        AppState::new(config, api_token).context("failed to initialise application state")?,
    );

    // ── 3. Request-weight window reset (every minute) ────────────────────
    let weight = state.market_data.binance_weight();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
        // The first tick fires immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            weight.reset_1m_weight();
        }
    });

    // ── 4. Start the API server ──────────────────────────────────────────
    let app = api::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!(
        analyses_served = state.analyses_served(),
        "markets-signal shut down complete"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, stopping gracefully");
}
