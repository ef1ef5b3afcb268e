//! Petledger API Server
//!
//! Main entry point for the ledger and aging service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use petledger_api::{AppState, create_router};
use petledger_core::cache::BalanceCache;
use petledger_db::connect_with;
use petledger_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "petledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let balance_cache = BalanceCache::with_config(config.cache.max_capacity, config.cache.ttl_secs);
    info!(
        max_capacity = config.cache.max_capacity,
        ttl_secs = config.cache.ttl_secs,
        "Balance cache configured"
    );

    let app = create_router(AppState::new(db, balance_cache));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
