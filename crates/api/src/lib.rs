//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - The acting-principal extractor
//! - Domain error to JSON response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use petledger_core::cache::BalanceCache;
use petledger_db::{AccountRepository, AgingRepository, JournalRepository, LedgerRepository};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Derived balances shared by the journal and ledger repositories.
    pub balance_cache: BalanceCache,
}

impl AppState {
    /// Creates the application state.
    #[must_use]
    pub fn new(db: DatabaseConnection, balance_cache: BalanceCache) -> Self {
        Self {
            db: Arc::new(db),
            balance_cache,
        }
    }

    pub(crate) fn accounts(&self) -> AccountRepository {
        AccountRepository::new((*self.db).clone())
    }

    pub(crate) fn journal(&self) -> JournalRepository {
        JournalRepository::new((*self.db).clone(), self.balance_cache.clone())
    }

    pub(crate) fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new((*self.db).clone(), self.balance_cache.clone())
    }

    pub(crate) fn aging(&self) -> AgingRepository {
        AgingRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
