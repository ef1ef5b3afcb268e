//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod aging;
pub mod health;
pub mod journal;
pub mod ledger;
pub mod params;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(journal::routes())
        .merge(ledger::routes())
        .merge(aging::routes())
}
