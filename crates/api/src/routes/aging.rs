//! Payable and receivable aging routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use petledger_core::aging::{AgingReport, CounterpartyOutstanding, DocumentKind};
use petledger_shared::types::CounterpartyId;
use serde::Deserialize;
use uuid::Uuid;

use super::params::AsOfQuery;
use crate::{AppState, error::ApiError};

/// Creates the aging routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/aging/payables", get(payables_report))
        .route("/aging/receivables", get(receivables_report))
        .route("/aging/payables/{counterparty_id}", get(supplier_outstanding))
        .route("/aging/receivables/{counterparty_id}", get(customer_outstanding))
}

/// Query parameters for a counterparty drill-down.
#[derive(Debug, Default, Deserialize)]
pub struct OutstandingQuery {
    /// Include settlement history, newest first.
    #[serde(default)]
    pub history: bool,
}

async fn report(
    state: &AppState,
    kind: DocumentKind,
    query: &AsOfQuery,
) -> Result<Json<AgingReport>, ApiError> {
    let report = state.aging().report(kind, query.as_of()?, query.branch()).await?;
    Ok(Json(report))
}

async fn outstanding(
    state: &AppState,
    kind: DocumentKind,
    counterparty_id: Uuid,
    query: &OutstandingQuery,
) -> Result<Json<CounterpartyOutstanding>, ApiError> {
    let detail = state
        .aging()
        .counterparty_outstanding(kind, CounterpartyId::from_uuid(counterparty_id), query.history)
        .await?;
    Ok(Json(detail))
}

/// GET `/aging/payables` - Open purchase orders by supplier and bucket.
async fn payables_report(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<AgingReport>, ApiError> {
    report(&state, DocumentKind::Payable, &query).await
}

/// GET `/aging/receivables` - Open sales by customer and bucket.
async fn receivables_report(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<AgingReport>, ApiError> {
    report(&state, DocumentKind::Receivable, &query).await
}

/// GET `/aging/payables/{counterparty_id}` - One supplier's open bills.
async fn supplier_outstanding(
    State(state): State<AppState>,
    Path(counterparty_id): Path<Uuid>,
    Query(query): Query<OutstandingQuery>,
) -> Result<Json<CounterpartyOutstanding>, ApiError> {
    outstanding(&state, DocumentKind::Payable, counterparty_id, &query).await
}

/// GET `/aging/receivables/{counterparty_id}` - One customer's open bills.
async fn customer_outstanding(
    State(state): State<AppState>,
    Path(counterparty_id): Path<Uuid>,
    Query(query): Query<OutstandingQuery>,
) -> Result<Json<CounterpartyOutstanding>, ApiError> {
    outstanding(&state, DocumentKind::Receivable, counterparty_id, &query).await
}
