//! Ledger query routes.
//!
//! Every response is derived from posted journal lines at request time.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use petledger_core::accounts::AccountType;
use petledger_core::ledger::{AccountLedger, TrialBalance};
use petledger_shared::types::{AccountId, time::to_epoch_millis};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::params::{AsOfQuery, branch_filter, timestamp};
use crate::{AppState, error::ApiError};

/// Creates the ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/account/{account_id}", get(get_account_ledger))
        .route("/ledger/account/{account_id}/balance", get(get_balance))
        .route("/ledger/trial-balance", get(get_trial_balance))
        .route("/ledger/hierarchy", get(get_hierarchy))
}

/// Query parameters for an account ledger.
#[derive(Debug, Deserialize)]
pub struct AccountLedgerQuery {
    /// Inclusive start, epoch milliseconds.
    pub start: Option<i64>,
    /// Inclusive end, epoch milliseconds.
    pub end: Option<i64>,
    /// Restricts lines to one branch.
    pub branch: Option<Uuid>,
}

/// Query parameters for the hierarchy view.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyQuery {
    /// Only trees of this account type.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Inclusive cut-off, epoch milliseconds.
    pub as_of: Option<i64>,
    /// Restricts lines to one branch.
    pub branch: Option<Uuid>,
}

fn parse_account_type(value: Option<&str>) -> Result<Option<AccountType>, ApiError> {
    value
        .map(|s| {
            AccountType::parse(s).ok_or_else(|| {
                ApiError::bad_request(
                    "INVALID_ACCOUNT_TYPE",
                    "Invalid account type. Must be one of: asset, liability, equity, revenue, expense",
                )
            })
        })
        .transpose()
}

/// GET `/ledger/account/{account_id}` - Opening balance, lines with
/// running balance, and closing balance over a date range.
async fn get_account_ledger(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(query): Query<AccountLedgerQuery>,
) -> Result<Json<AccountLedger>, ApiError> {
    let start = timestamp("start", query.start)?;
    let end = timestamp("end", query.end)?;
    let ledger = state
        .ledger()
        .account_ledger(
            AccountId::from_uuid(account_id),
            start,
            end,
            branch_filter(query.branch),
        )
        .await?;
    Ok(Json(ledger))
}

/// GET `/ledger/account/{account_id}/balance` - Balance as of a date.
async fn get_balance(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<Value>, ApiError> {
    let as_of = query.as_of()?;
    let branch = query.branch();
    let result = state
        .ledger()
        .balance(AccountId::from_uuid(account_id), as_of, branch)
        .await?;

    Ok(Json(json!({
        "account_id": account_id,
        "as_of": to_epoch_millis(as_of),
        "branch_id": branch.branch_id(),
        "balance": result.balance,
        "cached": result.cached,
    })))
}

/// GET `/ledger/trial-balance` - Every account with a balance, in code order.
async fn get_trial_balance(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<TrialBalance>, ApiError> {
    let trial_balance = state
        .ledger()
        .trial_balance(query.as_of()?, query.branch())
        .await?;
    Ok(Json(trial_balance))
}

/// GET `/ledger/hierarchy` - Balance trees with header roll-ups.
async fn get_hierarchy(
    State(state): State<AppState>,
    Query(query): Query<HierarchyQuery>,
) -> Result<Json<Value>, ApiError> {
    let account_type = parse_account_type(query.account_type.as_deref())?;
    let as_of = timestamp("asOf", query.as_of)?.unwrap_or_else(chrono::Utc::now);
    let trees = state
        .ledger()
        .hierarchy(account_type, as_of, branch_filter(query.branch))
        .await?;

    Ok(Json(json!({
        "as_of": to_epoch_millis(as_of),
        "accounts": trees,
    })))
}
