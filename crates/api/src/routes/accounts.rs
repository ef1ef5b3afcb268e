//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use petledger_core::accounts::{Account, AccountUpdate, NewAccount};
use petledger_shared::types::AccountId;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::Actor};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/by-code/{code}", get(get_account_by_code))
        .route(
            "/accounts/{account_id}",
            get(get_account).patch(update_account).delete(delete_account),
        )
}

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// Lists this header's children; roots when absent.
    pub parent: Option<Uuid>,
}

/// GET `/accounts?parent=` - Live children of a header, or the roots.
async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Value>, ApiError> {
    let parent = query.parent.map(AccountId::from_uuid);
    let accounts = state.accounts().list_children(parent).await?;
    debug!(parent = ?parent, count = accounts.len(), "Listed accounts");
    Ok(Json(json!({ "accounts": accounts })))
}

/// GET `/accounts/by-code/{code}` - Live account by code.
async fn get_account_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Account>, ApiError> {
    Ok(Json(state.accounts().get_by_code(&code).await?))
}

/// GET `/accounts/{account_id}` - Account by ID, deleted ones included.
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Account>, ApiError> {
    let account = state
        .accounts()
        .find_by_id(AccountId::from_uuid(account_id))
        .await?;
    Ok(Json(account))
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<NewAccount>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let account = state.accounts().create(payload, actor.user_id()).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// PATCH `/accounts/{account_id}` - Rename, re-parent or (de)activate.
async fn update_account(
    State(state): State<AppState>,
    actor: Actor,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<Account>, ApiError> {
    let account = state
        .accounts()
        .update(AccountId::from_uuid(account_id), payload, actor.user_id())
        .await?;
    Ok(Json(account))
}

/// DELETE `/accounts/{account_id}` - Soft-delete an account.
async fn delete_account(
    State(state): State<AppState>,
    actor: Actor,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Account>, ApiError> {
    let account = state
        .accounts()
        .soft_delete(AccountId::from_uuid(account_id), actor.user_id())
        .await?;
    Ok(Json(account))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{json, send};

    const NEW_ACCOUNT: &str = r#"{
        "code": "1-100",
        "name": "Cash on Hand",
        "account_type": "asset",
        "category": "current_asset",
        "normal_balance": null,
        "is_header": false,
        "parent_id": null
    }"#;

    #[tokio::test]
    async fn test_create_requires_actor() {
        let (status, body) = send(json("POST", "/api/v1/accounts", None, NEW_ACCOUNT)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_delete_rejects_malformed_actor() {
        let (status, body) = send(json(
            "DELETE",
            "/api/v1/accounts/0190f3c5-8a7e-7c1b-9f00-000000000001",
            Some("admin"),
            "",
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }
}
