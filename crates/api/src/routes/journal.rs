//! Journal entry routes.
//!
//! Collaborators (sales, purchasing, grooming) create entries here; the
//! ledger endpoints only ever read what was posted through these.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use petledger_core::journal::{
    JournalEntry, JournalHeaderUpdate, JournalStatus, LineInput, NewJournalEntry,
};
use petledger_db::JournalFilter;
use petledger_shared::types::{BranchId, JournalEntryId, JournalLineId, PageRequest, PageResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::params::timestamp;
use crate::{AppState, error::ApiError, middleware::Actor};

/// Creates the journal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal", get(list_entries).post(create_entry))
        .route(
            "/journal/{entry_id}",
            get(get_entry).patch(update_entry).delete(delete_entry),
        )
        .route("/journal/{entry_id}/lines", post(add_line))
        .route("/journal/{entry_id}/lines/{line_id}", delete(remove_line))
        .route("/journal/{entry_id}/post", post(post_entry))
        .route("/journal/{entry_id}/void", post(void_entry))
}

/// Request body for creating an entry.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    /// Accounting date in epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    /// Entry description.
    #[validate(length(max = 500))]
    pub description: String,
    /// Default branch for every line.
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    /// Lines.
    #[validate(length(max = 500))]
    pub lines: Vec<LineInput>,
    /// Post immediately instead of saving a draft.
    #[serde(default)]
    pub post: bool,
}

/// Request body for voiding an entry.
#[derive(Debug, Deserialize, Validate)]
pub struct VoidRequest {
    /// Why the entry is voided; required.
    #[serde(default)]
    #[validate(length(max = 500))]
    pub reason: String,
}

/// Query parameters for listing entries.
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// `draft`, `posted` or `void`.
    pub status: Option<String>,
    /// Dated on or after, epoch milliseconds.
    pub from: Option<i64>,
    /// Dated on or before, epoch milliseconds.
    pub to: Option<i64>,
    /// Header branch.
    pub branch: Option<Uuid>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Entries per page.
    pub per_page: Option<u32>,
}

impl ListEntriesQuery {
    fn filter(&self) -> Result<JournalFilter, ApiError> {
        let status = self
            .status
            .as_deref()
            .map(|s| {
                JournalStatus::parse(s).ok_or_else(|| {
                    ApiError::bad_request(
                        "INVALID_STATUS",
                        format!("Invalid status '{s}'. Must be one of: draft, posted, void"),
                    )
                })
            })
            .transpose()?;

        Ok(JournalFilter {
            status,
            from: timestamp("from", self.from)?,
            to: timestamp("to", self.to)?,
            branch_id: self.branch.map(BranchId::from_uuid),
        })
    }

    fn page(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        )
    }
}

fn validation_error(err: &validator::ValidationErrors) -> ApiError {
    ApiError::bad_request("VALIDATION_ERROR", err.to_string())
}

/// GET `/journal` - Paginated entries, newest first.
async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<PageResponse<JournalEntry>>, ApiError> {
    let filter = query.filter()?;
    let page = state.journal().list(filter, &query.page()).await?;
    Ok(Json(page))
}

/// POST `/journal` - Create a draft, or a posted entry with `"post": true`.
async fn create_entry(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<JournalEntry>), ApiError> {
    payload.validate().map_err(|e| validation_error(&e))?;

    let input = NewJournalEntry {
        date: payload.date,
        description: payload.description,
        branch_id: payload.branch_id,
        lines: payload.lines,
    };
    let entry = state
        .journal()
        .create(input, payload.post, actor.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET `/journal/{entry_id}` - One entry with its lines.
async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> Result<Json<JournalEntry>, ApiError> {
    let entry = state.journal().get(JournalEntryId::from_uuid(entry_id)).await?;
    Ok(Json(entry))
}

/// PATCH `/journal/{entry_id}` - Edit a draft's header.
async fn update_entry(
    State(state): State<AppState>,
    actor: Actor,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<JournalHeaderUpdate>,
) -> Result<Json<JournalEntry>, ApiError> {
    let entry = state
        .journal()
        .update_header(JournalEntryId::from_uuid(entry_id), payload, actor.user_id())
        .await?;
    Ok(Json(entry))
}

/// DELETE `/journal/{entry_id}` - Delete a draft.
async fn delete_entry(
    State(state): State<AppState>,
    actor: Actor,
    Path(entry_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .journal()
        .delete_draft(JournalEntryId::from_uuid(entry_id), actor.user_id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/journal/{entry_id}/lines` - Append a line to a draft.
async fn add_line(
    State(state): State<AppState>,
    actor: Actor,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<LineInput>,
) -> Result<Json<JournalEntry>, ApiError> {
    let entry = state
        .journal()
        .add_line(JournalEntryId::from_uuid(entry_id), payload, actor.user_id())
        .await?;
    Ok(Json(entry))
}

/// DELETE `/journal/{entry_id}/lines/{line_id}` - Remove a draft line.
async fn remove_line(
    State(state): State<AppState>,
    actor: Actor,
    Path((entry_id, line_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<JournalEntry>, ApiError> {
    let entry = state
        .journal()
        .remove_line(
            JournalEntryId::from_uuid(entry_id),
            JournalLineId::from_uuid(line_id),
            actor.user_id(),
        )
        .await?;
    Ok(Json(entry))
}

/// POST `/journal/{entry_id}/post` - Post a balanced draft.
async fn post_entry(
    State(state): State<AppState>,
    actor: Actor,
    Path(entry_id): Path<Uuid>,
) -> Result<Json<JournalEntry>, ApiError> {
    let entry = state
        .journal()
        .post(JournalEntryId::from_uuid(entry_id), actor.user_id())
        .await?;
    Ok(Json(entry))
}

/// POST `/journal/{entry_id}/void` - Void a posted entry.
async fn void_entry(
    State(state): State<AppState>,
    actor: Actor,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<VoidRequest>,
) -> Result<Json<JournalEntry>, ApiError> {
    payload.validate().map_err(|e| validation_error(&e))?;
    let entry = state
        .journal()
        .void(JournalEntryId::from_uuid(entry_id), &payload.reason, actor.user_id())
        .await?;
    Ok(Json(entry))
}
