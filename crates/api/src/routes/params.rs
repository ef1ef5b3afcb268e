//! Query parameter parsing shared by the read endpoints.
//!
//! Dates travel as Unix-epoch milliseconds; a missing `asOf` means now.

use chrono::{DateTime, Utc};
use petledger_core::ledger::BranchFilter;
use petledger_shared::types::{BranchId, time::from_epoch_millis};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `asOf` and `branch` parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsOfQuery {
    /// Inclusive cut-off in epoch milliseconds.
    pub as_of: Option<i64>,
    /// Restricts the query to one branch.
    pub branch: Option<Uuid>,
}

impl AsOfQuery {
    /// The cut-off, defaulting to now.
    pub fn as_of(&self) -> Result<DateTime<Utc>, ApiError> {
        Ok(timestamp("asOf", self.as_of)?.unwrap_or_else(Utc::now))
    }

    /// The branch filter.
    pub fn branch(&self) -> BranchFilter {
        branch_filter(self.branch)
    }
}

/// Converts an optional epoch-millisecond parameter.
pub fn timestamp(name: &str, millis: Option<i64>) -> Result<Option<DateTime<Utc>>, ApiError> {
    millis
        .map(|ms| {
            from_epoch_millis(ms).ok_or_else(|| {
                ApiError::bad_request("INVALID_TIMESTAMP", format!("{name} is out of range: {ms}"))
            })
        })
        .transpose()
}

/// Maps an optional `branch` parameter to a filter.
pub fn branch_filter(branch: Option<Uuid>) -> BranchFilter {
    branch.map(BranchId::from_uuid).into()
}
