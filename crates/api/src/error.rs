//! Domain error to HTTP response mapping.
//!
//! Every error leaves the API as `{"error": "<CODE>", "message": "<text>"}`
//! with the status the domain error reports for itself.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use petledger_core::accounts::AccountError;
use petledger_core::aging::AgingError;
use petledger_core::journal::JournalError;
use petledger_core::ledger::LedgerError;
use petledger_shared::AppError;
use serde_json::json;
use tracing::error;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error returned by every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error from a status code, error code and message.
    #[must_use]
    pub fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message: message.into(),
        }
    }

    /// A 400 error for a malformed request parameter.
    #[must_use]
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(400, code, message)
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Hides database detail from callers; it is logged instead.
    fn internal(code: &'static str, detail: &str) -> Self {
        error!(code, detail, "Request failed");
        Self::new(500, code, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match &err {
            AppError::Database(detail) | AppError::Internal(detail) => {
                Self::internal(err.error_code(), detail)
            }
            _ => Self::new(err.status_code(), err.error_code(), err.to_string()),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match &err {
            AccountError::Database(detail) => Self::internal(err.error_code(), detail),
            _ => Self::new(err.http_status_code(), err.error_code(), err.to_string()),
        }
    }
}

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        match &err {
            JournalError::Database(detail) => Self::internal(err.error_code(), detail),
            _ => Self::new(err.http_status_code(), err.error_code(), err.to_string()),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::Account(inner) => inner.clone().into(),
            LedgerError::Database(detail) => Self::internal(err.error_code(), detail),
            // Integrity violations are logged with context where detected
            LedgerError::Integrity(_) | LedgerError::InvalidDateRange { .. } => {
                Self::new(err.http_status_code(), err.error_code(), err.to_string())
            }
        }
    }
}

impl From<AgingError> for ApiError {
    fn from(err: AgingError) -> Self {
        match &err {
            AgingError::Database(detail) => Self::internal(err.error_code(), detail),
            // Logged where detected
            AgingError::AmountOverflow(_) | AgingError::CounterpartyNotFound(_) => {
                Self::new(err.http_status_code(), err.error_code(), err.to_string())
            }
        }
    }
}
