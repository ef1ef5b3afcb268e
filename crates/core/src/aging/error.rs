//! Aging report errors.

use petledger_shared::types::CounterpartyId;
use thiserror::Error;

/// Errors raised by aging queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgingError {
    /// No supplier/customer with this ID for the requested side.
    #[error("Counterparty not found: {0}")]
    CounterpartyNotFound(CounterpartyId),

    /// Outstanding amounts summed past the `Money` range.
    #[error("Outstanding totals overflow for counterparty {0}")]
    AmountOverflow(CounterpartyId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AgingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::CounterpartyNotFound(_) => "COUNTERPARTY_NOT_FOUND",
            Self::AmountOverflow(_) => "AMOUNT_OVERFLOW",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::CounterpartyNotFound(_) => 404,
            Self::AmountOverflow(_) | Self::Database(_) => 500,
        }
    }
}
