//! Ledger query errors.
//!
//! Integrity errors are kept apart from caller mistakes: they mean a write
//! path let an invariant slip and must be logged with full context.

use chrono::{DateTime, Utc};
use petledger_shared::types::{AccountId, Money};
use thiserror::Error;

use crate::accounts::AccountError;

/// A ledger invariant did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// Trial balance columns disagree.
    #[error(
        "Trial balance as of {as_of} does not reconcile. Debit: {total_debit}, Credit: {total_credit}"
    )]
    TrialBalanceMismatch {
        /// Report cut-off.
        as_of: DateTime<Utc>,
        /// Debit column total.
        total_debit: Money,
        /// Credit column total.
        total_credit: Money,
    },

    /// An account's summed lines do not fit in `i64`.
    #[error("Balance of account {account_id} overflows")]
    BalanceOverflow {
        /// Account whose sum overflowed.
        account_id: AccountId,
    },

    /// Trial balance column totals do not fit in `i64`.
    #[error("Trial balance totals as of {as_of} overflow")]
    TotalsOverflow {
        /// Report cut-off.
        as_of: DateTime<Utc>,
    },

    /// The account parent graph contains a cycle.
    #[error("Account hierarchy contains a cycle at account {account_id}")]
    CyclicHierarchy {
        /// An account on the cycle.
        account_id: AccountId,
    },
}

/// Errors raised by ledger queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Account lookup failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Window start is after window end.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Window start.
        start: DateTime<Utc>,
        /// Window end.
        end: DateTime<Utc>,
    },

    /// A ledger invariant did not hold.
    #[error("Ledger integrity violation: {0}")]
    Integrity(#[from] IntegrityError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Account(e) => e.error_code(),
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::Integrity(_) => "LEDGER_INTEGRITY_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Account(e) => e.http_status_code(),
            Self::InvalidDateRange { .. } => 400,
            Self::Integrity(_) | Self::Database(_) => 500,
        }
    }

    /// Returns true if this error points at a bug rather than a bad request.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}
