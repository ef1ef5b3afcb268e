//! Journal entry errors.

use petledger_shared::types::{JournalEntryId, JournalLineId, Money};
use thiserror::Error;

use crate::accounts::AccountError;

/// Errors raised by the journal entry lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    // ========== Validation Errors ==========
    /// Entry has no lines.
    #[error("Journal entry must have at least one line")]
    NoLines,

    /// Description is empty.
    #[error("Journal entry description is required")]
    DescriptionRequired,

    /// A line amount is negative.
    #[error("Line {line_no}: amounts cannot be negative")]
    NegativeAmount {
        /// Offending line number.
        line_no: u32,
    },

    /// A line amount exceeds the per-line cap.
    #[error("Line {line_no}: amount exceeds the per-line maximum")]
    AmountTooLarge {
        /// Offending line number.
        line_no: u32,
    },

    /// The entry has more lines than allowed.
    #[error("Journal entry cannot have more than {max} lines")]
    TooManyLines {
        /// Line limit.
        max: usize,
    },

    /// A line sets both debit and credit.
    #[error("Line {line_no}: specify either debit or credit, not both")]
    BothSides {
        /// Offending line number.
        line_no: u32,
    },

    /// A line sets neither debit nor credit.
    #[error("Line {line_no}: debit or credit must be non-zero")]
    ZeroAmount {
        /// Offending line number.
        line_no: u32,
    },

    /// A line references an account that cannot be posted to.
    #[error("Line {line_no}: {source}")]
    Account {
        /// Offending line number.
        line_no: u32,
        /// Underlying account error.
        source: AccountError,
    },

    /// Debits and credits differ.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debits.
        debit: Money,
        /// Total credits.
        credit: Money,
    },

    /// Totals exceed the representable range.
    #[error("Journal entry totals overflow")]
    AmountOverflow,

    /// Void reason is empty.
    #[error("A reason is required to void a journal entry")]
    VoidReasonRequired,

    // ========== State Errors ==========
    /// Entry is already posted.
    #[error("Journal entry {0} is already posted")]
    AlreadyPosted(JournalEntryId),

    /// Entry has been voided.
    #[error("Journal entry {0} is void")]
    EntryVoided(JournalEntryId),

    /// Only posted entries can be voided.
    #[error("Journal entry {0} is not posted")]
    NotPosted(JournalEntryId),

    /// Only drafts can be edited or deleted.
    #[error("Journal entry {0} is not a draft")]
    EntryNotDraft(JournalEntryId),

    // ========== Lookup Errors ==========
    /// Entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    /// Line not found on the entry.
    #[error("Journal line not found: {0}")]
    LineNotFound(JournalLineId),

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl JournalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoLines => "NO_LINES",
            Self::DescriptionRequired => "DESCRIPTION_REQUIRED",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::AmountTooLarge { .. } => "AMOUNT_TOO_LARGE",
            Self::TooManyLines { .. } => "TOO_MANY_LINES",
            Self::BothSides { .. } => "INVALID_LINE_SIDES",
            Self::ZeroAmount { .. } => "ZERO_AMOUNT",
            Self::Account { source, .. } => source.error_code(),
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::VoidReasonRequired => "VOID_REASON_REQUIRED",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::EntryVoided(_) => "ENTRY_VOIDED",
            Self::NotPosted(_) => "NOT_POSTED",
            Self::EntryNotDraft(_) => "ENTRY_NOT_DRAFT",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::LineNotFound(_) => "LINE_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::NoLines
            | Self::DescriptionRequired
            | Self::NegativeAmount { .. }
            | Self::AmountTooLarge { .. }
            | Self::TooManyLines { .. }
            | Self::BothSides { .. }
            | Self::ZeroAmount { .. }
            | Self::Account { .. }
            | Self::Unbalanced { .. }
            | Self::AmountOverflow
            | Self::VoidReasonRequired => 400,

            // 404 Not Found
            Self::EntryNotFound(_) | Self::LineNotFound(_) => 404,

            // 409 Conflict - lifecycle state errors
            Self::AlreadyPosted(_)
            | Self::EntryVoided(_)
            | Self::NotPosted(_)
            | Self::EntryNotDraft(_) => 409,

            // 500 Internal Server Error
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petledger_shared::types::AccountId;

    #[test]
    fn test_error_codes() {
        assert_eq!(JournalError::NoLines.error_code(), "NO_LINES");
        assert_eq!(
            JournalError::Unbalanced {
                debit: Money::from_minor(100),
                credit: Money::from_minor(50),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        let id = AccountId::new();
        assert_eq!(
            JournalError::Account {
                line_no: 1,
                source: AccountError::Header(id),
            }
            .error_code(),
            "ACCOUNT_IS_HEADER"
        );
    }

    #[test]
    fn test_http_status_codes() {
        let id = JournalEntryId::new();
        assert_eq!(JournalError::NoLines.http_status_code(), 400);
        assert_eq!(JournalError::AmountTooLarge { line_no: 2 }.http_status_code(), 400);
        assert_eq!(JournalError::AmountTooLarge { line_no: 2 }.error_code(), "AMOUNT_TOO_LARGE");
        assert_eq!(JournalError::TooManyLines { max: 500 }.http_status_code(), 400);
        assert_eq!(JournalError::AlreadyPosted(id).http_status_code(), 409);
        assert_eq!(JournalError::NotPosted(id).http_status_code(), 409);
        assert_eq!(JournalError::EntryNotFound(id).http_status_code(), 404);
        assert_eq!(JournalError::Database("down".into()).http_status_code(), 500);
    }

    #[test]
    fn test_unbalanced_message() {
        let err = JournalError::Unbalanced {
            debit: Money::from_minor(100),
            credit: Money::from_minor(50),
        };
        assert_eq!(err.to_string(), "Journal entry is not balanced. Debit: 100, Credit: 50");
    }
}
