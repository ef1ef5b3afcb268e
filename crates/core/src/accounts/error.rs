//! Chart of accounts errors.

use petledger_shared::types::AccountId;
use thiserror::Error;

use super::types::{AccountCategory, AccountType};

/// Errors raised by the account registry and account maintenance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// No live account with this ID.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// No live account with this code.
    #[error("Account not found for code: {0}")]
    NotFoundByCode(String),

    /// Header accounts cannot carry journal lines.
    #[error("Account {0} is a header account and cannot be posted to")]
    Header(AccountId),

    /// Inactive or deleted accounts cannot be posted to.
    #[error("Account {0} is inactive")]
    Inactive(AccountId),

    /// Another account already uses this code.
    #[error("Account code already exists: {0}")]
    DuplicateCode(String),

    /// Code is empty or malformed.
    #[error("Invalid account code: {0:?}")]
    InvalidCode(String),

    /// Name is empty.
    #[error("Account name is required")]
    NameRequired,

    /// Referenced parent does not exist.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Parent exists but is not a header.
    #[error("Parent account {0} is not a header account")]
    ParentNotHeader(AccountId),

    /// Parent header holds a different account type than the child.
    #[error("Parent account {parent_id} is not a {account_type} account")]
    ParentTypeMismatch {
        /// Rejected parent.
        parent_id: AccountId,
        /// Type of the account being placed.
        account_type: AccountType,
    },

    /// Category belongs to a different account type.
    #[error("Category {category} does not belong to account type {account_type}")]
    CategoryMismatch {
        /// Requested category.
        category: AccountCategory,
        /// Requested account type.
        account_type: AccountType,
    },

    /// The parent chain loops back on itself.
    #[error("Account hierarchy contains a cycle at account {0}")]
    CyclicHierarchy(AccountId),

    /// Header still has live children.
    #[error("Account {0} still has active child accounts")]
    HasChildren(AccountId),

    /// Account already carries journal lines.
    #[error("Account {0} already has journal lines")]
    HasPostings(AccountId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::NotFoundByCode(_) => "ACCOUNT_NOT_FOUND",
            Self::Header(_) => "ACCOUNT_IS_HEADER",
            Self::Inactive(_) => "ACCOUNT_INACTIVE",
            Self::DuplicateCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::InvalidCode(_) => "INVALID_ACCOUNT_CODE",
            Self::NameRequired => "ACCOUNT_NAME_REQUIRED",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::ParentNotHeader(_) => "PARENT_NOT_HEADER",
            Self::ParentTypeMismatch { .. } => "PARENT_TYPE_MISMATCH",
            Self::CategoryMismatch { .. } => "CATEGORY_MISMATCH",
            Self::CyclicHierarchy(_) => "CYCLIC_HIERARCHY",
            Self::HasChildren(_) => "ACCOUNT_HAS_CHILDREN",
            Self::HasPostings(_) => "ACCOUNT_HAS_POSTINGS",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::Header(_)
            | Self::Inactive(_)
            | Self::InvalidCode(_)
            | Self::NameRequired
            | Self::ParentNotFound(_)
            | Self::ParentNotHeader(_)
            | Self::ParentTypeMismatch { .. }
            | Self::CategoryMismatch { .. }
            | Self::CyclicHierarchy(_) => 400,

            // 404 Not Found
            Self::NotFound(_) | Self::NotFoundByCode(_) => 404,

            // 409 Conflict - state of the chart forbids the change
            Self::DuplicateCode(_) | Self::HasChildren(_) | Self::HasPostings(_) => 409,

            // 500 Internal Server Error
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let id = AccountId::new();
        assert_eq!(AccountError::NotFound(id).error_code(), "ACCOUNT_NOT_FOUND");
        assert_eq!(AccountError::Header(id).error_code(), "ACCOUNT_IS_HEADER");
        assert_eq!(AccountError::Inactive(id).error_code(), "ACCOUNT_INACTIVE");
    }

    #[test]
    fn test_http_status_codes() {
        let id = AccountId::new();
        assert_eq!(AccountError::NotFound(id).http_status_code(), 404);
        assert_eq!(AccountError::NotFoundByCode("9-999".into()).http_status_code(), 404);
        assert_eq!(AccountError::Header(id).http_status_code(), 400);
        assert_eq!(AccountError::DuplicateCode("1-100".into()).http_status_code(), 409);
        let mismatch = AccountError::ParentTypeMismatch {
            parent_id: id,
            account_type: AccountType::Revenue,
        };
        assert_eq!(mismatch.http_status_code(), 400);
        assert_eq!(mismatch.error_code(), "PARENT_TYPE_MISMATCH");
    }
}
