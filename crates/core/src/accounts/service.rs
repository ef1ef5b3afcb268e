//! Chart of accounts maintenance rules.
//!
//! Pure validation: the repository loads the chart, asks this service for
//! the resulting `Account`, then persists it.

use chrono::{DateTime, Utc};
use petledger_shared::types::{AccountId, UserId, nullable};
use serde::{Deserialize, Serialize};

use super::error::AccountError;
use super::registry::ChartOfAccounts;
use super::types::{Account, AccountCategory, AccountType};
use crate::ledger::balance::NormalBalance;

/// Maximum account code length.
pub const MAX_CODE_LEN: usize = 32;

/// Input for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Top-level classification.
    pub account_type: AccountType,
    /// Sub-classification.
    pub category: AccountCategory,
    /// Overrides the type's default normal balance (contra accounts).
    pub normal_balance: Option<NormalBalance>,
    /// Whether the account only groups children.
    pub is_header: bool,
    /// Parent header.
    pub parent_id: Option<AccountId>,
}

/// Partial update of an account.
///
/// `parent_id: Some(None)` moves the account to the root level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    /// New name.
    pub name: Option<String>,
    /// New parent.
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub parent_id: Option<Option<AccountId>>,
    /// Activate or deactivate.
    pub is_active: Option<bool>,
}

/// Account maintenance service.
pub struct AccountService;

impl AccountService {
    /// Validates a new account against the chart and builds it.
    ///
    /// # Errors
    ///
    /// Returns `AccountError` if the code is malformed or taken, the name is
    /// empty, the category does not belong to the type, or the parent is
    /// missing, not a header, or of another account type.
    pub fn validate_new(
        chart: &ChartOfAccounts,
        id: AccountId,
        input: &NewAccount,
        actor: UserId,
    ) -> Result<Account, AccountError> {
        let code = input.code.trim();
        Self::validate_code(code)?;
        if chart.get_by_code(code).is_ok() {
            return Err(AccountError::DuplicateCode(code.to_string()));
        }

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AccountError::NameRequired);
        }

        if input.category.account_type() != input.account_type {
            return Err(AccountError::CategoryMismatch {
                category: input.category,
                account_type: input.account_type,
            });
        }

        if let Some(parent_id) = input.parent_id {
            Self::validate_parent(chart, parent_id, input.account_type)?;
        }

        Ok(Account {
            id,
            code: code.to_string(),
            name: name.to_string(),
            account_type: input.account_type,
            category: input.category,
            normal_balance: input
                .normal_balance
                .unwrap_or_else(|| input.account_type.default_normal_balance()),
            is_header: input.is_header,
            parent_id: input.parent_id,
            is_active: true,
            deleted_at: None,
            created_by: Some(actor),
            updated_by: Some(actor),
        })
    }

    /// Applies an update and returns the changed account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError` if the account is unknown or deleted, the new
    /// name is empty, or the re-parent is invalid.
    pub fn apply_update(
        chart: &ChartOfAccounts,
        id: AccountId,
        update: &AccountUpdate,
        actor: UserId,
    ) -> Result<Account, AccountError> {
        let mut account = chart.get(id)?.clone();
        if account.is_deleted() {
            return Err(AccountError::NotFound(id));
        }

        if let Some(name) = &update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AccountError::NameRequired);
            }
            account.name = name.to_string();
        }

        if let Some(parent_id) = update.parent_id {
            Self::validate_reparent(chart, id, parent_id)?;
            account.parent_id = parent_id;
        }

        if let Some(is_active) = update.is_active {
            account.is_active = is_active;
        }

        account.updated_by = Some(actor);
        Ok(account)
    }

    /// Checks that `id` may move under `new_parent`.
    ///
    /// # Errors
    ///
    /// Returns `ParentNotFound`, `ParentNotHeader`, `ParentTypeMismatch` or
    /// `CyclicHierarchy`.
    pub fn validate_reparent(
        chart: &ChartOfAccounts,
        id: AccountId,
        new_parent: Option<AccountId>,
    ) -> Result<(), AccountError> {
        let account_type = chart.get(id)?.account_type;
        let Some(parent_id) = new_parent else {
            return Ok(());
        };
        Self::validate_parent(chart, parent_id, account_type)?;
        if chart.would_create_cycle(id, parent_id) {
            return Err(AccountError::CyclicHierarchy(id));
        }
        Ok(())
    }

    /// Soft-deletes an account, returning the updated record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown or already-deleted accounts and
    /// `HasChildren` for headers that still have live children.
    pub fn soft_delete(
        chart: &ChartOfAccounts,
        id: AccountId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Account, AccountError> {
        Self::validate_soft_delete(chart, id)?;
        let mut account = chart.get(id)?.clone();
        account.deleted_at = Some(now);
        account.is_active = false;
        account.updated_by = Some(actor);
        Ok(account)
    }

    /// Checks that an account may be soft-deleted.
    ///
    /// # Errors
    ///
    /// See [`AccountService::soft_delete`].
    pub fn validate_soft_delete(
        chart: &ChartOfAccounts,
        id: AccountId,
    ) -> Result<(), AccountError> {
        let account = chart.get(id)?;
        if account.is_deleted() {
            return Err(AccountError::NotFound(id));
        }
        if chart.has_live_children(id) {
            return Err(AccountError::HasChildren(id));
        }
        Ok(())
    }

    fn validate_code(code: &str) -> Result<(), AccountError> {
        let well_formed = !code.is_empty()
            && code.len() <= MAX_CODE_LEN
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.'));
        if well_formed {
            Ok(())
        } else {
            Err(AccountError::InvalidCode(code.to_string()))
        }
    }

    fn validate_parent(
        chart: &ChartOfAccounts,
        parent_id: AccountId,
        account_type: AccountType,
    ) -> Result<(), AccountError> {
        let parent = chart
            .get(parent_id)
            .map_err(|_| AccountError::ParentNotFound(parent_id))?;
        if parent.is_deleted() {
            return Err(AccountError::ParentNotFound(parent_id));
        }
        if !parent.is_header {
            return Err(AccountError::ParentNotHeader(parent_id));
        }
        if parent.account_type != account_type {
            return Err(AccountError::ParentTypeMismatch {
                parent_id,
                account_type,
            });
        }
        Ok(())
    }
}
