//! Ledger read repository.
//!
//! Loads posted journal lines and the chart, then hands them to the core
//! query engine and rollup calculator. Nothing here is stored; every balance
//! is derived per query, with single-account balances served read-through
//! from the shared [`BalanceCache`].

use chrono::{DateTime, Utc};
use petledger_core::accounts::{AccountType, ChartOfAccounts};
use petledger_core::cache::{BalanceCache, BalanceKey};
use petledger_core::ledger::{
    AccountLedger, BranchFilter, LedgerError, LedgerQueryEngine, PostedLine, TrialBalance,
};
use petledger_core::rollup::{BalanceNode, HierarchyRollup};
use petledger_shared::types::{AccountId, Money};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::account::load_chart;
use super::convert::{posted_line, to_db_time};
use crate::entities::{journal_entries, journal_lines, sea_orm_active_enums::JournalStatus};

fn db_error(err: impl std::fmt::Display) -> LedgerError {
    LedgerError::Database(err.to_string())
}

/// A balance together with whether it came from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedBalance {
    /// Signed balance under the account's normal side.
    pub balance: Money,
    /// True if served from the cache.
    pub cached: bool,
}

/// Ledger query repository.
#[derive(Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
    cache: BalanceCache,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, cache: BalanceCache) -> Self {
        Self { db, cache }
    }

    /// Account ledger over `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `Account(NotFound)` for unknown accounts and
    /// `InvalidDateRange` if `start > end`.
    pub async fn account_ledger(
        &self,
        account_id: AccountId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        branch: BranchFilter,
    ) -> Result<AccountLedger, LedgerError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(LedgerError::InvalidDateRange { start, end });
            }
        }

        let chart = load_chart(&self.db).await?;
        let account = chart.get(account_id)?;
        let lines = self.posted_lines(Some(account_id), end).await?;

        LedgerQueryEngine::account_ledger(account, &lines, start, end, branch)
    }

    /// Balance of one account as of `as_of`, read through the cache.
    ///
    /// # Errors
    ///
    /// Returns `Account(NotFound)` for unknown accounts.
    pub async fn balance(
        &self,
        account_id: AccountId,
        as_of: DateTime<Utc>,
        branch: BranchFilter,
    ) -> Result<CachedBalance, LedgerError> {
        let key = BalanceKey::new(account_id, as_of, branch);
        if let Some(balance) = self.cache.get(&key) {
            tracing::debug!(account_id = %account_id, as_of = %as_of, "Balance cache hit");
            return Ok(CachedBalance {
                balance,
                cached: true,
            });
        }

        let chart = load_chart(&self.db).await?;
        let account = chart.get(account_id)?;
        let lines = self.posted_lines(Some(account_id), Some(as_of)).await?;
        let balance = LedgerQueryEngine::balance_as_of(account, &lines, as_of, branch)?;

        self.cache.insert(key, balance);
        tracing::debug!(
            account_id = %account_id,
            as_of = %as_of,
            cached_entries = self.cache.entry_count(),
            "Balance computed"
        );
        Ok(CachedBalance {
            balance,
            cached: false,
        })
    }

    /// Trial balance as of `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `Integrity(TrialBalanceMismatch)` if the unfiltered columns
    /// disagree.
    pub async fn trial_balance(
        &self,
        as_of: DateTime<Utc>,
        branch: BranchFilter,
    ) -> Result<TrialBalance, LedgerError> {
        let (chart, lines) = self.snapshot(as_of).await?;
        LedgerQueryEngine::trial_balance(&chart, &lines, as_of, branch)
    }

    /// Balance tree as of `as_of`, optionally limited to one account type.
    ///
    /// # Errors
    ///
    /// Returns `Integrity(CyclicHierarchy)` if the parent graph loops.
    pub async fn hierarchy(
        &self,
        account_type: Option<AccountType>,
        as_of: DateTime<Utc>,
        branch: BranchFilter,
    ) -> Result<Vec<BalanceNode>, LedgerError> {
        let (chart, lines) = self.snapshot(as_of).await?;
        HierarchyRollup::account_balances(&chart, &lines, account_type, as_of, branch)
    }

    async fn snapshot(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<(ChartOfAccounts, Vec<PostedLine>), LedgerError> {
        let chart = load_chart(&self.db).await?;
        let lines = self.posted_lines(None, Some(as_of)).await?;
        Ok((chart, lines))
    }

    /// Posted lines dated on or before `until`, optionally for one account.
    /// Void and draft entries never contribute.
    async fn posted_lines(
        &self,
        account_id: Option<AccountId>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<PostedLine>, LedgerError> {
        let mut query = journal_lines::Entity::find()
            .find_also_related(journal_entries::Entity)
            .filter(journal_entries::Column::Status.eq(JournalStatus::Posted));
        if let Some(account_id) = account_id {
            query = query.filter(journal_lines::Column::AccountId.eq(account_id.into_inner()));
        }
        if let Some(until) = until {
            query = query.filter(journal_entries::Column::EntryDate.lte(to_db_time(until)));
        }

        let rows = query.all(&self.db).await.map_err(db_error)?;
        Ok(rows
            .into_iter()
            .filter_map(|(line, entry)| entry.map(|entry| posted_line(&entry, line)))
            .collect())
    }
}
