//! Ledger projection types.
//!
//! Everything here is derived from posted journal lines on demand and never
//! stored as a source of truth.

use chrono::{DateTime, Utc};
use petledger_shared::types::{AccountId, BranchId, JournalEntryId, Money};
use serde::{Deserialize, Serialize};

use super::balance::NormalBalance;
use crate::accounts::AccountType;
use crate::journal::{JournalEntry, JournalStatus};

/// Restricts ledger queries to one branch.
///
/// `Branch(id)` keeps lines whose effective branch is `id` or untagged
/// (global lines apply to every branch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "branch_id")]
pub enum BranchFilter {
    /// No filtering.
    #[default]
    All,
    /// Lines of this branch plus global lines.
    Branch(BranchId),
}

impl BranchFilter {
    /// Returns true if a line with this effective branch passes the filter.
    #[must_use]
    pub fn matches(self, effective: Option<BranchId>) -> bool {
        match (self, effective) {
            (Self::All, _) | (Self::Branch(_), None) => true,
            (Self::Branch(wanted), Some(branch)) => wanted == branch,
        }
    }

    /// The selected branch, if any.
    #[must_use]
    pub const fn branch_id(self) -> Option<BranchId> {
        match self {
            Self::All => None,
            Self::Branch(id) => Some(id),
        }
    }
}

impl From<Option<BranchId>> for BranchFilter {
    fn from(branch: Option<BranchId>) -> Self {
        branch.map_or(Self::All, Self::Branch)
    }
}

/// Flattened posted journal line, the unit every ledger query works on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedLine {
    /// Owning entry.
    pub entry_id: JournalEntryId,
    /// Owning entry's number.
    pub entry_number: String,
    /// Entry date.
    pub date: DateTime<Utc>,
    /// Entry description.
    pub entry_description: String,
    /// Line number within the entry.
    pub line_no: u32,
    /// Account posted to.
    pub account_id: AccountId,
    /// Effective branch (line override, else entry branch).
    pub branch_id: Option<BranchId>,
    /// Debit amount.
    pub debit: Money,
    /// Credit amount.
    pub credit: Money,
    /// Line memo.
    pub description: Option<String>,
}

impl PostedLine {
    /// Lines of one entry; empty unless the entry is posted.
    #[must_use]
    pub fn from_entry(entry: &JournalEntry) -> Vec<Self> {
        if entry.status != JournalStatus::Posted {
            return Vec::new();
        }
        entry
            .lines
            .iter()
            .map(|line| Self {
                entry_id: entry.id,
                entry_number: entry.number.clone(),
                date: entry.date,
                entry_description: entry.description.clone(),
                line_no: line.line_no,
                account_id: line.account_id,
                branch_id: entry.effective_branch(line),
                debit: line.debit,
                credit: line.credit,
                description: line.description.clone(),
            })
            .collect()
    }

    /// Posted lines of many entries; drafts and void entries contribute nothing.
    #[must_use]
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a JournalEntry>) -> Vec<Self> {
        entries.into_iter().flat_map(Self::from_entry).collect()
    }

    /// Chronological ordering key: date, then entry number, then line number.
    #[must_use]
    pub fn sort_key(&self) -> (DateTime<Utc>, &str, u32) {
        (self.date, self.entry_number.as_str(), self.line_no)
    }
}

/// One row of an account ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Journal entry ID.
    pub entry_id: JournalEntryId,
    /// Journal entry number.
    pub entry_number: String,
    /// Entry date.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    /// Entry description.
    pub description: String,
    /// Line memo.
    pub line_description: Option<String>,
    /// Effective branch.
    pub branch_id: Option<BranchId>,
    /// Debit amount.
    pub debit: Money,
    /// Credit amount.
    pub credit: Money,
    /// Balance after this line.
    pub running_balance: Money,
}

/// Account ledger over a date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedger {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
    /// Window start (inclusive), if any.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub start: Option<DateTime<Utc>>,
    /// Window end (inclusive), if any.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub end: Option<DateTime<Utc>>,
    /// Balance of all lines dated before `start`.
    pub opening_balance: Money,
    /// Lines inside the window in chronological order.
    pub transactions: Vec<LedgerTransaction>,
    /// Balance after the last line in the window.
    pub closing_balance: Money,
    /// Sum of window debits.
    pub total_debit: Money,
    /// Sum of window credits.
    pub total_credit: Money,
}

/// One account row of a trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
    /// Signed balance relative to the normal side.
    pub balance: Money,
    /// Debit column amount.
    pub debit_balance: Money,
    /// Credit column amount.
    pub credit_balance: Money,
    /// Balance sits on the side opposite to normal.
    pub abnormal: bool,
    /// False for inactive or deleted accounts that still carry a balance.
    pub is_active: bool,
}

/// Trial balance as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Cut-off (inclusive).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub as_of: DateTime<Utc>,
    /// Branch the report was restricted to.
    pub branch_id: Option<BranchId>,
    /// Non-zero detail accounts sorted by code.
    pub accounts: Vec<TrialBalanceRow>,
    /// Debit column total.
    pub total_debit: Money,
    /// Credit column total.
    pub total_credit: Money,
    /// Whether the columns agree.
    pub is_balanced: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_filter_matches() {
        let a = BranchId::new();
        let b = BranchId::new();
        assert!(BranchFilter::All.matches(Some(a)));
        assert!(BranchFilter::All.matches(None));
        assert!(BranchFilter::Branch(a).matches(Some(a)));
        assert!(BranchFilter::Branch(a).matches(None));
        assert!(!BranchFilter::Branch(a).matches(Some(b)));
    }

    #[test]
    fn test_branch_filter_from_option() {
        let a = BranchId::new();
        assert_eq!(BranchFilter::from(None), BranchFilter::All);
        assert_eq!(BranchFilter::from(Some(a)), BranchFilter::Branch(a));
        assert_eq!(BranchFilter::Branch(a).branch_id(), Some(a));
    }
}
