//! Journal entry domain types.

use std::fmt;

use chrono::{DateTime, Utc};
use petledger_shared::types::{
    AccountId, BranchId, JournalEntryId, JournalLineId, Money, UserId, nullable,
};
use serde::{Deserialize, Serialize};

use super::error::JournalError;

/// Journal entry lifecycle status.
///
/// The valid transitions are:
/// - Draft → Posted (post)
/// - Posted → Void (void)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Being prepared; lines may change and totals need not balance.
    Draft,
    /// Balanced and counted in every balance and report.
    Posted,
    /// Retained for audit, excluded from all balances.
    Void,
}

impl JournalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Void => "void",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            "void" => Some(Self::Void),
            _ => None,
        }
    }

    /// Returns true if lines and header may change.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One debit or credit line of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Line ID.
    pub id: JournalLineId,
    /// 1-based position within the entry.
    pub line_no: u32,
    /// Detail account the line posts to.
    pub account_id: AccountId,
    /// Overrides the entry's branch for this line.
    pub branch_id: Option<BranchId>,
    /// Debit amount, zero when this is a credit line.
    pub debit: Money,
    /// Credit amount, zero when this is a debit line.
    pub credit: Money,
    /// Line memo.
    pub description: Option<String>,
}

/// Input for a single journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// Detail account to post to.
    pub account_id: AccountId,
    /// Optional branch override.
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    /// Debit amount.
    #[serde(default)]
    pub debit: Money,
    /// Credit amount.
    #[serde(default)]
    pub credit: Money,
    /// Line memo.
    #[serde(default)]
    pub description: Option<String>,
}

impl LineInput {
    /// A debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Money) -> Self {
        Self {
            account_id,
            branch_id: None,
            debit: amount,
            credit: Money::ZERO,
            description: None,
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Money) -> Self {
        Self {
            account_id,
            branch_id: None,
            debit: Money::ZERO,
            credit: amount,
            description: None,
        }
    }

    /// Sets the branch override.
    #[must_use]
    pub const fn with_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }
}

/// Input for creating a journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJournalEntry {
    /// Accounting date.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    /// Entry description.
    pub description: String,
    /// Default branch for every line.
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    /// Lines; at least one.
    pub lines: Vec<LineInput>,
}

/// Changes to a draft entry's header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalHeaderUpdate {
    /// New accounting date.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub date: Option<DateTime<Utc>>,
    /// New description.
    pub description: Option<String>,
    /// New default branch; `Some(None)` clears it.
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub branch_id: Option<Option<BranchId>>,
}

/// Summed sides of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTotals {
    /// Sum of debits.
    pub debit: Money,
    /// Sum of credits.
    pub credit: Money,
    /// Whether debits equal credits exactly.
    pub is_balanced: bool,
}

/// Journal entry aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Entry ID.
    pub id: JournalEntryId,
    /// Sequential human-readable number, `JE-{YYYY}-{seq}`.
    pub number: String,
    /// Accounting date.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    /// Entry description.
    pub description: String,
    /// Lifecycle status.
    pub status: JournalStatus,
    /// Default branch for lines without their own.
    pub branch_id: Option<BranchId>,
    /// Lines ordered by `line_no`.
    pub lines: Vec<JournalLine>,
    /// Creator.
    pub created_by: UserId,
    /// Creation time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Last modifier.
    pub updated_by: UserId,
    /// Last modification time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    /// Who posted it.
    pub posted_by: Option<UserId>,
    /// When it was posted.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub posted_at: Option<DateTime<Utc>>,
    /// Who voided it.
    pub voided_by: Option<UserId>,
    /// When it was voided.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub voided_at: Option<DateTime<Utc>>,
    /// Why it was voided.
    pub void_reason: Option<String>,
}

impl JournalEntry {
    /// Summed debit and credit sides.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if a side does not fit in `i64`.
    pub fn totals(&self) -> Result<JournalTotals, JournalError> {
        super::validation::checked_totals(&self.lines)
    }

    /// Effective branch of a line: its own, else the entry's.
    #[must_use]
    pub fn effective_branch(&self, line: &JournalLine) -> Option<BranchId> {
        line.branch_id.or(self.branch_id)
    }

    /// Next free line number.
    #[must_use]
    pub fn next_line_no(&self) -> u32 {
        self.lines.iter().map(|l| l.line_no).max().unwrap_or(0) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(JournalStatus::parse("POSTED"), Some(JournalStatus::Posted));
        assert_eq!(JournalStatus::parse("void"), Some(JournalStatus::Void));
        assert_eq!(JournalStatus::parse("voided"), None);
        assert!(JournalStatus::Draft.is_editable());
        assert!(!JournalStatus::Posted.is_editable());
    }

    #[test]
    fn test_line_input_deserializes_with_defaults() {
        let account_id = AccountId::new();
        let json = format!(r#"{{"account_id":"{account_id}","debit":1500}}"#);
        let line: LineInput = serde_json::from_str(&json).unwrap();
        assert_eq!(line.debit, Money::from_minor(1500));
        assert_eq!(line.credit, Money::ZERO);
        assert_eq!(line.branch_id, None);
    }

    #[test]
    fn test_new_entry_date_is_epoch_millis() {
        let json = r#"{"date":1767225600000,"description":"Opening","lines":[]}"#;
        let entry: NewJournalEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.date.timestamp_millis(), 1_767_225_600_000);
    }
}
