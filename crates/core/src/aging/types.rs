//! Aging domain types.

use std::fmt;

use chrono::{DateTime, Utc};
use petledger_shared::types::{BranchId, CounterpartyId, DocumentId, Money, SettlementId};
use serde::{Deserialize, Serialize};

/// Which side of the books a document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Purchase orders owed to suppliers.
    Payable,
    /// Sales documents owed by customers.
    Receivable,
}

impl DocumentKind {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Payable => "payable",
            Self::Receivable => "receivable",
        }
    }

    /// Statuses in which a document of this kind still awaits settlement.
    #[must_use]
    pub const fn open_statuses(self) -> &'static [DocumentStatus] {
        match self {
            Self::Payable => &[DocumentStatus::Submitted, DocumentStatus::Received],
            Self::Receivable => &[DocumentStatus::Submitted, DocumentStatus::Completed],
        }
    }

    /// Returns true if `status` is open for this kind.
    #[must_use]
    pub fn is_open(self, status: DocumentStatus) -> bool {
        self.open_statuses().contains(&status)
    }

    /// Counterparty kind on the other side of this document.
    #[must_use]
    pub const fn counterparty_kind(self) -> CounterpartyKind {
        match self {
            Self::Payable => CounterpartyKind::Supplier,
            Self::Receivable => CounterpartyKind::Customer,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Not yet sent.
    Draft,
    /// Sent to the counterparty.
    Submitted,
    /// Goods received (payables).
    Received,
    /// Fulfilled (receivables).
    Completed,
    /// Cancelled; never aged.
    Cancelled,
}

impl DocumentStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Received => "received",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "received" => Some(Self::Received),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Supplier or customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyKind {
    /// Sells to the shop.
    Supplier,
    /// Buys from the shop.
    Customer,
}

/// A supplier or customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    /// Counterparty ID.
    pub id: CounterpartyId,
    /// Display name.
    pub name: String,
    /// Supplier or customer.
    pub kind: CounterpartyKind,
    /// Active flag.
    pub is_active: bool,
    /// Soft-delete marker.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Counterparty {
    /// Active and not deleted.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}

/// An open-able billing document (purchase order or sales document).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingDocument {
    /// Document ID.
    pub id: DocumentId,
    /// Document number.
    pub number: String,
    /// Payable or receivable.
    pub kind: DocumentKind,
    /// Supplier or customer.
    pub counterparty_id: CounterpartyId,
    /// Owning branch.
    pub branch_id: Option<BranchId>,
    /// Document date; aging counts from here.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub document_date: DateTime<Utc>,
    /// Billed amount.
    pub total_amount: Money,
    /// Settled so far.
    pub paid_amount: Money,
    /// Still owed.
    pub outstanding_amount: Money,
    /// Document status.
    pub status: DocumentStatus,
    /// Soft-delete marker.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl OutstandingDocument {
    /// Not deleted, open for its kind, and still owing money.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.deleted_at.is_none()
            && self.kind.is_open(self.status)
            && self.outstanding_amount.is_positive()
    }
}

/// A payment against a counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Settlement ID.
    pub id: SettlementId,
    /// Who paid or was paid.
    pub counterparty_id: CounterpartyId,
    /// Document settled, if tied to one.
    pub document_id: Option<DocumentId>,
    /// Amount paid.
    pub amount: Money,
    /// Payment time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub paid_at: DateTime<Utc>,
    /// Payment method, e.g. `cash` or `transfer`.
    pub method: String,
    /// External reference.
    pub reference: Option<String>,
}

/// Aging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AgingBucket {
    /// 0-30 days.
    Current,
    /// 31-60 days.
    #[serde(rename = "days31to60")]
    Days31To60,
    /// 61-90 days.
    #[serde(rename = "days61to90")]
    Days61To90,
    /// Over 90 days.
    #[serde(rename = "over90days")]
    Over90Days,
}

impl AgingBucket {
    /// Classifies elapsed whole days. Non-positive ages are current.
    #[must_use]
    pub const fn classify(days: i64) -> Self {
        match days {
            ..=30 => Self::Current,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90Days,
        }
    }
}

/// Per-bucket amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTotals {
    /// 0-30 days.
    pub current: Money,
    /// 31-60 days.
    #[serde(rename = "days31to60")]
    pub days_31_to_60: Money,
    /// 61-90 days.
    #[serde(rename = "days61to90")]
    pub days_61_to_90: Money,
    /// Over 90 days.
    #[serde(rename = "over90days")]
    pub over_90_days: Money,
}

impl BucketTotals {
    /// Adds `amount` to exactly one bucket, or `None` on overflow.
    #[must_use]
    pub fn checked_add(mut self, bucket: AgingBucket, amount: Money) -> Option<Self> {
        let slot = match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days31To60 => &mut self.days_31_to_60,
            AgingBucket::Days61To90 => &mut self.days_61_to_90,
            AgingBucket::Over90Days => &mut self.over_90_days,
        };
        *slot = slot.checked_add(amount)?;
        Some(self)
    }

    /// Adds another set of totals bucket by bucket, or `None` on overflow.
    #[must_use]
    pub fn checked_merge(self, other: &Self) -> Option<Self> {
        Some(Self {
            current: self.current.checked_add(other.current)?,
            days_31_to_60: self.days_31_to_60.checked_add(other.days_31_to_60)?,
            days_61_to_90: self.days_61_to_90.checked_add(other.days_61_to_90)?,
            over_90_days: self.over_90_days.checked_add(other.over_90_days)?,
        })
    }

    /// Sum of all buckets, or `None` on overflow.
    #[must_use]
    pub fn total(&self) -> Option<Money> {
        Money::checked_sum([
            self.current,
            self.days_31_to_60,
            self.days_61_to_90,
            self.over_90_days,
        ])
    }
}

/// Aging row for one counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyAging {
    /// Counterparty ID.
    pub counterparty_id: CounterpartyId,
    /// Counterparty name.
    pub name: String,
    /// Amounts per bucket.
    pub buckets: BucketTotals,
    /// Sum of the buckets.
    pub total_outstanding: Money,
    /// Oldest included document date.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub oldest_document_date: DateTime<Utc>,
    /// Number of included documents.
    pub document_count: u32,
}

/// Report-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingSummary {
    /// Amounts per bucket.
    pub buckets: BucketTotals,
    /// Sum of all included outstanding amounts.
    pub total_outstanding: Money,
    /// Active counterparties of the report's kind.
    pub total_counterparties: u32,
    /// Counterparties with at least one included document.
    pub counterparties_with_balance: u32,
}

/// Aging report for payables or receivables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingReport {
    /// Payables or receivables.
    pub kind: DocumentKind,
    /// Cut-off (inclusive).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub as_of: DateTime<Utc>,
    /// Branch the report was restricted to.
    pub branch_id: Option<BranchId>,
    /// Report-wide totals.
    pub summary: AgingSummary,
    /// Rows sorted by total outstanding, largest first.
    pub counterparties: Vec<CounterpartyAging>,
}

/// One open bill in a counterparty drill-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingBill {
    /// Document ID.
    pub document_id: DocumentId,
    /// Document number.
    pub number: String,
    /// Document date.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub document_date: DateTime<Utc>,
    /// Billed amount.
    pub total_amount: Money,
    /// Settled so far.
    pub paid_amount: Money,
    /// Still owed.
    pub outstanding_amount: Money,
    /// Document status.
    pub status: DocumentStatus,
    /// Whole days since the document date, measured against `now`.
    pub days_outstanding: i64,
    /// Bucket for `days_outstanding`.
    pub bucket: AgingBucket,
}

/// Drill-down totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingSummary {
    /// Sum of open amounts.
    pub total_outstanding: Money,
    /// Sum of billed amounts of the open bills.
    pub total_billed: Money,
    /// Sum of amounts already paid on the open bills.
    pub total_paid: Money,
    /// Number of open bills.
    pub bill_count: u32,
    /// Oldest open bill date.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub oldest_document_date: Option<DateTime<Utc>>,
}

/// Per-counterparty drill-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyOutstanding {
    /// The counterparty.
    pub counterparty: Counterparty,
    /// Reference time for `days_outstanding`.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub now: DateTime<Utc>,
    /// Totals.
    pub summary: OutstandingSummary,
    /// Open bills, oldest first.
    pub outstanding_bills: Vec<OutstandingBill>,
    /// Settlements, newest first, when requested.
    pub payment_history: Option<Vec<Settlement>>,
}
