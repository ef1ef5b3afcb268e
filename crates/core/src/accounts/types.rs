//! Account domain types.

use std::fmt;

use chrono::{DateTime, Utc};
use petledger_shared::types::{AccountId, UserId};
use serde::{Deserialize, Serialize};

use crate::ledger::balance::NormalBalance;

/// Top-level account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Things the shop owns.
    Asset,
    /// Things the shop owes.
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income from sales and services.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types in reporting order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses an account type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Normal balance an account of this type takes unless overridden.
    #[must_use]
    pub const fn default_normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-classification within an account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    /// Cash, bank, receivables, inventory.
    CurrentAsset,
    /// Equipment, fixtures, vehicles.
    FixedAsset,
    /// Deposits and other long-lived assets.
    OtherAsset,
    /// Payables and short-term obligations.
    CurrentLiability,
    /// Loans due after one year.
    LongTermLiability,
    /// Owner capital and drawings.
    OwnerEquity,
    /// Accumulated earnings.
    RetainedEarnings,
    /// Sales of goods and grooming/boarding services.
    OperatingRevenue,
    /// Interest and other non-operating income.
    OtherRevenue,
    /// Cost of goods sold.
    CostOfGoodsSold,
    /// Rent, wages, utilities.
    OperatingExpense,
    /// Interest and other non-operating expense.
    OtherExpense,
}

impl AccountCategory {
    /// The account type this category belongs to.
    #[must_use]
    pub const fn account_type(self) -> AccountType {
        match self {
            Self::CurrentAsset | Self::FixedAsset | Self::OtherAsset => AccountType::Asset,
            Self::CurrentLiability | Self::LongTermLiability => AccountType::Liability,
            Self::OwnerEquity | Self::RetainedEarnings => AccountType::Equity,
            Self::OperatingRevenue | Self::OtherRevenue => AccountType::Revenue,
            Self::CostOfGoodsSold | Self::OperatingExpense | Self::OtherExpense => {
                AccountType::Expense
            }
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentAsset => "current_asset",
            Self::FixedAsset => "fixed_asset",
            Self::OtherAsset => "other_asset",
            Self::CurrentLiability => "current_liability",
            Self::LongTermLiability => "long_term_liability",
            Self::OwnerEquity => "owner_equity",
            Self::RetainedEarnings => "retained_earnings",
            Self::OperatingRevenue => "operating_revenue",
            Self::OtherRevenue => "other_revenue",
            Self::CostOfGoodsSold => "cost_of_goods_sold",
            Self::OperatingExpense => "operating_expense",
            Self::OtherExpense => "other_expense",
        }
    }

    /// Parses a category from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "current_asset" => Some(Self::CurrentAsset),
            "fixed_asset" => Some(Self::FixedAsset),
            "other_asset" => Some(Self::OtherAsset),
            "current_liability" => Some(Self::CurrentLiability),
            "long_term_liability" => Some(Self::LongTermLiability),
            "owner_equity" => Some(Self::OwnerEquity),
            "retained_earnings" => Some(Self::RetainedEarnings),
            "operating_revenue" => Some(Self::OperatingRevenue),
            "other_revenue" => Some(Self::OtherRevenue),
            "cost_of_goods_sold" => Some(Self::CostOfGoodsSold),
            "operating_expense" => Some(Self::OperatingExpense),
            "other_expense" => Some(Self::OtherExpense),
            _ => None,
        }
    }
}

impl fmt::Display for AccountCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry in the chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Unique, sortable code such as `1-100`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Top-level classification.
    pub account_type: AccountType,
    /// Sub-classification; always agrees with `account_type`.
    pub category: AccountCategory,
    /// Side on which the balance grows.
    pub normal_balance: NormalBalance,
    /// Header accounts group children and never carry lines.
    pub is_header: bool,
    /// Parent header, `None` for roots.
    pub parent_id: Option<AccountId>,
    /// Inactive accounts reject new postings.
    pub is_active: bool,
    /// Soft-delete marker.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Who created the account.
    pub created_by: Option<UserId>,
    /// Who last changed the account.
    pub updated_by: Option<UserId>,
}

impl Account {
    /// Returns true once the account has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if the account is live (active and not deleted).
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.is_active && !self.is_deleted()
    }
}
