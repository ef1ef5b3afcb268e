//! Ledger queries over posted journal lines.
//!
//! - Signed balance rules and running balances
//! - Account ledgers with opening/closing balances
//! - Balances as of a date, with branch filtering
//! - Trial balance with integrity checking

pub mod balance;
pub mod error;
pub mod query;
pub mod types;

#[cfg(test)]
mod query_props;

pub use balance::{NormalBalance, RunningBalance};
pub use error::{IntegrityError, LedgerError};
pub use query::{LedgerQueryEngine, SideTotals};
pub use types::{
    AccountLedger, BranchFilter, LedgerTransaction, PostedLine, TrialBalance, TrialBalanceRow,
};
