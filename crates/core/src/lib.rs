//! Core ledger logic for Petledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts registry and maintenance rules
//! - `journal` - Journal entry lifecycle and the double-entry invariant
//! - `ledger` - Balances, account ledgers and trial balance derived from posted lines
//! - `rollup` - Header account aggregation over the account tree
//! - `aging` - Payable/receivable aging over open billing documents
//! - `cache` - Read-through balance cache

pub mod accounts;
pub mod aging;
pub mod cache;
pub mod journal;
pub mod ledger;
pub mod rollup;

#[cfg(test)]
pub(crate) mod fixtures;
