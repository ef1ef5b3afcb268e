//! Repository abstractions for data access.
//!
//! Repositories load rows, convert them to core domain types and delegate
//! every business rule to `petledger-core`.

pub mod account;
pub mod aging;
pub mod convert;
pub mod journal;
pub mod ledger;

pub use account::AccountRepository;
pub use aging::AgingRepository;
pub use journal::{JournalFilter, JournalRepository};
pub use ledger::{CachedBalance, LedgerRepository};
