//! Journal entries and the double-entry invariant.
//!
//! - `types` - Entry aggregate, lines, inputs and totals
//! - `validation` - Line rules and the balance check
//! - `service` - Draft → Posted → Void lifecycle
//! - `number` - `JE-{YYYY}-{seq}` formatting
//! - `error` - Journal errors

pub mod error;
pub mod number;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use error::JournalError;
pub use number::JournalNumber;
pub use service::JournalService;
pub use types::{
    JournalEntry, JournalHeaderUpdate, JournalLine, JournalStatus, JournalTotals, LineInput,
    NewJournalEntry,
};
