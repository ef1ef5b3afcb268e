//! Payable and receivable aging.
//!
//! Reads open billing documents directly, independent of the ledger. The
//! same algorithm serves both sides; only the open statuses differ.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::AgingError;
pub use service::AgingService;
pub use types::{
    AgingBucket, AgingReport, AgingSummary, BucketTotals, Counterparty, CounterpartyAging,
    CounterpartyKind, CounterpartyOutstanding, DocumentKind, DocumentStatus, OutstandingBill,
    OutstandingDocument, OutstandingSummary, Settlement,
};
