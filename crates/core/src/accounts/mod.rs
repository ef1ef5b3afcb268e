//! Chart of accounts.
//!
//! - `types` - Account, account type and category
//! - `registry` - In-memory arena with id, code and parent indexes
//! - `service` - Maintenance rules (create, re-parent, soft delete)
//! - `error` - Account errors

pub mod error;
pub mod registry;
pub mod service;
pub mod types;

pub use error::AccountError;
pub use registry::ChartOfAccounts;
pub use service::{AccountService, AccountUpdate, NewAccount};
pub use types::{Account, AccountCategory, AccountType};
