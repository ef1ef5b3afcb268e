//! `SeaORM` entity definitions.

pub mod accounts;
pub mod billing_documents;
pub mod counterparties;
pub mod journal_entries;
pub mod journal_lines;
pub mod sea_orm_active_enums;
pub mod settlements;

pub mod prelude {
    //! Entity re-exports.

    pub use super::accounts::Entity as Accounts;
    pub use super::billing_documents::Entity as BillingDocuments;
    pub use super::counterparties::Entity as Counterparties;
    pub use super::journal_entries::Entity as JournalEntries;
    pub use super::journal_lines::Entity as JournalLines;
    pub use super::settlements::Entity as Settlements;
}
