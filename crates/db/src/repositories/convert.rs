//! Conversions between `SeaORM` models and core domain types.
//!
//! Money columns are `BIGINT` minor units, timestamps are `TIMESTAMPTZ`
//! normalized to UTC on the way out.

use chrono::{DateTime, FixedOffset, Utc};
use petledger_core::accounts::{self, Account};
use petledger_core::aging::{self, Counterparty, OutstandingDocument, Settlement};
use petledger_core::journal::{self, JournalEntry, JournalLine};
use petledger_core::ledger::{NormalBalance, PostedLine};
use petledger_shared::types::{
    AccountId, BranchId, CounterpartyId, DocumentId, JournalEntryId, JournalLineId, Money,
    SettlementId, UserId,
};

use crate::entities::{
    accounts as account_entity, billing_documents, counterparties, journal_entries, journal_lines,
    sea_orm_active_enums as db_enums, settlements,
};

/// Maps a Postgres enum onto its core counterpart, variant by variant.
macro_rules! enum_mapping {
    ($db:ty, $core:ty, [$($variant:ident),+ $(,)?]) => {
        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                type Db = $db;
                match value {
                    $(Db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                type Core = $core;
                match value {
                    $(Core::$variant => Self::$variant,)+
                }
            }
        }
    };
}

enum_mapping!(
    db_enums::AccountType,
    accounts::AccountType,
    [Asset, Liability, Equity, Revenue, Expense]
);
enum_mapping!(
    db_enums::AccountCategory,
    accounts::AccountCategory,
    [
        CurrentAsset,
        FixedAsset,
        OtherAsset,
        CurrentLiability,
        LongTermLiability,
        OwnerEquity,
        RetainedEarnings,
        OperatingRevenue,
        OtherRevenue,
        CostOfGoodsSold,
        OperatingExpense,
        OtherExpense,
    ]
);
enum_mapping!(db_enums::NormalBalance, NormalBalance, [Debit, Credit]);
enum_mapping!(db_enums::JournalStatus, journal::JournalStatus, [Draft, Posted, Void]);
enum_mapping!(db_enums::CounterpartyKind, aging::CounterpartyKind, [Supplier, Customer]);
enum_mapping!(db_enums::DocumentKind, aging::DocumentKind, [Payable, Receivable]);
enum_mapping!(
    db_enums::DocumentStatus,
    aging::DocumentStatus,
    [Draft, Submitted, Received, Completed, Cancelled]
);

/// Normalizes a stored timestamp to UTC.
pub fn to_utc(value: DateTime<FixedOffset>) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

/// Converts a UTC timestamp for storage.
pub fn to_db_time(value: DateTime<Utc>) -> DateTime<FixedOffset> {
    value.into()
}

/// Account row to domain account.
pub fn account_to_core(model: account_entity::Model) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        code: model.code,
        name: model.name,
        account_type: model.account_type.into(),
        category: model.category.into(),
        normal_balance: model.normal_balance.into(),
        is_header: model.is_header,
        parent_id: model.parent_id.map(AccountId::from_uuid),
        is_active: model.is_active,
        deleted_at: model.deleted_at.map(to_utc),
        created_by: model.created_by.map(UserId::from_uuid),
        updated_by: model.updated_by.map(UserId::from_uuid),
    }
}

/// Journal line row to domain line.
pub fn line_to_core(model: journal_lines::Model) -> JournalLine {
    JournalLine {
        id: JournalLineId::from_uuid(model.id),
        line_no: model.line_no.unsigned_abs(),
        account_id: AccountId::from_uuid(model.account_id),
        branch_id: model.branch_id.map(BranchId::from_uuid),
        debit: Money::from_minor(model.debit),
        credit: Money::from_minor(model.credit),
        description: model.description,
    }
}

/// Journal entry row plus its lines to the domain aggregate.
///
/// Lines are ordered by line number.
pub fn entry_to_core(
    model: journal_entries::Model,
    lines: Vec<journal_lines::Model>,
) -> JournalEntry {
    let mut lines: Vec<JournalLine> = lines.into_iter().map(line_to_core).collect();
    lines.sort_by_key(|line| line.line_no);

    JournalEntry {
        id: JournalEntryId::from_uuid(model.id),
        number: model.number,
        date: to_utc(model.entry_date),
        description: model.description,
        status: model.status.into(),
        branch_id: model.branch_id.map(BranchId::from_uuid),
        lines,
        created_by: UserId::from_uuid(model.created_by),
        created_at: to_utc(model.created_at),
        updated_by: UserId::from_uuid(model.updated_by),
        updated_at: to_utc(model.updated_at),
        posted_by: model.posted_by.map(UserId::from_uuid),
        posted_at: model.posted_at.map(to_utc),
        voided_by: model.voided_by.map(UserId::from_uuid),
        voided_at: model.voided_at.map(to_utc),
        void_reason: model.void_reason,
    }
}

/// Flattens a posted line joined with its entry header.
///
/// The line's branch falls back to the entry's branch.
pub fn posted_line(entry: &journal_entries::Model, line: journal_lines::Model) -> PostedLine {
    PostedLine {
        entry_id: JournalEntryId::from_uuid(entry.id),
        entry_number: entry.number.clone(),
        date: to_utc(entry.entry_date),
        entry_description: entry.description.clone(),
        line_no: line.line_no.unsigned_abs(),
        account_id: AccountId::from_uuid(line.account_id),
        branch_id: line.branch_id.or(entry.branch_id).map(BranchId::from_uuid),
        debit: Money::from_minor(line.debit),
        credit: Money::from_minor(line.credit),
        description: line.description,
    }
}

/// Counterparty row to domain counterparty.
pub fn counterparty_to_core(model: counterparties::Model) -> Counterparty {
    Counterparty {
        id: CounterpartyId::from_uuid(model.id),
        name: model.name,
        kind: model.kind.into(),
        is_active: model.is_active,
        deleted_at: model.deleted_at.map(to_utc),
    }
}

/// Billing document row to domain document.
pub fn document_to_core(model: billing_documents::Model) -> OutstandingDocument {
    OutstandingDocument {
        id: DocumentId::from_uuid(model.id),
        number: model.number,
        kind: model.kind.into(),
        counterparty_id: CounterpartyId::from_uuid(model.counterparty_id),
        branch_id: model.branch_id.map(BranchId::from_uuid),
        document_date: to_utc(model.document_date),
        total_amount: Money::from_minor(model.total_amount),
        paid_amount: Money::from_minor(model.paid_amount),
        outstanding_amount: Money::from_minor(model.outstanding_amount),
        status: model.status.into(),
        deleted_at: model.deleted_at.map(to_utc),
    }
}

/// Settlement row to domain settlement.
pub fn settlement_to_core(model: settlements::Model) -> Settlement {
    Settlement {
        id: SettlementId::from_uuid(model.id),
        counterparty_id: CounterpartyId::from_uuid(model.counterparty_id),
        document_id: model.document_id.map(DocumentId::from_uuid),
        amount: Money::from_minor(model.amount),
        paid_at: to_utc(model.paid_at),
        method: model.method,
        reference: model.reference,
    }
}
