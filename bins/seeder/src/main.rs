//! Database seeder for Petledger development and testing.
//!
//! Seeds a petshop chart of accounts, a handful of posted journal entries,
//! and suppliers/customers with open purchase orders and sales so the
//! ledger and aging endpoints have something to show.
//!
//! Usage: cargo run --bin seeder

use std::collections::HashMap;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use petledger_core::accounts::{AccountCategory, NewAccount};
use petledger_core::cache::BalanceCache;
use petledger_core::journal::{LineInput, NewJournalEntry};
use petledger_db::entities::{
    billing_documents, counterparties,
    sea_orm_active_enums::{CounterpartyKind, DocumentKind, DocumentStatus},
    settlements,
};
use petledger_db::{AccountRepository, JournalRepository};
use petledger_shared::types::{AccountId, Money, UserId};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

/// Seed user recorded in audit fields (consistent for all seeds)
const SEED_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

/// `(code, name, category, is_header, parent code)`
const CHART: &[(&str, &str, AccountCategory, bool, Option<&str>)] = &[
    ("1-000", "Assets", AccountCategory::CurrentAsset, true, None),
    ("1-100", "Cash on Hand", AccountCategory::CurrentAsset, false, Some("1-000")),
    ("1-110", "Bank", AccountCategory::CurrentAsset, false, Some("1-000")),
    ("1-200", "Accounts Receivable", AccountCategory::CurrentAsset, false, Some("1-000")),
    ("1-300", "Inventory - Food & Supplies", AccountCategory::CurrentAsset, false, Some("1-000")),
    ("1-500", "Grooming Equipment", AccountCategory::FixedAsset, false, Some("1-000")),
    ("2-000", "Liabilities", AccountCategory::CurrentLiability, true, None),
    ("2-100", "Accounts Payable", AccountCategory::CurrentLiability, false, Some("2-000")),
    ("2-200", "Boarding Deposits", AccountCategory::CurrentLiability, false, Some("2-000")),
    ("3-000", "Equity", AccountCategory::OwnerEquity, true, None),
    ("3-100", "Owner Capital", AccountCategory::OwnerEquity, false, Some("3-000")),
    ("3-200", "Retained Earnings", AccountCategory::RetainedEarnings, false, Some("3-000")),
    ("4-000", "Revenue", AccountCategory::OperatingRevenue, true, None),
    ("4-100", "Product Sales", AccountCategory::OperatingRevenue, false, Some("4-000")),
    ("4-200", "Grooming Services", AccountCategory::OperatingRevenue, false, Some("4-000")),
    ("4-300", "Boarding Services", AccountCategory::OperatingRevenue, false, Some("4-000")),
    ("5-000", "Expenses", AccountCategory::OperatingExpense, true, None),
    ("5-100", "Cost of Goods Sold", AccountCategory::CostOfGoodsSold, false, Some("5-000")),
    ("5-200", "Rent", AccountCategory::OperatingExpense, false, Some("5-000")),
    ("5-300", "Wages", AccountCategory::OperatingExpense, false, Some("5-000")),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = petledger_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let actor = UserId::from_uuid(Uuid::parse_str(SEED_USER_ID)?);

    let accounts = AccountRepository::new(db.clone());
    if accounts.get_by_code("1-000").await.is_ok() {
        println!("Chart of accounts already seeded, skipping.");
        return Ok(());
    }

    println!("Seeding chart of accounts...");
    let codes = seed_chart(&accounts, actor).await?;

    println!("Seeding journal entries...");
    seed_journal(&JournalRepository::new(db.clone(), BalanceCache::new()), &codes, actor).await?;

    println!("Seeding suppliers and purchase orders...");
    seed_payables(&db).await?;

    println!("Seeding customers and sales...");
    seed_receivables(&db).await?;

    println!("Seeding complete!");
    Ok(())
}

/// Creates the chart in order so every parent exists before its children.
async fn seed_chart(
    repo: &AccountRepository,
    actor: UserId,
) -> anyhow::Result<HashMap<&'static str, AccountId>> {
    let mut codes = HashMap::new();
    for &(code, name, category, is_header, parent) in CHART {
        let parent_id = parent.and_then(|p| codes.get(p).copied());
        let account = repo
            .create(
                NewAccount {
                    code: code.to_string(),
                    name: name.to_string(),
                    account_type: category.account_type(),
                    category,
                    normal_balance: None,
                    is_header,
                    parent_id,
                },
                actor,
            )
            .await
            .with_context(|| format!("Failed to create account {code}"))?;
        println!("  {code} {name}");
        codes.insert(code, account.id);
    }
    Ok(codes)
}

async fn seed_journal(
    repo: &JournalRepository,
    codes: &HashMap<&'static str, AccountId>,
    actor: UserId,
) -> anyhow::Result<()> {
    let account = |code: &str| {
        codes
            .get(code)
            .copied()
            .with_context(|| format!("Account {code} was not seeded"))
    };
    let now = Utc::now();

    // (days ago, description, debit code, credit code, amount in cents)
    let entries = [
        (120, "Owner capital contribution", "1-110", "3-100", 5_000_000),
        (90, "Grooming table and dryers", "1-500", "1-110", 750_000),
        (45, "Dog food restock on credit", "1-300", "2-100", 1_200_000),
        (30, "Monthly shop rent", "5-200", "1-110", 300_000),
        (12, "Counter sales - food and toys", "1-100", "4-100", 85_000),
        (12, "Cost of counter sales", "5-100", "1-300", 40_000),
        (10, "Grooming package on account", "1-200", "4-200", 45_000),
        (3, "Weekend boarding deposit", "1-100", "2-200", 60_000),
    ];

    for (days_ago, description, debit, credit, amount) in entries {
        let amount = Money::from_minor(amount);
        let entry = repo
            .create(
                NewJournalEntry {
                    date: now - Duration::days(days_ago),
                    description: description.to_string(),
                    branch_id: None,
                    lines: vec![
                        LineInput::debit(account(debit)?, amount),
                        LineInput::credit(account(credit)?, amount),
                    ],
                },
                true,
                actor,
            )
            .await
            .with_context(|| format!("Failed to post '{description}'"))?;
        println!("  {} {description}", entry.number);
    }
    Ok(())
}

async fn insert_counterparty(
    db: &DatabaseConnection,
    name: &str,
    kind: CounterpartyKind,
) -> anyhow::Result<Uuid> {
    let now = Utc::now();
    let model = counterparties::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.to_string()),
        kind: Set(kind),
        is_active: Set(true),
        deleted_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .with_context(|| format!("Failed to insert counterparty {name}"))?;
    println!("  {name}");
    Ok(model.id)
}

struct Document<'a> {
    number: &'a str,
    kind: DocumentKind,
    counterparty_id: Uuid,
    date: DateTime<Utc>,
    total: i64,
    paid: i64,
    status: DocumentStatus,
}

async fn insert_document(db: &DatabaseConnection, doc: Document<'_>) -> anyhow::Result<Uuid> {
    let now = Utc::now();
    let model = billing_documents::ActiveModel {
        id: Set(Uuid::now_v7()),
        number: Set(doc.number.to_string()),
        kind: Set(doc.kind),
        counterparty_id: Set(doc.counterparty_id),
        branch_id: Set(None),
        document_date: Set(doc.date.into()),
        total_amount: Set(doc.total),
        paid_amount: Set(doc.paid),
        outstanding_amount: Set(doc.total - doc.paid),
        status: Set(doc.status),
        deleted_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .with_context(|| format!("Failed to insert document {}", doc.number))?;

    if doc.paid > 0 {
        settlements::ActiveModel {
            id: Set(Uuid::now_v7()),
            counterparty_id: Set(doc.counterparty_id),
            document_id: Set(Some(model.id)),
            amount: Set(doc.paid),
            paid_at: Set((doc.date + Duration::days(14)).into()),
            method: Set("bank_transfer".to_string()),
            reference: Set(Some(format!("PAY-{}", doc.number))),
            created_at: Set(now.into()),
        }
        .insert(db)
        .await
        .with_context(|| format!("Failed to insert settlement for {}", doc.number))?;
    }
    Ok(model.id)
}

async fn seed_payables(db: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now();
    let supplier = CounterpartyKind::Supplier;
    let wholesale = insert_counterparty(db, "Happy Paws Wholesale", supplier).await?;
    let aquatic = insert_counterparty(db, "Aquatic Supplies Co.", supplier).await?;

    let orders = [
        ("PO-0001", wholesale, 45, 1_200_000, 400_000, DocumentStatus::Received),
        ("PO-0002", wholesale, 75, 250_000, 0, DocumentStatus::Submitted),
        ("PO-0003", aquatic, 120, 90_000, 0, DocumentStatus::Received),
        ("PO-0004", aquatic, 5, 60_000, 0, DocumentStatus::Draft),
    ];
    for (number, counterparty_id, days_ago, total, paid, status) in orders {
        insert_document(
            db,
            Document {
                number,
                kind: DocumentKind::Payable,
                counterparty_id,
                date: now - Duration::days(days_ago),
                total,
                paid,
                status,
            },
        )
        .await?;
    }
    Ok(())
}

async fn seed_receivables(db: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now();
    let member = insert_counterparty(db, "Rina Grooming Club", CounterpartyKind::Customer).await?;
    let hotel = insert_counterparty(db, "Downtown Pet Hotel", CounterpartyKind::Customer).await?;

    let sales = [
        ("SO-0001", member, 10, 45_000, 0, DocumentStatus::Completed),
        ("SO-0002", hotel, 35, 180_000, 80_000, DocumentStatus::Completed),
        ("SO-0003", hotel, 65, 120_000, 0, DocumentStatus::Submitted),
        ("SO-0004", member, 95, 30_000, 30_000, DocumentStatus::Completed),
    ];
    for (number, counterparty_id, days_ago, total, paid, status) in sales {
        insert_document(
            db,
            Document {
                number,
                kind: DocumentKind::Receivable,
                counterparty_id,
                date: now - Duration::days(days_ago),
                total,
                paid,
                status,
            },
        )
        .await?;
    }
    Ok(())
}
