//! Test fixtures shared by the core unit and property tests.

use chrono::{DateTime, TimeZone, Utc};
use petledger_shared::types::{AccountId, BranchId, JournalEntryId, Money, UserId};

use crate::accounts::{Account, AccountCategory, AccountType, ChartOfAccounts};
use crate::journal::{JournalEntry, JournalService, LineInput, NewJournalEntry};

/// Midnight UTC on the given day of January 2026.
pub fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap()
}

/// Midnight UTC on an arbitrary 2026 date.
pub fn day(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, month, day, 0, 0, 0).unwrap()
}

pub fn account(
    code: &str,
    name: &str,
    account_type: AccountType,
    category: AccountCategory,
    is_header: bool,
    parent_id: Option<AccountId>,
) -> Account {
    Account {
        id: AccountId::new(),
        code: code.to_string(),
        name: name.to_string(),
        account_type,
        category,
        normal_balance: account_type.default_normal_balance(),
        is_header,
        parent_id,
        is_active: true,
        deleted_at: None,
        created_by: None,
        updated_by: None,
    }
}

pub fn header(
    code: &str,
    name: &str,
    category: AccountCategory,
    parent_id: Option<AccountId>,
) -> Account {
    account(code, name, category.account_type(), category, true, parent_id)
}

pub fn detail(
    code: &str,
    name: &str,
    category: AccountCategory,
    parent_id: Option<AccountId>,
) -> Account {
    account(code, name, category.account_type(), category, false, parent_id)
}

/// A small petshop chart:
///
/// ```text
/// 1-000 Assets (H)
///   1-100 Cash
///   1-200 Bank
///   1-300 Inventory
/// 2-000 Liabilities (H)
///   2-100 Accounts Payable
/// 3-100 Owner Capital
/// 4-000 Revenue (H)
///   4-100 Product Sales
///   4-200 Grooming Services
/// 5-000 Expenses (H)
///   5-100 Cost of Goods Sold
///   5-200 Rent
/// ```
pub struct PetshopChart {
    pub chart: ChartOfAccounts,
    pub assets: AccountId,
    pub cash: AccountId,
    pub bank: AccountId,
    pub inventory: AccountId,
    pub liabilities: AccountId,
    pub payables: AccountId,
    pub capital: AccountId,
    pub revenue: AccountId,
    pub sales: AccountId,
    pub grooming: AccountId,
    pub expenses: AccountId,
    pub cogs: AccountId,
    pub rent: AccountId,
}

impl PetshopChart {
    pub fn build() -> Self {
        use AccountCategory as C;

        let assets = header("1-000", "Assets", C::CurrentAsset, None);
        let cash = detail("1-100", "Cash", C::CurrentAsset, Some(assets.id));
        let bank = detail("1-200", "Bank", C::CurrentAsset, Some(assets.id));
        let inventory = detail("1-300", "Inventory", C::CurrentAsset, Some(assets.id));
        let liabilities = header("2-000", "Liabilities", C::CurrentLiability, None);
        let payables =
            detail("2-100", "Accounts Payable", C::CurrentLiability, Some(liabilities.id));
        let capital = detail("3-100", "Owner Capital", C::OwnerEquity, None);
        let revenue = header("4-000", "Revenue", C::OperatingRevenue, None);
        let sales = detail("4-100", "Product Sales", C::OperatingRevenue, Some(revenue.id));
        let grooming = detail("4-200", "Grooming Services", C::OperatingRevenue, Some(revenue.id));
        let expenses = header("5-000", "Expenses", C::OperatingExpense, None);
        let cogs = detail("5-100", "Cost of Goods Sold", C::CostOfGoodsSold, Some(expenses.id));
        let rent = detail("5-200", "Rent", C::OperatingExpense, Some(expenses.id));

        let ids = Self {
            chart: ChartOfAccounts::default(),
            assets: assets.id,
            cash: cash.id,
            bank: bank.id,
            inventory: inventory.id,
            liabilities: liabilities.id,
            payables: payables.id,
            capital: capital.id,
            revenue: revenue.id,
            sales: sales.id,
            grooming: grooming.id,
            expenses: expenses.id,
            cogs: cogs.id,
            rent: rent.id,
        };

        let chart = ChartOfAccounts::new(vec![
            assets, cash, bank, inventory, liabilities, payables, capital, revenue, sales, grooming,
            expenses, cogs, rent,
        ])
        .unwrap();

        Self { chart, ..ids }
    }

    /// Detail accounts that journal lines may use.
    pub fn details(&self) -> Vec<AccountId> {
        vec![
            self.cash,
            self.bank,
            self.inventory,
            self.payables,
            self.capital,
            self.sales,
            self.grooming,
            self.cogs,
            self.rent,
        ]
    }

    /// Rebuilds the chart with one account deactivated.
    pub fn deactivate(&mut self, id: AccountId) {
        self.modify(id, |account| account.is_active = false);
    }

    /// Rebuilds the chart with one account changed.
    pub fn modify(&mut self, id: AccountId, f: impl FnOnce(&mut Account)) {
        let mut accounts: Vec<Account> = self.chart.accounts().cloned().collect();
        if let Some(account) = accounts.iter_mut().find(|a| a.id == id) {
            f(account);
        }
        self.chart = ChartOfAccounts::new(accounts).unwrap();
    }

    /// Creates and posts a balanced two-line entry.
    pub fn posted(
        &self,
        seq: i64,
        date: DateTime<Utc>,
        debit: AccountId,
        credit: AccountId,
        amount: i64,
        branch_id: Option<BranchId>,
    ) -> JournalEntry {
        let input = NewJournalEntry {
            date,
            description: format!("Entry {seq}"),
            branch_id,
            lines: vec![
                LineInput::debit(debit, Money::from_minor(amount)),
                LineInput::credit(credit, Money::from_minor(amount)),
            ],
        };
        JournalService::create_posted(
            &self.chart,
            JournalEntryId::new(),
            crate::journal::JournalNumber::format(2026, seq),
            input,
            UserId::new(),
            date,
        )
        .unwrap()
    }
}
