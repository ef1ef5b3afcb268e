//! Ledger query engine.
//!
//! Balances are recomputed from posted lines on every call. Nothing here
//! mutates its inputs, so identical arguments always yield identical results.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use petledger_shared::types::{AccountId, Money};

use super::balance::{NormalBalance, RunningBalance};
use super::error::{IntegrityError, LedgerError};
use super::types::{
    AccountLedger, BranchFilter, LedgerTransaction, PostedLine, TrialBalance, TrialBalanceRow,
};
use crate::accounts::{Account, ChartOfAccounts};

/// Raw debit and credit sums for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideTotals {
    /// Sum of debits.
    pub debit: Money,
    /// Sum of credits.
    pub credit: Money,
}

impl SideTotals {
    /// Signed balance for an account with the given normal side.
    #[must_use]
    pub fn balance(self, normal: NormalBalance) -> Money {
        normal.balance_change(self.debit, self.credit)
    }
}

/// Logs and builds the error for an account sum that left `i64`.
pub(crate) fn balance_overflow(account_id: AccountId) -> LedgerError {
    tracing::error!(account_id = %account_id, "Account balance overflows");
    IntegrityError::BalanceOverflow { account_id }.into()
}

/// Ledger query engine.
pub struct LedgerQueryEngine;

impl LedgerQueryEngine {
    /// Account ledger over `[start, end]` (both inclusive, both optional).
    ///
    /// Lines before `start` fold into the opening balance; lines after `end`
    /// are ignored. Window lines are ordered by date, entry number and line
    /// number, each carrying the running balance after it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`, or
    /// `Integrity(BalanceOverflow)` if a sum leaves `i64`.
    pub fn account_ledger(
        account: &Account,
        lines: &[PostedLine],
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        branch: BranchFilter,
    ) -> Result<AccountLedger, LedgerError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(LedgerError::InvalidDateRange { start, end });
            }
        }

        let mut relevant: Vec<&PostedLine> = lines
            .iter()
            .filter(|line| line.account_id == account.id && branch.matches(line.branch_id))
            .collect();
        relevant.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let normal = account.normal_balance;
        let overflow = || balance_overflow(account.id);
        let mut opening_balance = Money::ZERO;
        let mut window = Vec::new();

        for line in relevant {
            if start.is_some_and(|start| line.date < start) {
                opening_balance = opening_balance
                    .checked_add(normal.balance_change(line.debit, line.credit))
                    .ok_or_else(overflow)?;
            } else if end.is_none_or(|end| line.date <= end) {
                window.push(line);
            }
        }

        let mut running = RunningBalance::opening(opening_balance);
        let mut total_debit = Money::ZERO;
        let mut total_credit = Money::ZERO;
        let mut transactions = Vec::with_capacity(window.len());
        for line in window {
            running = running
                .next(normal.balance_change(line.debit, line.credit))
                .ok_or_else(overflow)?;
            total_debit = total_debit.checked_add(line.debit).ok_or_else(overflow)?;
            total_credit = total_credit.checked_add(line.credit).ok_or_else(overflow)?;
            transactions.push(LedgerTransaction {
                entry_id: line.entry_id,
                entry_number: line.entry_number.clone(),
                date: line.date,
                description: line.entry_description.clone(),
                line_description: line.description.clone(),
                branch_id: line.branch_id,
                debit: line.debit,
                credit: line.credit,
                running_balance: running.current_balance,
            });
        }

        Ok(AccountLedger {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            normal_balance: normal,
            start,
            end,
            opening_balance,
            transactions,
            closing_balance: running.current_balance,
            total_debit,
            total_credit,
        })
    }

    /// Balance of one account as of `as_of` (inclusive).
    ///
    /// # Errors
    ///
    /// Returns `Integrity(BalanceOverflow)` if the sum leaves `i64`.
    pub fn balance_as_of(
        account: &Account,
        lines: &[PostedLine],
        as_of: DateTime<Utc>,
        branch: BranchFilter,
    ) -> Result<Money, LedgerError> {
        let changes = lines
            .iter()
            .filter(|line| {
                line.account_id == account.id
                    && line.date <= as_of
                    && branch.matches(line.branch_id)
            })
            .map(|line| account.normal_balance.balance_change(line.debit, line.credit));
        Money::checked_sum(changes).ok_or_else(|| balance_overflow(account.id))
    }

    /// Raw debit/credit sums per account as of `as_of`, in one pass.
    ///
    /// # Errors
    ///
    /// Returns `Integrity(BalanceOverflow)` if an account's side leaves `i64`.
    pub fn side_totals(
        lines: &[PostedLine],
        as_of: DateTime<Utc>,
        branch: BranchFilter,
    ) -> Result<HashMap<AccountId, SideTotals>, LedgerError> {
        let mut totals: HashMap<AccountId, SideTotals> = HashMap::new();
        for line in lines
            .iter()
            .filter(|line| line.date <= as_of && branch.matches(line.branch_id))
        {
            let entry = totals.entry(line.account_id).or_default();
            let overflow = || balance_overflow(line.account_id);
            entry.debit = entry.debit.checked_add(line.debit).ok_or_else(overflow)?;
            entry.credit = entry.credit.checked_add(line.credit).ok_or_else(overflow)?;
        }
        Ok(totals)
    }

    /// Trial balance as of `as_of` (inclusive).
    ///
    /// Every detail account with a non-zero balance appears, in code order.
    /// A positive balance goes to the account's normal column; a negative one
    /// goes to the opposite column as an absolute value and is flagged
    /// `abnormal`, so totals always include it.
    ///
    /// Unfiltered, the columns must agree. A branch filter can split entries
    /// whose lines carry different branches, so there a mismatch is reported
    /// through `is_balanced` instead of failing.
    ///
    /// # Errors
    ///
    /// Returns `Integrity(TrialBalanceMismatch)` if the unfiltered columns
    /// disagree, or an overflow integrity error if a sum leaves `i64`.
    pub fn trial_balance(
        chart: &ChartOfAccounts,
        lines: &[PostedLine],
        as_of: DateTime<Utc>,
        branch: BranchFilter,
    ) -> Result<TrialBalance, LedgerError> {
        let sums = Self::side_totals(lines, as_of, branch)?;

        let mut accounts = Vec::new();
        let mut total_debit = Money::ZERO;
        let mut total_credit = Money::ZERO;

        for account in chart.accounts().filter(|a| !a.is_header) {
            let balance = sums
                .get(&account.id)
                .copied()
                .unwrap_or_default()
                .balance(account.normal_balance);
            if balance.is_zero() {
                continue;
            }

            let abnormal = balance.is_negative();
            let column = if abnormal {
                account.normal_balance.opposite()
            } else {
                account.normal_balance
            };
            let amount = balance.checked_abs().ok_or_else(|| balance_overflow(account.id))?;
            let (debit_balance, credit_balance) = match column {
                NormalBalance::Debit => (amount, Money::ZERO),
                NormalBalance::Credit => (Money::ZERO, amount),
            };
            let totals_overflow = || {
                tracing::error!(as_of = %as_of, "Trial balance totals overflow");
                LedgerError::from(IntegrityError::TotalsOverflow { as_of })
            };
            total_debit = total_debit.checked_add(debit_balance).ok_or_else(totals_overflow)?;
            total_credit = total_credit.checked_add(credit_balance).ok_or_else(totals_overflow)?;

            accounts.push(TrialBalanceRow {
                account_id: account.id,
                code: account.code.clone(),
                name: account.name.clone(),
                account_type: account.account_type,
                normal_balance: account.normal_balance,
                balance,
                debit_balance,
                credit_balance,
                abnormal,
                is_active: account.is_live(),
            });
        }

        let is_balanced = total_debit == total_credit;
        if !is_balanced {
            match branch {
                BranchFilter::All => {
                    tracing::error!(
                        as_of = %as_of,
                        total_debit = %total_debit,
                        total_credit = %total_credit,
                        accounts = accounts.len(),
                        "Trial balance does not reconcile"
                    );
                    return Err(IntegrityError::TrialBalanceMismatch {
                        as_of,
                        total_debit,
                        total_credit,
                    }
                    .into());
                }
                BranchFilter::Branch(branch_id) => {
                    tracing::warn!(
                        as_of = %as_of,
                        branch_id = %branch_id,
                        total_debit = %total_debit,
                        total_credit = %total_credit,
                        "Branch trial balance does not reconcile"
                    );
                }
            }
        }

        Ok(TrialBalance {
            as_of,
            branch_id: branch.branch_id(),
            accounts,
            total_debit,
            total_credit,
            is_balanced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{PetshopChart, jan};
    use crate::journal::JournalService;
    use petledger_shared::types::{BranchId, UserId};

    fn m(v: i64) -> Money {
        Money::from_minor(v)
    }

    /// E1 (day 1): Dr Cash 100000 / Cr Revenue 100000.
    /// E2 (day 5): Dr Expense 30000 / Cr Cash 30000.
    fn cash_scenario(chart: &PetshopChart) -> Vec<PostedLine> {
        let e1 = chart.posted(1, jan(1), chart.cash, chart.sales, 100_000, None);
        let e2 = chart.posted(2, jan(5), chart.rent, chart.cash, 30_000, None);
        PostedLine::from_entries([&e1, &e2])
    }

    fn trial_balance(
        chart: &PetshopChart,
        lines: &[PostedLine],
        branch: BranchFilter,
    ) -> Result<TrialBalance, LedgerError> {
        LedgerQueryEngine::trial_balance(&chart.chart, lines, jan(31), branch)
    }

    /// Two sales whose cash debits together exceed `i64`, as rows written
    /// before the per-line cap existed could.
    fn overflowing_sales(chart: &PetshopChart) -> Vec<PostedLine> {
        let half = m(i64::MAX / 2 + 1);
        let mut lines = PostedLine::from_entries([
            &chart.posted(1, jan(1), chart.cash, chart.sales, 1, None),
            &chart.posted(2, jan(2), chart.cash, chart.sales, 1, None),
        ]);
        for line in &mut lines {
            if line.debit.is_positive() {
                line.debit = half;
            } else {
                line.credit = half;
            }
        }
        lines
    }

    #[test]
    fn test_cash_ledger_example() {
        let chart = PetshopChart::build();
        let lines = cash_scenario(&chart);
        let cash = chart.chart.get_by_code("1-100").unwrap();

        let ledger = LedgerQueryEngine::account_ledger(
            cash,
            &lines,
            Some(jan(1) - chrono::Duration::days(1)),
            Some(jan(10)),
            BranchFilter::All,
        )
        .unwrap();

        assert_eq!(ledger.opening_balance, Money::ZERO);
        assert_eq!(ledger.transactions.len(), 2);
        assert_eq!(ledger.transactions[0].entry_number, "JE-2026-000001");
        assert_eq!(ledger.transactions[0].running_balance, m(100_000));
        assert_eq!(ledger.transactions[1].entry_number, "JE-2026-000002");
        assert_eq!(ledger.transactions[1].running_balance, m(70_000));
        assert_eq!(ledger.closing_balance, m(70_000));
        assert_eq!(ledger.total_debit, m(100_000));
        assert_eq!(ledger.total_credit, m(30_000));
    }

    #[test]
    fn test_ledger_opening_and_cutoff() {
        let chart = PetshopChart::build();
        let mut entries = vec![
            chart.posted(1, jan(1), chart.cash, chart.sales, 100_000, None),
            chart.posted(2, jan(5), chart.rent, chart.cash, 30_000, None),
        ];
        entries.push(chart.posted(3, jan(20), chart.cash, chart.sales, 5_000, None));
        let lines = PostedLine::from_entries(&entries);
        let cash = chart.chart.get(chart.cash).unwrap();

        let ledger = LedgerQueryEngine::account_ledger(
            cash,
            &lines,
            Some(jan(5)),
            Some(jan(10)),
            BranchFilter::All,
        )
        .unwrap();
        assert_eq!(ledger.opening_balance, m(100_000));
        assert_eq!(ledger.transactions.len(), 1);
        assert_eq!(ledger.closing_balance, m(70_000));
        assert_eq!(ledger.total_debit, Money::ZERO);
        assert_eq!(ledger.total_credit, m(30_000));
    }

    #[test]
    fn test_credit_normal_ledger() {
        let chart = PetshopChart::build();
        let lines = cash_scenario(&chart);
        let sales = chart.chart.get(chart.sales).unwrap();

        let ledger = LedgerQueryEngine::account_ledger(sales, &lines, None, None, BranchFilter::All)
            .unwrap();
        assert_eq!(ledger.closing_balance, m(100_000));
    }

    #[test]
    fn test_invalid_range() {
        let chart = PetshopChart::build();
        let cash = chart.chart.get(chart.cash).unwrap();
        let err = LedgerQueryEngine::account_ledger(
            cash,
            &[],
            Some(jan(10)),
            Some(jan(1)),
            BranchFilter::All,
        );
        assert!(matches!(err, Err(LedgerError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_ledger_orders_same_day_by_number() {
        let chart = PetshopChart::build();
        let late = chart.posted(7, jan(3), chart.cash, chart.sales, 10, None);
        let early = chart.posted(6, jan(3), chart.cash, chart.sales, 20, None);
        let lines = PostedLine::from_entries([&late, &early]);
        let cash = chart.chart.get(chart.cash).unwrap();

        let ledger =
            LedgerQueryEngine::account_ledger(cash, &lines, None, None, BranchFilter::All).unwrap();
        let numbers: Vec<_> =
            ledger.transactions.iter().map(|t| t.entry_number.as_str()).collect();
        assert_eq!(numbers, vec!["JE-2026-000006", "JE-2026-000007"]);
    }

    #[test]
    fn test_branch_filter_keeps_global_lines() {
        let chart = PetshopChart::build();
        let north = BranchId::new();
        let south = BranchId::new();
        let entries = [
            chart.posted(1, jan(1), chart.cash, chart.sales, 100, None),
            chart.posted(2, jan(2), chart.cash, chart.sales, 200, Some(north)),
            chart.posted(3, jan(3), chart.cash, chart.sales, 400, Some(south)),
        ];
        let lines = PostedLine::from_entries(&entries);
        let cash = chart.chart.get(chart.cash).unwrap();

        let balance =
            |filter| LedgerQueryEngine::balance_as_of(cash, &lines, jan(31), filter).unwrap();
        assert_eq!(balance(BranchFilter::All), m(700));
        assert_eq!(balance(BranchFilter::Branch(north)), m(300));
        assert_eq!(balance(BranchFilter::Branch(south)), m(500));
    }

    #[test]
    fn test_balance_as_of_is_inclusive() {
        let chart = PetshopChart::build();
        let lines = cash_scenario(&chart);
        let cash = chart.chart.get(chart.cash).unwrap();
        let balance = |as_of| {
            LedgerQueryEngine::balance_as_of(cash, &lines, as_of, BranchFilter::All).unwrap()
        };
        assert_eq!(balance(jan(5)), m(70_000));
        assert_eq!(balance(jan(4)), m(100_000));
    }

    #[test]
    fn test_void_and_draft_excluded() {
        let chart = PetshopChart::build();
        let actor = UserId::new();
        let mut voided = chart.posted(1, jan(1), chart.cash, chart.sales, 100, None);
        JournalService::void(&mut voided, "Entered twice", actor, jan(2)).unwrap();
        let mut draft = chart.posted(2, jan(1), chart.cash, chart.sales, 50, None);
        draft.status = crate::journal::JournalStatus::Draft;

        let lines = PostedLine::from_entries([&voided, &draft]);
        assert!(lines.is_empty());
        let tb = trial_balance(&chart, &lines, BranchFilter::All).unwrap();
        assert!(tb.accounts.is_empty());
    }

    #[test]
    fn test_trial_balance_columns() {
        let chart = PetshopChart::build();
        let lines = cash_scenario(&chart);
        let tb = trial_balance(&chart, &lines, BranchFilter::All).unwrap();

        let codes: Vec<_> = tb.accounts.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["1-100", "4-100", "5-200"]);
        assert_eq!(tb.accounts[0].debit_balance, m(70_000));
        assert_eq!(tb.accounts[1].credit_balance, m(100_000));
        assert_eq!(tb.accounts[2].debit_balance, m(30_000));
        assert_eq!(tb.total_debit, m(100_000));
        assert_eq!(tb.total_credit, m(100_000));
        assert!(tb.is_balanced);
    }

    #[test]
    fn test_trial_balance_abnormal_balance_kept() {
        let chart = PetshopChart::build();
        // Overdraw cash: Dr Rent 500 / Cr Cash 500 with no prior cash.
        let entry = chart.posted(1, jan(1), chart.rent, chart.cash, 500, None);
        let lines = PostedLine::from_entry(&entry);
        let tb = trial_balance(&chart, &lines, BranchFilter::All).unwrap();

        let cash = tb.accounts.iter().find(|r| r.account_id == chart.cash).unwrap();
        assert!(cash.abnormal);
        assert_eq!(cash.balance, m(-500));
        assert_eq!(cash.debit_balance, Money::ZERO);
        assert_eq!(cash.credit_balance, m(500));
        assert_eq!(tb.total_debit, tb.total_credit);
    }

    #[test]
    fn test_trial_balance_keeps_inactive_accounts_with_balance() {
        let mut chart = PetshopChart::build();
        let lines = cash_scenario(&chart);
        chart.deactivate(chart.rent);

        let tb = trial_balance(&chart, &lines, BranchFilter::All).unwrap();
        let rent = tb.accounts.iter().find(|r| r.account_id == chart.rent).unwrap();
        assert!(!rent.is_active);
        assert!(tb.is_balanced);
    }

    #[test]
    fn test_trial_balance_mismatch_is_integrity_error() {
        let chart = PetshopChart::build();
        let mut lines = cash_scenario(&chart);
        // Corrupt one line as a broken write path would.
        lines[0].debit = m(99_999);

        let err = trial_balance(&chart, &lines, BranchFilter::All).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Integrity(IntegrityError::TrialBalanceMismatch {
                as_of: jan(31),
                total_debit: m(99_999),
                total_credit: m(100_000),
            })
        );
    }

    #[test]
    fn test_branch_trial_balance_split_entry_reports_unbalanced() {
        let chart = PetshopChart::build();
        let north = BranchId::new();
        let south = BranchId::new();
        let mut entry = chart.posted(1, jan(1), chart.cash, chart.sales, 100, None);
        entry.lines[0].branch_id = Some(north);
        entry.lines[1].branch_id = Some(south);
        let lines = PostedLine::from_entry(&entry);

        let tb = trial_balance(&chart, &lines, BranchFilter::Branch(north)).unwrap();
        assert!(!tb.is_balanced);
        assert_eq!(tb.branch_id, Some(north));
    }

    #[test]
    fn test_sum_overflow_is_integrity_error() {
        let chart = PetshopChart::build();
        let lines = overflowing_sales(&chart);
        let cash = chart.chart.get(chart.cash).unwrap();
        let expected = LedgerError::Integrity(IntegrityError::BalanceOverflow {
            account_id: chart.cash,
        });

        let balance = LedgerQueryEngine::balance_as_of(cash, &lines, jan(31), BranchFilter::All);
        assert_eq!(balance, Err(expected.clone()));

        let ledger = LedgerQueryEngine::account_ledger(cash, &lines, None, None, BranchFilter::All);
        assert_eq!(ledger.unwrap_err(), expected);

        let err = trial_balance(&chart, &lines, BranchFilter::All).unwrap_err();
        assert!(err.is_integrity());
    }
}
