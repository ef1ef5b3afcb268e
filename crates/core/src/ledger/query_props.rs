//! Property-based tests for `LedgerQueryEngine`.
//!
//! - Trial balance equality for any as-of date
//! - Void exclusion
//! - Idempotent account ledger queries
//! - Closing balance agrees with `balance_as_of`

use proptest::prelude::*;

use petledger_shared::types::{Money, UserId};

use super::query::LedgerQueryEngine;
use super::types::{BranchFilter, PostedLine};
use crate::fixtures::{PetshopChart, jan};
use crate::journal::{JournalEntry, JournalService};

/// (day, debit account index, credit account index, amount, voided)
type EntrySpec = (u32, usize, usize, i64, bool);

fn entry_spec() -> impl Strategy<Value = EntrySpec> {
    (1u32..=28, 0usize..9, 0usize..9, 1i64..5_000_000, any::<bool>())
}

fn build_entries(chart: &PetshopChart, specs: &[EntrySpec]) -> Vec<JournalEntry> {
    let details = chart.details();
    specs
        .iter()
        .zip(1i64..)
        .map(|(&(day, debit, credit, amount, voided), seq)| {
            let (debit, credit) = (details[debit], details[credit]);
            let mut entry = chart.posted(seq, jan(day), debit, credit, amount, None);
            if voided {
                JournalService::void(&mut entry, "Generated void", UserId::new(), jan(day))
                    .unwrap();
            }
            entry
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// totalDebit == totalCredit for any as-of date.
    #[test]
    fn prop_trial_balance_equality(
        specs in prop::collection::vec(entry_spec(), 0..30),
        as_of_day in 1u32..=31,
    ) {
        let chart = PetshopChart::build();
        let entries = build_entries(&chart, &specs);
        let lines = PostedLine::from_entries(&entries);

        let tb = LedgerQueryEngine::trial_balance(
            &chart.chart,
            &lines,
            jan(as_of_day),
            BranchFilter::All,
        )
        .unwrap();
        prop_assert_eq!(tb.total_debit, tb.total_credit);
        prop_assert!(tb.is_balanced);
        prop_assert!(tb.accounts.windows(2).all(|w| w[0].code < w[1].code));
    }

    /// Void entries contribute nothing: balances equal those of the
    /// non-void subset.
    #[test]
    fn prop_void_exclusion(specs in prop::collection::vec(entry_spec(), 1..30)) {
        let chart = PetshopChart::build();
        let entries = build_entries(&chart, &specs);
        let live: Vec<EntrySpec> = specs.iter().copied().filter(|s| !s.4).collect();
        let live_entries = build_entries(&chart, &live);

        let all_lines = PostedLine::from_entries(&entries);
        let live_lines = PostedLine::from_entries(&live_entries);

        for id in chart.details() {
            let account = chart.chart.get(id).unwrap();
            let balance = |lines: &[PostedLine]| {
                LedgerQueryEngine::balance_as_of(account, lines, jan(31), BranchFilter::All)
                    .unwrap()
            };
            prop_assert_eq!(balance(&all_lines), balance(&live_lines));
        }

        // Void entries remain intact for retrieval.
        let voided = entries.iter().filter(|e| e.void_reason.is_some()).count();
        prop_assert_eq!(voided, specs.len() - live.len());
        prop_assert!(entries.iter().all(|e| e.lines.len() == 2));
    }

    /// Two identical ledger queries return identical results, and the
    /// closing balance matches `balance_as_of(end)`.
    #[test]
    fn prop_ledger_idempotent_and_consistent(
        specs in prop::collection::vec(entry_spec(), 0..30),
        start_day in 1u32..=15,
        end_day in 15u32..=31,
        account_idx in 0usize..9,
    ) {
        let chart = PetshopChart::build();
        let entries = build_entries(&chart, &specs);
        let lines = PostedLine::from_entries(&entries);
        let account = chart.chart.get(chart.details()[account_idx]).unwrap();

        let (start, end) = (Some(jan(start_day)), Some(jan(end_day)));
        let ledger = || {
            LedgerQueryEngine::account_ledger(account, &lines, start, end, BranchFilter::All)
                .unwrap()
        };
        let first = ledger();
        let second = ledger();
        prop_assert_eq!(&first, &second);

        prop_assert_eq!(
            first.closing_balance,
            LedgerQueryEngine::balance_as_of(account, &lines, jan(end_day), BranchFilter::All)
                .unwrap()
        );
        let window_change: Money = first
            .transactions
            .iter()
            .map(|t| account.normal_balance.balance_change(t.debit, t.credit))
            .sum();
        prop_assert_eq!(first.closing_balance, first.opening_balance + window_change);
    }
}
