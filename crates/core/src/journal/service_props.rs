//! Property-based tests for `JournalService`.
//!
//! - Posting succeeds exactly when debits equal credits
//! - A posted entry always satisfies Σdebit == Σcredit

use proptest::prelude::*;

use chrono::Utc;
use petledger_shared::types::{JournalEntryId, Money, UserId};

use super::error::JournalError;
use super::service::JournalService;
use super::types::{JournalStatus, LineInput, NewJournalEntry};
use crate::fixtures::{PetshopChart, jan};

/// Strategy for a line amount in minor units.
fn amount() -> impl Strategy<Value = i64> {
    1i64..10_000_000
}

/// Strategy for a list of (is_debit, amount) pairs.
fn sides(max_len: usize) -> impl Strategy<Value = Vec<(bool, i64)>> {
    prop::collection::vec((any::<bool>(), amount()), 1..=max_len)
}

fn build_input(chart: &PetshopChart, sides: &[(bool, i64)]) -> NewJournalEntry {
    let details = chart.details();
    let lines = sides
        .iter()
        .enumerate()
        .map(|(i, &(is_debit, value))| {
            let account = details[i % details.len()];
            if is_debit {
                LineInput::debit(account, Money::from_minor(value))
            } else {
                LineInput::credit(account, Money::from_minor(value))
            }
        })
        .collect();
    NewJournalEntry {
        date: jan(15),
        description: "Generated".to_string(),
        branch_id: None,
        lines,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Posting succeeds iff Σdebit == Σcredit; failure reports both totals.
    #[test]
    fn prop_post_iff_balanced(sides in sides(12)) {
        let chart = PetshopChart::build();
        let debit: i64 = sides.iter().filter(|s| s.0).map(|s| s.1).sum();
        let credit: i64 = sides.iter().filter(|s| !s.0).map(|s| s.1).sum();

        let mut entry = JournalService::create_draft(
            &chart.chart,
            JournalEntryId::new(),
            "JE-2026-000001".to_string(),
            build_input(&chart, &sides),
            UserId::new(),
            Utc::now(),
        ).unwrap();

        let result = JournalService::post(&mut entry, &chart.chart, UserId::new(), Utc::now());
        if debit == credit {
            prop_assert!(result.is_ok());
            prop_assert_eq!(entry.status, JournalStatus::Posted);
        } else {
            prop_assert_eq!(
                result,
                Err(JournalError::Unbalanced {
                    debit: Money::from_minor(debit),
                    credit: Money::from_minor(credit),
                })
            );
            prop_assert_eq!(entry.status, JournalStatus::Draft);
        }
    }

    /// Balanced line sets always post, and the posted totals match.
    #[test]
    fn prop_balanced_always_posts(debits in prop::collection::vec(amount(), 1..8)) {
        let chart = PetshopChart::build();
        let total: i64 = debits.iter().sum();
        let mut sides: Vec<(bool, i64)> = debits.iter().map(|&d| (true, d)).collect();
        sides.push((false, total));

        let entry = JournalService::create_posted(
            &chart.chart,
            JournalEntryId::new(),
            "JE-2026-000001".to_string(),
            build_input(&chart, &sides),
            UserId::new(),
            Utc::now(),
        ).unwrap();

        let totals = entry.totals().unwrap();
        prop_assert!(totals.is_balanced);
        prop_assert_eq!(totals.debit, Money::from_minor(total));
    }

    /// Line numbers are contiguous from 1 in input order.
    #[test]
    fn prop_line_numbers_contiguous(sides in sides(12)) {
        let chart = PetshopChart::build();
        let entry = JournalService::create_draft(
            &chart.chart,
            JournalEntryId::new(),
            "JE-2026-000001".to_string(),
            build_input(&chart, &sides),
            UserId::new(),
            Utc::now(),
        ).unwrap();

        let numbers: Vec<u32> = entry.lines.iter().map(|l| l.line_no).collect();
        let expected: Vec<u32> = (1..=u32::try_from(sides.len()).unwrap()).collect();
        prop_assert_eq!(numbers, expected);
    }
}
