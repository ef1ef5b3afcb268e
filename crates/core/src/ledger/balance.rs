//! Signed balance rules.
//!
//! - Debit-normal accounts (Asset, Expense): balance += debit - credit
//! - Credit-normal accounts (Liability, Equity, Revenue): balance += credit - debit

use petledger_shared::types::Money;
use serde::{Deserialize, Serialize};

/// The side on which an account's balance naturally grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal (Asset, Expense).
    Debit,
    /// Credit-normal (Liability, Equity, Revenue).
    Credit,
}

impl NormalBalance {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses a normal balance from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }

    /// Signed contribution of one line to an account with this normal balance.
    ///
    /// Line amounts are non-negative, so the difference always fits in `i64`.
    #[must_use]
    pub fn balance_change(self, debit: Money, credit: Money) -> Money {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }

    /// The opposite side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

impl std::fmt::Display for NormalBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running balance carried through an account ledger.
///
/// - `current = previous + change`
/// - `previous[N] = current[N-1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Balance before this line.
    pub previous_balance: Money,
    /// Balance after this line.
    pub current_balance: Money,
}

impl RunningBalance {
    /// Starts a running balance from an opening balance.
    #[must_use]
    pub const fn opening(balance: Money) -> Self {
        Self {
            previous_balance: balance,
            current_balance: balance,
        }
    }

    /// Advances the running balance by one line, `None` on overflow.
    #[must_use]
    pub const fn next(self, balance_change: Money) -> Option<Self> {
        match self.current_balance.checked_add(balance_change) {
            Some(current_balance) => Some(Self {
                previous_balance: self.current_balance,
                current_balance,
            }),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn m(v: i64) -> Money {
        Money::from_minor(v)
    }

    #[test]
    fn test_debit_normal_change() {
        assert_eq!(NormalBalance::Debit.balance_change(m(500), m(200)), m(300));
        assert_eq!(NormalBalance::Debit.balance_change(m(0), m(200)), m(-200));
    }

    #[test]
    fn test_credit_normal_change() {
        assert_eq!(NormalBalance::Credit.balance_change(m(500), m(200)), m(-300));
        assert_eq!(NormalBalance::Credit.balance_change(m(0), m(200)), m(200));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(NormalBalance::parse("DEBIT"), Some(NormalBalance::Debit));
        assert_eq!(NormalBalance::parse("credit"), Some(NormalBalance::Credit));
        assert_eq!(NormalBalance::parse("both"), None);
        assert_eq!(NormalBalance::Credit.to_string(), "credit");
        assert_eq!(NormalBalance::Debit.opposite(), NormalBalance::Credit);
    }

    #[test]
    fn test_running_balance_overflow() {
        let rb = RunningBalance::opening(m(i64::MAX - 10));
        assert_eq!(rb.next(m(10)).map(|r| r.current_balance), Some(m(i64::MAX)));
        assert_eq!(rb.next(m(11)), None);
    }

    fn balance_changes_strategy(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
        prop::collection::vec(-1_000_000i64..1_000_000i64, 1..=max_len)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The final running balance equals opening plus every change.
        #[test]
        fn prop_running_balance_chain(
            opening in -1_000_000i64..1_000_000i64,
            changes in balance_changes_strategy(50),
        ) {
            let mut rb = RunningBalance::opening(m(opening));
            for change in &changes {
                let next = rb.next(m(*change)).unwrap();
                prop_assert_eq!(next.previous_balance, rb.current_balance);
                rb = next;
            }
            let expected = opening + changes.iter().sum::<i64>();
            prop_assert_eq!(rb.current_balance, m(expected));
        }

        /// Debit-normal and credit-normal contributions are exact negatives.
        #[test]
        fn prop_sides_are_mirrored(debit in 0i64..1_000_000, credit in 0i64..1_000_000) {
            prop_assert_eq!(
                NormalBalance::Debit.balance_change(m(debit), m(credit)),
                -NormalBalance::Credit.balance_change(m(debit), m(credit))
            );
        }
    }
}
