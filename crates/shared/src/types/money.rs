//! Money type in integer minor currency units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are whole minor units (e.g. cents, or rupiah) so the double-entry
//! balance check is exact.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A monetary amount in minor currency units.
///
/// Serializes as a bare integer. The operators panic on overflow in debug
/// builds; aggregations over stored amounts use the `checked_*` methods.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Absolute value, `None` for `i64::MIN`.
    #[must_use]
    pub const fn checked_abs(self) -> Option<Self> {
        match self.0.checked_abs() {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked addition, `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction, `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Sums `amounts`, `None` if any partial sum overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Self>) -> Option<Self> {
        amounts.into_iter().try_fold(Self::ZERO, Self::checked_add)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Self(minor)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_zero() {
        assert!(Money::ZERO.is_zero());
        assert_eq!(Money::default(), Money::ZERO);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_minor(100_000);
        let b = Money::from_minor(30_000);
        assert_eq!(a - b, Money::from_minor(70_000));
        assert_eq!(a + b, Money::from_minor(130_000));
        assert_eq!(-(b - a), Money::from_minor(70_000));
    }

    #[test]
    fn test_money_sign() {
        assert!(Money::from_minor(-1).is_negative());
        assert!(Money::from_minor(1).is_positive());
        let refund = Money::from_minor(-250);
        assert_eq!(refund.checked_abs(), Some(Money::from_minor(250)));
        assert_eq!(Money::from_minor(i64::MIN).checked_abs(), None);
    }

    #[test]
    fn test_money_sum() {
        let amounts = [Money::from_minor(1), Money::from_minor(2), Money::from_minor(3)];
        assert_eq!(amounts.iter().sum::<Money>(), Money::from_minor(6));
        assert_eq!(amounts.into_iter().sum::<Money>(), Money::from_minor(6));
        assert_eq!(Money::checked_sum(amounts), Some(Money::from_minor(6)));
    }

    #[test]
    fn test_money_checked_overflow() {
        let max = Money::from_minor(i64::MAX);
        assert_eq!(max.checked_add(Money::from_minor(1)), None);
        let min = Money::from_minor(i64::MIN);
        assert_eq!(min.checked_sub(Money::from_minor(1)), None);

        let half = Money::from_minor(i64::MAX / 2 + 1);
        assert_eq!(Money::checked_sum([half, half]), None);
        assert_eq!(Money::checked_sum([]), Some(Money::ZERO));
    }

    #[test]
    fn test_money_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_minor(500_000)).unwrap();
        assert_eq!(json, "500000");
        let parsed: Money = serde_json::from_str("-42").unwrap();
        assert_eq!(parsed.minor(), -42);
    }
}
