//! Line-level validation rules.

use petledger_shared::types::Money;

use super::error::JournalError;
use super::types::{JournalLine, JournalTotals, LineInput};
use crate::accounts::ChartOfAccounts;

/// Largest amount a single line may carry on either side.
pub const MAX_LINE_AMOUNT: Money = Money::from_minor(1_000_000_000_000_000);

/// Most lines one entry may hold.
///
/// Together with [`MAX_LINE_AMOUNT`] this keeps every entry total well inside
/// `i64`.
pub const MAX_LINES: usize = 500;

/// Validates one line: non-negative amounts, exactly one non-zero side, and
/// a postable account.
///
/// # Errors
///
/// Returns the first rule the line breaks.
pub fn validate_line(
    chart: &ChartOfAccounts,
    line_no: u32,
    line: &LineInput,
) -> Result<(), JournalError> {
    validate_amounts(line_no, line.debit, line.credit)?;
    chart
        .validate_for_posting(line.account_id)
        .map_err(|source| JournalError::Account { line_no, source })?;
    Ok(())
}

/// Validates the debit/credit pair of a line.
///
/// # Errors
///
/// Returns `NegativeAmount`, `AmountTooLarge`, `BothSides` or `ZeroAmount`.
pub fn validate_amounts(line_no: u32, debit: Money, credit: Money) -> Result<(), JournalError> {
    if debit.is_negative() || credit.is_negative() {
        return Err(JournalError::NegativeAmount { line_no });
    }
    if debit > MAX_LINE_AMOUNT || credit > MAX_LINE_AMOUNT {
        return Err(JournalError::AmountTooLarge { line_no });
    }
    match (debit.is_zero(), credit.is_zero()) {
        (false, false) => Err(JournalError::BothSides { line_no }),
        (true, true) => Err(JournalError::ZeroAmount { line_no }),
        _ => Ok(()),
    }
}

/// Rejects entries with more than [`MAX_LINES`] lines.
///
/// # Errors
///
/// Returns `TooManyLines`.
pub const fn validate_line_count(count: usize) -> Result<(), JournalError> {
    if count > MAX_LINES {
        Err(JournalError::TooManyLines { max: MAX_LINES })
    } else {
        Ok(())
    }
}

/// Sums the lines, failing instead of wrapping on overflow.
///
/// # Errors
///
/// Returns `AmountOverflow` if either side exceeds `i64`.
pub fn checked_totals(lines: &[JournalLine]) -> Result<JournalTotals, JournalError> {
    let mut debit = Money::ZERO;
    let mut credit = Money::ZERO;
    for line in lines {
        debit = debit.checked_add(line.debit).ok_or(JournalError::AmountOverflow)?;
        credit = credit.checked_add(line.credit).ok_or(JournalError::AmountOverflow)?;
    }
    Ok(JournalTotals {
        debit,
        credit,
        is_balanced: debit == credit,
    })
}

/// Requires debits to equal credits exactly.
///
/// # Errors
///
/// Returns `Unbalanced` with both totals.
pub fn validate_balanced(totals: &JournalTotals) -> Result<(), JournalError> {
    if totals.is_balanced {
        Ok(())
    } else {
        Err(JournalError::Unbalanced {
            debit: totals.debit,
            credit: totals.credit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn m(v: i64) -> Money {
        Money::from_minor(v)
    }

    #[rstest]
    #[case(100, 0, None)]
    #[case(0, 100, None)]
    #[case(100, 100, Some(JournalError::BothSides { line_no: 1 }))]
    #[case(0, 0, Some(JournalError::ZeroAmount { line_no: 1 }))]
    #[case(-5, 0, Some(JournalError::NegativeAmount { line_no: 1 }))]
    #[case(0, -5, Some(JournalError::NegativeAmount { line_no: 1 }))]
    #[case(1_000_000_000_000_000, 0, None)]
    #[case(1_000_000_000_000_001, 0, Some(JournalError::AmountTooLarge { line_no: 1 }))]
    #[case(0, i64::MAX / 2 + 1, Some(JournalError::AmountTooLarge { line_no: 1 }))]
    fn test_validate_amounts(
        #[case] debit: i64,
        #[case] credit: i64,
        #[case] expected: Option<JournalError>,
    ) {
        assert_eq!(validate_amounts(1, m(debit), m(credit)).err(), expected);
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count(MAX_LINES).is_ok());
        assert_eq!(
            validate_line_count(MAX_LINES + 1),
            Err(JournalError::TooManyLines { max: MAX_LINES })
        );
    }

    #[test]
    fn test_validate_balanced() {
        let balanced = JournalTotals {
            debit: m(10),
            credit: m(10),
            is_balanced: true,
        };
        assert!(validate_balanced(&balanced).is_ok());

        let unbalanced = JournalTotals {
            debit: m(10),
            credit: m(7),
            is_balanced: false,
        };
        assert_eq!(
            validate_balanced(&unbalanced),
            Err(JournalError::Unbalanced {
                debit: m(10),
                credit: m(7)
            })
        );
    }
}
