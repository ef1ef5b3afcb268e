//! Journal entry numbering.
//!
//! Numbers look like `JE-2026-000042`. The sequence value comes from the
//! database; this module only formats and parses.

/// Prefix on every journal number.
pub const PREFIX: &str = "JE";

/// Zero-padded width of the sequence part.
const SEQ_WIDTH: usize = 6;

/// Journal number formatting.
pub struct JournalNumber;

impl JournalNumber {
    /// Formats a journal number for the given year and sequence value.
    #[must_use]
    pub fn format(year: i32, seq: i64) -> String {
        format!("{PREFIX}-{year:04}-{seq:0width$}", width = SEQ_WIDTH)
    }

    /// Splits a journal number into `(year, seq)`.
    #[must_use]
    pub fn parse(number: &str) -> Option<(i32, i64)> {
        let rest = number.strip_prefix(PREFIX)?.strip_prefix('-')?;
        let (year, seq) = rest.split_once('-')?;
        Some((year.parse().ok()?, seq.parse().ok()?))
    }

    /// Re-derives the year prefix of `number`, keeping its sequence value.
    ///
    /// Returns `None` if `number` is not a journal number.
    #[must_use]
    pub fn with_year(number: &str, year: i32) -> Option<String> {
        let (_, seq) = Self::parse(number)?;
        Some(Self::format(year, seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2026, 1, "JE-2026-000001")]
    #[case(2026, 42, "JE-2026-000042")]
    #[case(2027, 1_234_567, "JE-2027-1234567")]
    fn test_format(#[case] year: i32, #[case] seq: i64, #[case] expected: &str) {
        assert_eq!(JournalNumber::format(year, seq), expected);
    }

    #[test]
    fn test_parse() {
        assert_eq!(JournalNumber::parse("JE-2026-000042"), Some((2026, 42)));
        assert_eq!(JournalNumber::parse("PO-2026-000042"), None);
        assert_eq!(JournalNumber::parse("JE-2026"), None);
    }

    #[test]
    fn test_with_year_keeps_sequence() {
        let moved = JournalNumber::with_year("JE-2026-000042", 2027);
        assert_eq!(moved.as_deref(), Some("JE-2027-000042"));
        assert_eq!(JournalNumber::with_year("manual-7", 2027), None);
    }

    #[test]
    fn test_format_sorts_in_sequence_order() {
        let a = JournalNumber::format(2026, 9);
        let b = JournalNumber::format(2026, 10);
        assert!(a < b);
    }
}
