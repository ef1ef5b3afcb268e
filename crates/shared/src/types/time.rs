//! Epoch-millisecond time helpers.
//!
//! All dates crossing the API boundary are Unix-epoch milliseconds (UTC).

use chrono::{DateTime, Utc};

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Converts epoch milliseconds into a UTC timestamp.
///
/// Returns `None` when the value is outside chrono's representable range.
#[must_use]
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Converts a UTC timestamp into epoch milliseconds.
#[must_use]
pub fn to_epoch_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Whole days elapsed from `earlier` to `later`, floored.
///
/// Negative when `earlier` is after `later`.
#[must_use]
pub fn elapsed_days(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later.timestamp_millis() - earlier.timestamp_millis()).div_euclid(MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    #[test]
    fn test_epoch_roundtrip() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(from_epoch_millis(to_epoch_millis(at)), Some(at));
    }

    #[rstest]
    #[case(Duration::zero(), 0)]
    #[case(Duration::hours(23), 0)]
    #[case(Duration::hours(24), 1)]
    #[case(Duration::days(45) + Duration::hours(5), 45)]
    #[case(Duration::hours(-1), -1)]
    fn test_elapsed_days_floors(#[case] gap: Duration, #[case] expected: i64) {
        let earlier = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(elapsed_days(earlier, earlier + gap), expected);
    }
}
