//! Serde helper for patch fields that distinguish "absent" from `null`.
//!
//! Used as `#[serde(default, deserialize_with = "nullable::deserialize")]` on
//! an `Option<Option<T>>`: a missing key stays `None`, an explicit `null`
//! becomes `Some(None)`.

use serde::{Deserialize, Deserializer};

/// Deserializes a present value, `null` included, into `Some(..)`.
///
/// # Errors
///
/// Propagates the inner deserializer error.
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::deserialize")]
        parent: Option<Option<u32>>,
    }

    #[test]
    fn test_absent_null_and_value() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.parent, None);

        let cleared: Patch = serde_json::from_str(r#"{"parent": null}"#).unwrap();
        assert_eq!(cleared.parent, Some(None));

        let set: Patch = serde_json::from_str(r#"{"parent": 7}"#).unwrap();
        assert_eq!(set.parent, Some(Some(7)));
    }
}
