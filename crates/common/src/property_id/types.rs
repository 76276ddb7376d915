//! Prefix and identifier value types
//!
//! A property ID is `<PREFIX><COUNTER>`, the counter zero-padded to at least
//! [`COUNTER_WIDTH`] digits. Wider counters are never truncated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of digits in the numeric suffix
pub const COUNTER_WIDTH: usize = 4;

/// Number of trailing epoch-millisecond digits used by fallback IDs
pub const FALLBACK_DIGITS: u32 = 8;

/// Maximum accepted prefix length
const MAX_PREFIX_LEN: usize = 32;

/// Identifier namespace of one entity category, e.g. `RA-COMREPL`
///
/// Restricted to ASCII alphanumerics and `-`, and may not end with a digit;
/// otherwise the prefix would bleed into the counter and could carry pattern
/// metacharacters into store queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyPrefix(String);

impl PropertyPrefix {
    pub fn new(prefix: impl Into<String>) -> Result<Self, String> {
        let prefix = prefix.into();

        if prefix.is_empty() {
            return Err("Property ID prefix cannot be empty".to_string());
        }

        if prefix.len() > MAX_PREFIX_LEN {
            return Err(format!(
                "Property ID prefix too long: {} characters (max {MAX_PREFIX_LEN})",
                prefix.len()
            ));
        }

        if let Some(c) = prefix
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
        {
            return Err(format!(
                "Invalid character {c:?} in property ID prefix {prefix:?}"
            ));
        }

        if prefix.ends_with(|c: char| c.is_ascii_digit()) {
            return Err(format!(
                "Property ID prefix {prefix:?} cannot end with a digit"
            ));
        }

        Ok(Self(prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PropertyPrefix {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PropertyPrefix> for String {
    fn from(prefix: PropertyPrefix) -> Self {
        prefix.0
    }
}

impl fmt::Display for PropertyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a property ID was produced
///
/// Only sequential IDs take part in the counter; a fallback ID must never be
/// read back as the highest counter of its prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    #[default]
    Sequential,
    Fallback,
}

impl IdScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdScheme::Sequential => "sequential",
            IdScheme::Fallback => "fallback",
        }
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(IdScheme::Sequential),
            "fallback" => Ok(IdScheme::Fallback),
            other => Err(format!("Unknown property ID scheme {other:?}")),
        }
    }
}

/// Human-readable listing identifier, tagged with the scheme that made it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct PropertyId {
    value: String,
    scheme: IdScheme,
}

impl PropertyId {
    /// Sequential form: prefix plus counter padded to `COUNTER_WIDTH`
    pub fn sequential(prefix: &PropertyPrefix, counter: u64) -> Self {
        Self {
            value: format!("{prefix}{counter:0width$}", width = COUNTER_WIDTH),
            scheme: IdScheme::Sequential,
        }
    }

    /// Time-derived form used when sequential allocation cannot complete
    pub fn fallback(prefix: &PropertyPrefix, epoch_millis: i64) -> Self {
        let modulus = 10_i64.pow(FALLBACK_DIGITS);
        let digits = epoch_millis.rem_euclid(modulus);
        Self {
            value: format!(
                "{prefix}{digits:0width$}",
                width = FALLBACK_DIGITS as usize
            ),
            scheme: IdScheme::Fallback,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn scheme(&self) -> IdScheme {
        self.scheme
    }
}

impl From<PropertyId> for String {
    fn from(id: PropertyId) -> Self {
        id.value
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for PropertyId {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// Parse the trailing run of ASCII digits of an identifier
///
/// Returns `None` when there are no trailing digits or the value does not fit
/// in a `u64`.
pub fn trailing_counter(id: &str) -> Option<u64> {
    let digits_start = id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx)?;

    id[digits_start..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(p: &str) -> PropertyPrefix {
        PropertyPrefix::new(p).unwrap()
    }

    #[test]
    fn test_prefix_validation() {
        assert!(PropertyPrefix::new("RA-COMREPL").is_ok());
        assert!(PropertyPrefix::new("P").is_ok());

        assert!(PropertyPrefix::new("").is_err());
        assert!(PropertyPrefix::new("RA_COM").is_err());
        assert!(PropertyPrefix::new("RA*").is_err());
        assert!(PropertyPrefix::new("RA[0]").is_err());
        assert!(PropertyPrefix::new("RA%").is_err());
        assert!(PropertyPrefix::new("RA-7").is_err());
        assert!(PropertyPrefix::new("X".repeat(33)).is_err());
    }

    #[test]
    fn test_sequential_ids_pad_to_four_digits() {
        let p = prefix("P");
        assert_eq!(PropertyId::sequential(&p, 1).as_str(), "P0001");
        assert_eq!(PropertyId::sequential(&p, 42).as_str(), "P0042");
        assert_eq!(PropertyId::sequential(&p, 9999).as_str(), "P9999");
    }

    #[test]
    fn test_sequential_ids_grow_past_width() {
        let p = prefix("RA-RESREAP");
        assert_eq!(PropertyId::sequential(&p, 10000).as_str(), "RA-RESREAP10000");
        assert_eq!(
            PropertyId::sequential(&p, 1234567).as_str(),
            "RA-RESREAP1234567"
        );
    }

    #[test]
    fn test_fallback_uses_last_eight_digits() {
        let p = prefix("P");
        assert_eq!(
            PropertyId::fallback(&p, 1_700_000_123_456).as_str(),
            "P00123456"
        );
        assert_eq!(
            PropertyId::fallback(&p, 1_712_345_678_901).as_str(),
            "P45678901"
        );
        assert_eq!(PropertyId::fallback(&p, 7).as_str(), "P00000007");
    }

    #[test]
    fn test_trailing_counter() {
        assert_eq!(trailing_counter("RA-COMREPL0007"), Some(7));
        assert_eq!(trailing_counter("RA-COMREPL10000"), Some(10000));
        assert_eq!(trailing_counter("RA-COMREPL"), None);
        assert_eq!(trailing_counter(""), None);
        assert_eq!(trailing_counter("P99999999999999999999999"), None);
    }

    #[test]
    fn test_ids_carry_their_scheme() {
        let p = prefix("P");
        assert_eq!(PropertyId::sequential(&p, 12).scheme(), IdScheme::Sequential);
        assert_eq!(PropertyId::fallback(&p, 12).scheme(), IdScheme::Fallback);

        assert_eq!("fallback".parse::<IdScheme>(), Ok(IdScheme::Fallback));
        assert_eq!(IdScheme::Sequential.to_string(), "sequential");
        assert!("timestamp".parse::<IdScheme>().is_err());
    }

    #[test]
    fn test_serde_forms() {
        let id = PropertyId::sequential(&prefix("P"), 3);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"P0003\"");

        let p: PropertyPrefix = serde_json::from_str("\"RA-RESPGMN\"").unwrap();
        assert_eq!(p.as_str(), "RA-RESPGMN");
        assert!(serde_json::from_str::<PropertyPrefix>("\"bad prefix\"").is_err());
    }
}
