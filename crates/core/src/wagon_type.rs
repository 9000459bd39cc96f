//! Wagon type value object.

use core::hash::{Hash, Hasher};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A wagon type name (e.g. "BOXN").
///
/// The original casing is preserved for display, but equality, hashing and
/// lookups are ASCII case-insensitive: one BOM exists per wagon type no
/// matter how operators capitalise it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WagonType(String);

impl WagonType {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("wagonType cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive match against a raw query string (trimmed).
    pub fn matches(&self, query: &str) -> bool {
        self.0.eq_ignore_ascii_case(query.trim())
    }
}

impl PartialEq for WagonType {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for WagonType {}

impl Hash for WagonType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            b.to_ascii_lowercase().hash(state);
        }
    }
}

impl core::fmt::Display for WagonType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WagonType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WagonType> for String {
    fn from(value: WagonType) -> Self {
        value.0
    }
}

impl FromStr for WagonType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_case() {
        let a = WagonType::new("BOXN").unwrap();
        let b = WagonType::new("boxn").unwrap();
        assert_eq!(a, b);
        assert!(a.matches("  Boxn "));
    }

    #[test]
    fn display_keeps_original_casing() {
        let t = WagonType::new(" BoxnHl ").unwrap();
        assert_eq!(t.to_string(), "BoxnHl");
    }
}
