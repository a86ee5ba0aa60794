//! Migration identifiers.
//!
//! Identifier format: `m<YYYYMMDDHHmm>_<name>`
//!
//! The timestamp is fixed-width, so plain string comparison orders
//! identifiers by creation time. Identifiers are compared verbatim; no case
//! or whitespace normalization is ever applied.

use chrono::NaiveDateTime;
use std::fmt;

/// Leading marker of generated identifiers.
pub const ID_PREFIX: char = 'm';

/// Separator between the timestamp and the name.
pub const ID_SEPARATOR: char = '_';

/// chrono format of the timestamp part.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

/// Number of digits in the timestamp part.
pub const TIMESTAMP_WIDTH: usize = 12;

/// An opaque, totally-ordered migration identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MigrationId(String);

impl MigrationId {
    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the identifier for a migration created at `at`.
    pub fn generate(name: &str, at: NaiveDateTime) -> Self {
        Self(format!(
            "{}{}{}{}",
            ID_PREFIX,
            at.format(TIMESTAMP_FORMAT),
            ID_SEPARATOR,
            name
        ))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The timestamp digits, if the identifier has the generated shape.
    pub fn timestamp(&self) -> Option<&str> {
        self.split().map(|(ts, _)| ts)
    }

    /// The user-supplied name, if the identifier has the generated shape.
    pub fn name(&self) -> Option<&str> {
        self.split().map(|(_, name)| name)
    }

    fn split(&self) -> Option<(&str, &str)> {
        let rest = self.0.strip_prefix(ID_PREFIX)?;
        if rest.len() <= TIMESTAMP_WIDTH || !rest.is_char_boundary(TIMESTAMP_WIDTH) {
            return None;
        }
        let (ts, tail) = rest.split_at(TIMESTAMP_WIDTH);
        if !ts.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let name = tail.strip_prefix(ID_SEPARATOR)?;
        if name.is_empty() {
            return None;
        }
        Some((ts, name))
    }

    /// Consume the identifier, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MigrationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MigrationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MigrationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_generate_format() {
        let id = MigrationId::generate("create_users", at(2024, 3, 7, 9, 5));
        assert_eq!(id.as_str(), "m202403070905_create_users");
        assert_eq!(id.timestamp(), Some("202403070905"));
        assert_eq!(id.name(), Some("create_users"));
    }

    #[test]
    fn test_ordering_follows_creation_time() {
        let older = MigrationId::generate("zeta", at(2023, 12, 31, 23, 59));
        let newer = MigrationId::generate("alpha", at(2024, 1, 1, 0, 0));
        assert!(older < newer);
    }

    #[test]
    fn test_opaque_identifiers() {
        let id = MigrationId::new("legacy-001");
        assert_eq!(id.timestamp(), None);
        assert_eq!(id.name(), None);
        assert_eq!(id.to_string(), "legacy-001");

        assert_eq!(MigrationId::new("m2024_short").timestamp(), None);
        assert_eq!(MigrationId::new("m202401010000_").name(), None);
    }

    #[test]
    fn test_no_normalization() {
        assert_ne!(MigrationId::new("m1"), MigrationId::new("M1"));
        assert_ne!(MigrationId::new("m1"), MigrationId::new("m1 "));
    }
}
