//! Identity keys used to decide whether two records denote the same entity.
//!
//! Keys are normalized once (trimmed, lower-cased) at construction so the
//! stores can hash and compare them directly.

use core::fmt;

/// Trim and lower-case a piece of text for identity comparison.
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Case-insensitive, whitespace-trimmed equality of two strings.
pub fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Identity of a person or medical record: the first and last name pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameKey {
    first: String,
    last: String,
}

impl NameKey {
    /// Build a key from a first and last name.
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first: normalize(first_name),
            last: normalize(last_name),
        }
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.first, self.last)
    }
}

/// Identity of a fire station mapping: the covered address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressKey(String);

impl AddressKey {
    /// Build a key from an address.
    pub fn new(address: &str) -> Self {
        Self(normalize(address))
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
