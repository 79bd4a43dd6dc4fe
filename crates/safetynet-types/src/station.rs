//! Canonical fire station identifier.
//!
//! Station numbers arrive in two shapes: the seed document stores them as
//! JSON strings (`"3"`) while the flood query receives integers. Both are
//! normalized into a single [`StationId`] at the boundary so every lookup
//! compares like with like.

use core::fmt;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a fire station.
///
/// Stored as trimmed text. Equality is case-insensitive so that `"3"`,
/// `" 3 "`, and the integer `3` all name the same station.
#[derive(Debug, Clone, Default)]
pub struct StationId(String);

impl StationId {
    /// Build a station id from raw text, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_owned())
    }

    /// The normalized text form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier carries no text at all.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for StationId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for StationId {}

impl Hash for StationId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for StationId {
    fn from(number: u32) -> Self {
        Self(number.to_string())
    }
}

impl From<&str> for StationId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for StationId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl Serialize for StationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self::new(text),
            Raw::Number(number) => Self(number.to_string()),
        })
    }
}
