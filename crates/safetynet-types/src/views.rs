//! Result shapes produced by the query layer.
//!
//! These are projections, never stored. Field names serialize in camelCase
//! to match the wire format the dispatch clients expect.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::station::StationId;

/// Sentinel emitted when an address has no station mapping.
const NOT_APPLICABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Coverage by station
// ---------------------------------------------------------------------------

/// A person covered by a station. Carries no medical fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoveredPerson {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Street address.
    pub address: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
}

/// Everyone covered by one station, with adult and child head counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationCoverage {
    /// Covered persons in store order.
    pub persons: Vec<CoveredPerson>,
    /// Persons older than 18.
    pub adult_count: u32,
    /// Persons aged 0 through 18 inclusive.
    pub child_count: u32,
}

// ---------------------------------------------------------------------------
// Flood
// ---------------------------------------------------------------------------

/// A resident listed by the flood query.
///
/// Medical fields are omitted entirely when no medical record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodResident {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Age in whole years, `-1` for an unreadable birthdate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    /// Current medications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<Vec<String>>,
    /// Known allergies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
}

/// Residents grouped by address, ordered by address.
pub type FloodReport = BTreeMap<String, Vec<FloodResident>>;

// ---------------------------------------------------------------------------
// Residents at an address
// ---------------------------------------------------------------------------

/// A resident listed by the address query.
///
/// `age` is `null` and the lists are empty when no medical record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Age in whole years, `-1` for an unreadable birthdate.
    pub age: Option<i32>,
    /// Current medications.
    pub medications: Vec<String>,
    /// Known allergies.
    pub allergies: Vec<String>,
}

/// Station responsible for an address, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationAssignment {
    /// The address is mapped to this station.
    Assigned(StationId),
    /// No mapping exists. Serialized as `"N/A"`.
    NotApplicable,
}

impl Serialize for StationAssignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Assigned(station) => station.serialize(serializer),
            Self::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl<'de> Deserialize<'de> for StationAssignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let station = StationId::deserialize(deserializer)?;
        if station.as_str() == NOT_APPLICABLE {
            Ok(Self::NotApplicable)
        } else {
            Ok(Self::Assigned(station))
        }
    }
}

/// Everyone living at one address plus the station covering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressReport {
    /// Covering station, or `"N/A"`.
    #[serde(rename = "firestationNumber")]
    pub station: StationAssignment,
    /// Residents in store order.
    pub residents: Vec<Resident>,
}

// ---------------------------------------------------------------------------
// Person info
// ---------------------------------------------------------------------------

/// Contact and medical summary for a person looked up by last name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInfo {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Street address.
    pub address: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Age in whole years; `null` without a medical record.
    pub age: Option<i32>,
    /// Current medications.
    pub medications: Vec<String>,
    /// Known allergies.
    pub allergies: Vec<String>,
}
