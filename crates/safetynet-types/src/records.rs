//! The three persisted record kinds.
//!
//! Field names serialize in camelCase to match the data document and the
//! HTTP payloads. Each record derives [`Validate`] so the API layer can
//! reject structurally valid but unusable payloads (blank names, blank
//! address or station, malformed email) before they reach a store.

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::keys::{AddressKey, NameKey};
use crate::station::StationId;

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

/// A resident known to the dispatch service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Given name. Part of the identity key.
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    /// Family name. Part of the identity key.
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// City name.
    #[serde(default)]
    pub city: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub zip: Option<String>,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Contact email address.
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
}

impl Person {
    /// The case-insensitive identity of this person.
    pub fn key(&self) -> NameKey {
        NameKey::new(&self.first_name, &self.last_name)
    }

    /// `"<first> <last>"` as written in the record.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether this person's address matches `address` case-insensitively.
    pub fn lives_at(&self, address: &AddressKey) -> bool {
        self.address
            .as_deref()
            .is_some_and(|own| AddressKey::new(own) == *address)
    }
}

// ---------------------------------------------------------------------------
// FireStation
// ---------------------------------------------------------------------------

/// Mapping of a single address to the station that covers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct FireStation {
    /// Covered address. The identity key.
    #[validate(custom(function = "not_blank"))]
    pub address: String,
    /// Station covering the address.
    #[validate(custom(function = "station_not_blank"))]
    pub station: StationId,
}

impl FireStation {
    /// The case-insensitive identity of this mapping.
    pub fn key(&self) -> AddressKey {
        AddressKey::new(&self.address)
    }
}

// ---------------------------------------------------------------------------
// MedicalRecord
// ---------------------------------------------------------------------------

/// Medical history linked to a person by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    /// Given name. Part of the identity key.
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    /// Family name. Part of the identity key.
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    /// Birthdate in `MM/dd/yyyy` form.
    #[serde(default)]
    pub birthdate: Option<String>,
    /// Medications, typically `name:dosage`. Never null; absent reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub medications: Vec<String>,
    /// Known allergies. Never null; absent reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub allergies: Vec<String>,
}

impl MedicalRecord {
    /// The case-insensitive identity of this record.
    pub fn key(&self) -> NameKey {
        NameKey::new(&self.first_name, &self.last_name)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accept a JSON `null` list as an empty one.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn station_not_blank(value: &StationId) -> Result<(), ValidationError> {
    if value.is_blank() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn medical_record_null_lists_read_as_empty() {
        let json = r#"{"firstName":"John","lastName":"Boyd","birthdate":"03/06/1984","medications":null}"#;
        let record: MedicalRecord = serde_json::from_str(json).unwrap();
        assert!(record.medications.is_empty());
        assert!(record.allergies.is_empty());

        let out = serde_json::to_value(&record).unwrap();
        assert!(out["medications"].is_array());
        assert!(out["allergies"].is_array());
    }

    #[test]
    fn person_uses_camel_case_fields() {
        let json = r#"{"firstName":"John","lastName":"Boyd","address":"1509 Culver St","city":"Culver","zip":"97451","phone":"841-874-6512","email":"jaboyd@email.com"}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.full_name(), "John Boyd");
        assert!(person.lives_at(&AddressKey::new("1509 culver st")));
        assert!(person.validate().is_ok());
    }

    #[test]
    fn person_with_blank_name_fails_validation() {
        let person = Person {
            first_name: "  ".to_owned(),
            last_name: "Boyd".to_owned(),
            address: None,
            city: None,
            zip: None,
            phone: None,
            email: None,
        };
        assert!(person.validate().is_err());
    }

    #[test]
    fn person_with_malformed_email_fails_validation() {
        let json = r#"{"firstName":"John","lastName":"Boyd","email":"not-an-email"}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert!(person.validate().is_err());
    }

    #[test]
    fn fire_station_requires_station() {
        let json = r#"{"address":"1509 Culver St","station":""}"#;
        let station: FireStation = serde_json::from_str(json).unwrap();
        assert!(station.validate().is_err());

        let json = r#"{"address":"1509 Culver St","station":3}"#;
        let station: FireStation = serde_json::from_str(json).unwrap();
        assert!(station.validate().is_ok());
        assert_eq!(station.station, StationId::new("3"));
    }
}
