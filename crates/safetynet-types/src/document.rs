//! The persisted data document.
//!
//! One JSON object with three named sections. Missing or `null` sections
//! read as empty lists; unknown top-level keys are ignored.

use serde::{Deserialize, Serialize};

use crate::records::{FireStation, MedicalRecord, Person, null_as_empty};

/// Top-level shape of the seed and writable data files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDocument {
    /// All persons, in insertion order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub persons: Vec<Person>,
    /// All address-to-station mappings, in insertion order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub firestations: Vec<FireStation>,
    /// All medical records, in insertion order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub medicalrecords: Vec<MedicalRecord>,
}
