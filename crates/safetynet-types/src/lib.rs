//! Shared type definitions for the SafetyNet alerts service.
//!
//! Every crate in the workspace speaks in these types: the three record
//! kinds that are persisted, the identity keys that link them, and the
//! read-only views produced by the query layer.
//!
//! # Modules
//!
//! - [`station`] -- Canonical fire station identifier
//! - [`keys`] -- Case-insensitive identity keys for records
//! - [`records`] -- `Person`, `FireStation`, and `MedicalRecord`
//! - [`document`] -- The persisted three-section data document
//! - [`views`] -- Result shapes returned by composite queries

pub mod document;
pub mod keys;
pub mod records;
pub mod station;
pub mod views;

// Re-export all public types at crate root for convenience.
pub use document::DataDocument;
pub use keys::{AddressKey, NameKey, same_text};
pub use records::{FireStation, MedicalRecord, Person};
pub use station::StationId;
pub use views::{
    AddressReport, CoveredPerson, FloodReport, FloodResident, PersonInfo, Resident,
    StationAssignment, StationCoverage,
};
