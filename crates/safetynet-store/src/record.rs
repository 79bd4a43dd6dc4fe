//! Binding of each record type to its identity key and document section.

use core::fmt;
use core::hash::Hash;

use safetynet_types::{AddressKey, DataDocument, FireStation, MedicalRecord, NameKey, Person};

/// A record type that can live in an [`EntityStore`](crate::EntityStore).
pub trait Record: Clone + fmt::Debug + Send + Sync + 'static {
    /// Case-insensitive identity of a record.
    type Key: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync;

    /// Name of the document section holding these records.
    const SECTION: &'static str;

    /// Compute this record's identity key.
    fn key(&self) -> Self::Key;

    /// Move this record type's section out of a document.
    fn take_section(document: DataDocument) -> Vec<Self>;

    /// Overwrite this record type's section in a document.
    fn replace_section(document: &mut DataDocument, records: Vec<Self>);
}

impl Record for Person {
    type Key = NameKey;
    const SECTION: &'static str = "persons";

    fn key(&self) -> NameKey {
        Self::key(self)
    }

    fn take_section(document: DataDocument) -> Vec<Self> {
        document.persons
    }

    fn replace_section(document: &mut DataDocument, records: Vec<Self>) {
        document.persons = records;
    }
}

impl Record for FireStation {
    type Key = AddressKey;
    const SECTION: &'static str = "firestations";

    fn key(&self) -> AddressKey {
        Self::key(self)
    }

    fn take_section(document: DataDocument) -> Vec<Self> {
        document.firestations
    }

    fn replace_section(document: &mut DataDocument, records: Vec<Self>) {
        document.firestations = records;
    }
}

impl Record for MedicalRecord {
    type Key = NameKey;
    const SECTION: &'static str = "medicalrecords";

    fn key(&self) -> NameKey {
        Self::key(self)
    }

    fn take_section(document: DataDocument) -> Vec<Self> {
        document.medicalrecords
    }

    fn replace_section(document: &mut DataDocument, records: Vec<Self>) {
        document.medicalrecords = records;
    }
}
