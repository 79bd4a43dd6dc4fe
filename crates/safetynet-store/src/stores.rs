//! The three entity stores opened together over one gateway.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::entity_store::{FireStationStore, MedicalRecordStore, PersonStore};
use crate::error::StoreError;
use crate::gateway::PersistenceGateway;

/// Record counts after a successful [`DataStores::reload_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReloadSummary {
    /// Persons loaded.
    pub persons: usize,
    /// Fire station mappings loaded.
    pub firestations: usize,
    /// Medical records loaded.
    pub medicalrecords: usize,
}

/// Every store the service operates on.
#[derive(Debug)]
pub struct DataStores {
    /// Persons keyed by name.
    pub persons: PersonStore,
    /// Address-to-station mappings keyed by address.
    pub fire_stations: FireStationStore,
    /// Medical records keyed by name.
    pub medical_records: MedicalRecordStore,
}

impl DataStores {
    /// Open all three stores over a shared gateway.
    ///
    /// The writable snapshot is seeded once, before any store loads.
    pub fn open(gateway: &Arc<PersistenceGateway>) -> Self {
        gateway.ensure_seeded();
        let stores = Self {
            persons: PersonStore::open(Arc::clone(gateway)),
            fire_stations: FireStationStore::open(Arc::clone(gateway)),
            medical_records: MedicalRecordStore::open(Arc::clone(gateway)),
        };
        info!(
            persons = stores.persons.len(),
            firestations = stores.fire_stations.len(),
            medicalrecords = stores.medical_records.len(),
            "Data stores opened"
        );
        stores
    }

    /// Reload every store from the backing document.
    ///
    /// All three are attempted even if one fails; the first failure is
    /// returned.
    pub fn reload_all(&self) -> Result<ReloadSummary, StoreError> {
        let persons = self.persons.reload();
        let firestations = self.fire_stations.reload();
        let medicalrecords = self.medical_records.reload();
        Ok(ReloadSummary {
            persons: persons?,
            firestations: firestations?,
            medicalrecords: medicalrecords?,
        })
    }

    /// Total write-through failures across all stores.
    pub fn persist_failures(&self) -> u64 {
        self.persons
            .persist_failures()
            .saturating_add(self.fire_stations.persist_failures())
            .saturating_add(self.medical_records.persist_failures())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use safetynet_types::{DataDocument, FireStation, Person, StationId};

    use super::*;
    use crate::error::PersistError;
    use crate::gateway::{MemorySnapshot, SnapshotPort};

    /// Counts seeding attempts on top of an in-memory port.
    #[derive(Debug)]
    struct CountingPort {
        inner: MemorySnapshot,
        seeded: AtomicUsize,
    }

    impl SnapshotPort for CountingPort {
        fn ensure_seeded(&self) -> Result<bool, PersistError> {
            self.seeded.fetch_add(1, Ordering::SeqCst);
            self.inner.ensure_seeded()
        }

        fn read(&self) -> Result<Option<Vec<u8>>, PersistError> {
            self.inner.read()
        }

        fn write(&self, bytes: &[u8]) -> Result<(), PersistError> {
            self.inner.write(bytes)
        }
    }

    #[test]
    fn open_seeds_once_for_all_stores() {
        let document = DataDocument {
            firestations: vec![FireStation {
                address: "1509 Culver St".to_owned(),
                station: StationId::new("3"),
            }],
            ..DataDocument::default()
        };
        let port = Arc::new(CountingPort {
            inner: MemorySnapshot::with_document(&document).unwrap(),
            seeded: AtomicUsize::new(0),
        });
        let gateway = Arc::new(PersistenceGateway::new(port.clone()));

        let stores = DataStores::open(&gateway);

        assert_eq!(port.seeded.load(Ordering::SeqCst), 1);
        assert_eq!(stores.fire_stations.len(), 1);
        assert!(stores.persons.is_empty());
    }

    #[test]
    fn corrupt_document_after_open_keeps_sections_through_a_write() {
        let document = DataDocument {
            firestations: vec![FireStation {
                address: "1509 Culver St".to_owned(),
                station: StationId::new("3"),
            }],
            ..DataDocument::default()
        };
        let port = Arc::new(MemorySnapshot::with_document(&document).unwrap());
        let gateway = Arc::new(PersistenceGateway::new(port.clone()));
        let stores = DataStores::open(&gateway);

        port.replace("{half-written");
        stores.persons.upsert(Person {
            first_name: "Tenley".to_owned(),
            last_name: "Boyd".to_owned(),
            address: None,
            city: None,
            zip: None,
            phone: None,
            email: None,
        });

        assert_eq!(port.document().unwrap().unwrap().firestations.len(), 1);
        let summary = stores.reload_all().unwrap();
        assert_eq!(summary.firestations, 1);
        assert_eq!(summary.persons, 1);
    }
}
