//! Generic write-through entity store.
//!
//! An [`EntityStore`] holds the authoritative collection for one record
//! type. Readers take a cheap clone of the current [`Arc`] snapshot and
//! iterate it without holding any lock, so they never observe a collection
//! mid-update. Writers serialize on a per-store mutex, build the next
//! snapshot from a copy, publish it, then persist it while still holding
//! the writer lock so file writes land in mutation order.
//!
//! Persistence is best-effort: a failed write is logged and counted, and
//! the in-memory mutation stands.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use safetynet_types::{FireStation, MedicalRecord, Person};
use tracing::{debug, error, info, warn};

use crate::error::StoreError;
use crate::gateway::PersistenceGateway;
use crate::record::Record;

/// Store of [`Person`] records keyed by name.
pub type PersonStore = EntityStore<Person>;
/// Store of [`FireStation`] mappings keyed by address.
pub type FireStationStore = EntityStore<FireStation>;
/// Store of [`MedicalRecord`]s keyed by name.
pub type MedicalRecordStore = EntityStore<MedicalRecord>;

/// What an [`EntityStore::upsert`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record had this key; the entity was appended.
    Inserted,
    /// A record with this key was replaced in its existing slot.
    Replaced,
}

/// Immutable, ordered view of a store's records plus a key index.
#[derive(Debug)]
struct Snapshot<T: Record> {
    records: Vec<T>,
    index: HashMap<T::Key, usize>,
}

impl<T: Record> Snapshot<T> {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build a snapshot, collapsing duplicate keys: a later record replaces
    /// the earlier one in the earlier one's slot.
    fn from_records(incoming: Vec<T>) -> Self {
        let mut records: Vec<T> = Vec::with_capacity(incoming.len());
        let mut index = HashMap::with_capacity(incoming.len());
        for record in incoming {
            let key = record.key();
            if let Some(slot) = index.get(&key).and_then(|&i| records.get_mut(i)) {
                *slot = record;
            } else {
                index.insert(key, records.len());
                records.push(record);
            }
        }
        Self { records, index }
    }

    fn get(&self, key: &T::Key) -> Option<&T> {
        self.index.get(key).and_then(|&i| self.records.get(i))
    }
}

/// A point-in-time view of one store. Later writes never show through.
#[derive(Debug, Clone)]
pub struct StoreView<T: Record>(Arc<Snapshot<T>>);

impl<T: Record> StoreView<T> {
    /// Every record in store order.
    pub fn records(&self) -> &[T] {
        &self.0.records
    }

    /// The record with this identity key, if any.
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.0.get(key)
    }
}

/// The authoritative in-memory collection for one record type.
#[derive(Debug)]
pub struct EntityStore<T: Record> {
    gateway: Arc<PersistenceGateway>,
    current: RwLock<Arc<Snapshot<T>>>,
    writer: Mutex<()>,
    persist_failures: AtomicU64,
}

impl<T: Record> EntityStore<T> {
    /// Open a store over a gateway, loading this record type's section.
    ///
    /// A missing or unreadable document yields an empty store; the error is
    /// logged, never raised. Seeding is left to the caller
    /// ([`DataStores::open`](crate::DataStores::open) does it once).
    pub fn open(gateway: Arc<PersistenceGateway>) -> Self {
        let records = match gateway.load_section::<T>() {
            Ok(Some(records)) => records,
            Ok(None) => {
                warn!(section = T::SECTION, "No data document found, starting empty");
                Vec::new()
            }
            Err(e) => {
                error!(section = T::SECTION, error = %e, "Failed to load data, starting empty");
                Vec::new()
            }
        };

        let snapshot = Snapshot::from_records(records);
        info!(section = T::SECTION, count = snapshot.records.len(), "Store loaded");

        Self {
            gateway,
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
            persist_failures: AtomicU64::new(0),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Every record in store order, as an owned copy.
    pub fn list_all(&self) -> Vec<T> {
        self.snapshot().records.clone()
    }

    /// The record with this identity key, if any.
    pub fn find_by_key(&self, key: &T::Key) -> Option<T> {
        self.snapshot().get(key).cloned()
    }

    /// Every record matching `predicate`, in store order.
    pub fn find_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.snapshot()
            .records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    /// The current snapshot, without copying any record.
    pub fn view(&self) -> StoreView<T> {
        StoreView(self.snapshot())
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.snapshot().records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.snapshot().records.is_empty()
    }

    /// How many write-throughs have failed since the store was opened.
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert `entity`, or fully replace the record sharing its key.
    ///
    /// Always persists afterward.
    pub fn upsert(&self, entity: T) -> UpsertOutcome {
        let key = entity.key();
        let _writer = self.lock_writer();
        let current = self.snapshot();
        let mut records = current.records.clone();

        let outcome = match current.index.get(&key).and_then(|&i| records.get_mut(i)) {
            Some(slot) => {
                *slot = entity;
                UpsertOutcome::Replaced
            }
            None => {
                records.push(entity);
                UpsertOutcome::Inserted
            }
        };

        self.commit(records);
        debug!(section = T::SECTION, %key, ?outcome, "Record upserted");
        outcome
    }

    /// Replace the record sharing `entity`'s key, returning the previous
    /// record. `None` when no such record exists; nothing is persisted then.
    pub fn update(&self, entity: T) -> Option<T> {
        let key = entity.key();
        let _writer = self.lock_writer();
        let current = self.snapshot();
        let mut records = current.records.clone();

        let Some(slot) = current.index.get(&key).and_then(|&i| records.get_mut(i)) else {
            warn!(section = T::SECTION, %key, "Update target not found");
            return None;
        };
        let previous = std::mem::replace(slot, entity);

        self.commit(records);
        debug!(section = T::SECTION, %key, "Record updated");
        Some(previous)
    }

    /// Edit the record with `key` in place and persist. `false` if absent.
    ///
    /// If the edit changes the record's key the record is re-keyed. On a
    /// collision with another record, whichever comes later in store order
    /// is kept, in the earlier slot.
    pub fn modify(&self, key: &T::Key, edit: impl FnOnce(&mut T)) -> bool {
        let _writer = self.lock_writer();
        let current = self.snapshot();
        let mut records = current.records.clone();

        let Some(slot) = current.index.get(key).and_then(|&i| records.get_mut(i)) else {
            warn!(section = T::SECTION, %key, "Modify target not found");
            return false;
        };
        edit(slot);

        self.commit(records);
        debug!(section = T::SECTION, %key, "Record modified");
        true
    }

    /// Remove the record with `key`. Persists only if something was removed.
    pub fn delete(&self, key: &T::Key) -> bool {
        let _writer = self.lock_writer();
        let current = self.snapshot();
        if !current.index.contains_key(key) {
            warn!(section = T::SECTION, %key, "Delete target not found");
            return false;
        }

        let records: Vec<T> = current
            .records
            .iter()
            .filter(|record| record.key() != *key)
            .cloned()
            .collect();

        self.commit(records);
        info!(section = T::SECTION, %key, "Record deleted");
        true
    }

    /// Discard in-memory state and re-read this section from the document.
    ///
    /// A missing document reloads as empty. An unreadable or corrupt one
    /// leaves the store empty and returns the error.
    pub fn reload(&self) -> Result<usize, StoreError> {
        let _writer = self.lock_writer();
        match self.gateway.load_section::<T>() {
            Ok(records) => {
                let snapshot = Snapshot::from_records(records.unwrap_or_default());
                let count = snapshot.records.len();
                self.publish(snapshot);
                info!(section = T::SECTION, count, "Store reloaded");
                Ok(count)
            }
            Err(source) => {
                self.publish(Snapshot::empty());
                error!(section = T::SECTION, error = %source, "Reload failed, store is now empty");
                Err(StoreError::Reload {
                    section: T::SECTION,
                    source,
                })
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn snapshot(&self) -> Arc<Snapshot<T>> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: Snapshot<T>) -> Arc<Snapshot<T>> {
        let snapshot = Arc::new(snapshot);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        snapshot
    }

    /// Publish `records` as the new snapshot, then write them through.
    /// Caller must hold the writer lock.
    fn commit(&self, records: Vec<T>) {
        let snapshot = self.publish(Snapshot::from_records(records));
        if let Err(e) = self.gateway.save_section(&snapshot.records) {
            self.persist_failures.fetch_add(1, Ordering::Relaxed);
            error!(
                section = T::SECTION,
                error = %e,
                "Failed to persist data, in-memory state remains authoritative"
            );
        }
    }
}
