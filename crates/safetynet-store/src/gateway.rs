//! Persistence of the data document behind an abstract snapshot port.
//!
//! The gateway owns all (de)serialization. Where the bytes actually live is
//! decided by a [`SnapshotPort`]: [`FileSnapshot`] for the running service,
//! [`MemorySnapshot`] for tests that should not touch a filesystem.
//!
//! All three stores share one document. Writing a section re-reads the
//! current document, swaps in the section, and writes the whole thing back
//! under the gateway's lock, so one store's write never clobbers another's
//! section. When the document on disk is unreadable, the section is merged
//! into the last document the gateway read or wrote successfully; with no
//! such document the write is refused.

use core::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use safetynet_types::DataDocument;
use tracing::{debug, info, warn};

use crate::error::PersistError;
use crate::record::Record;

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Raw byte storage for the data document.
pub trait SnapshotPort: fmt::Debug + Send + Sync {
    /// Make sure a writable snapshot exists, seeding it if necessary.
    ///
    /// Returns `true` when a seed was copied.
    fn ensure_seeded(&self) -> Result<bool, PersistError>;

    /// Read the current snapshot. `None` when there is none.
    fn read(&self) -> Result<Option<Vec<u8>>, PersistError>;

    /// Replace the snapshot with `bytes`.
    fn write(&self, bytes: &[u8]) -> Result<(), PersistError>;
}

/// A read-only seed file copied on first use to a writable location.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    seed_path: PathBuf,
    writable_path: PathBuf,
}

impl FileSnapshot {
    /// Create a file-backed port.
    pub fn new(seed_path: impl Into<PathBuf>, writable_path: impl Into<PathBuf>) -> Self {
        Self {
            seed_path: seed_path.into(),
            writable_path: writable_path.into(),
        }
    }

    /// Location of the writable document.
    pub fn writable_path(&self) -> &Path {
        &self.writable_path
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PersistError {
    PersistError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl SnapshotPort for FileSnapshot {
    fn ensure_seeded(&self) -> Result<bool, PersistError> {
        if self.writable_path.exists() {
            return Ok(false);
        }
        if !self.seed_path.exists() {
            return Err(PersistError::SeedMissing {
                path: self.seed_path.display().to_string(),
            });
        }
        if let Some(parent) = self.writable_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        std::fs::copy(&self.seed_path, &self.writable_path)
            .map_err(|e| io_error(&self.writable_path, e))?;
        info!(
            seed = %self.seed_path.display(),
            target = %self.writable_path.display(),
            "Copied seed data to writable location"
        );
        Ok(true)
    }

    fn read(&self) -> Result<Option<Vec<u8>>, PersistError> {
        match std::fs::read(&self.writable_path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&self.writable_path, e)),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<(), PersistError> {
        // Without a seed nothing created the directory yet.
        if let Some(parent) = self.writable_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        std::fs::write(&self.writable_path, bytes).map_err(|e| io_error(&self.writable_path, e))
    }
}

/// In-memory port for tests.
///
/// Writes can be made to fail on demand to exercise the store's
/// best-effort persistence path.
#[derive(Debug, Default)]
pub struct MemorySnapshot {
    bytes: Mutex<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemorySnapshot {
    /// An empty port with no snapshot at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// A port preloaded with raw bytes, valid JSON or not.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// A port preloaded with a serialized document.
    pub fn with_document(document: &DataDocument) -> Result<Self, PersistError> {
        Ok(Self::with_bytes(serde_json::to_vec(document)?))
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Overwrite the stored bytes, as an external editor would.
    pub fn replace(&self, bytes: impl Into<Vec<u8>>) {
        *self.bytes.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes.into());
    }

    /// Parse the stored bytes back into a document.
    pub fn document(&self) -> Result<Option<DataDocument>, PersistError> {
        let guard = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_deref()
            .map(serde_json::from_slice)
            .transpose()
            .map_err(PersistError::from)
    }
}

impl SnapshotPort for MemorySnapshot {
    fn ensure_seeded(&self) -> Result<bool, PersistError> {
        Ok(false)
    }

    fn read(&self) -> Result<Option<Vec<u8>>, PersistError> {
        Ok(self.bytes.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), PersistError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistError::Io {
                path: "<memory>".to_owned(),
                source: std::io::Error::other("writes disabled"),
            });
        }
        *self.bytes.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Shared (de)serialization layer used by every store.
#[derive(Debug)]
pub struct PersistenceGateway {
    port: Arc<dyn SnapshotPort>,
    /// Last document successfully read or written. Doubles as the lock
    /// serializing every access to the port.
    last_good: Mutex<Option<DataDocument>>,
}

impl PersistenceGateway {
    /// Create a gateway over any snapshot port.
    pub fn new(port: Arc<dyn SnapshotPort>) -> Self {
        Self {
            port,
            last_good: Mutex::new(None),
        }
    }

    /// Create a gateway over a seed file and its writable copy.
    pub fn from_files(seed_path: impl Into<PathBuf>, writable_path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileSnapshot::new(seed_path, writable_path)))
    }

    /// Copy the seed into place if no writable snapshot exists yet.
    ///
    /// Failures are logged, never raised: a store simply starts empty.
    pub fn ensure_seeded(&self) {
        let _guard = self.lock();
        if let Err(e) = self.port.ensure_seeded() {
            tracing::error!(error = %e, "Could not initialize writable data file from seed");
        }
    }

    /// Read and parse the whole document. `None` when no snapshot exists.
    pub fn load_document(&self) -> Result<Option<DataDocument>, PersistError> {
        let mut last_good = self.lock();
        let document = self.read_document()?;
        last_good.clone_from(&document);
        Ok(document)
    }

    /// Read one record type's section. `None` when no snapshot exists.
    pub fn load_section<T: Record>(&self) -> Result<Option<Vec<T>>, PersistError> {
        Ok(self.load_document()?.map(T::take_section))
    }

    /// Overwrite one record type's section, preserving the others.
    ///
    /// An unreadable document is never replaced by one holding only this
    /// section: the other sections come from the last good document, and
    /// without one the write fails and the bytes on disk stay as they are.
    pub fn save_section<T: Record>(&self, records: &[T]) -> Result<(), PersistError> {
        let mut last_good = self.lock();

        let mut document = match self.read_document() {
            Ok(document) => document.unwrap_or_default(),
            Err(e) => {
                let Some(document) = last_good.clone() else {
                    warn!(
                        section = T::SECTION,
                        error = %e,
                        "Data document unreadable, write refused"
                    );
                    return Err(e);
                };
                warn!(
                    section = T::SECTION,
                    error = %e,
                    "Data document unreadable, merging into last good copy"
                );
                document
            }
        };
        T::replace_section(&mut document, records.to_vec());

        let bytes = serde_json::to_vec_pretty(&document)?;
        self.port.write(&bytes)?;
        *last_good = Some(document);
        debug!(section = T::SECTION, count = records.len(), "Section saved");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Option<DataDocument>> {
        self.last_good.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_document(&self) -> Result<Option<DataDocument>, PersistError> {
        self.port
            .read()?
            .map(|bytes| serde_json::from_slice::<DataDocument>(&bytes))
            .transpose()
            .map_err(PersistError::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use safetynet_types::{FireStation, Person, StationId};

    use super::*;

    fn person(first: &str, last: &str) -> Person {
        Person {
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            address: None,
            city: None,
            zip: None,
            phone: None,
            email: None,
        }
    }

    #[test]
    fn save_section_preserves_other_sections() {
        let document = DataDocument {
            firestations: vec![FireStation {
                address: "1509 Culver St".to_owned(),
                station: StationId::new("3"),
            }],
            ..DataDocument::default()
        };
        let port = Arc::new(MemorySnapshot::with_document(&document).unwrap());
        let gateway = PersistenceGateway::new(port.clone());

        gateway.save_section(&[person("John", "Boyd")]).unwrap();

        let saved = port.document().unwrap().unwrap();
        assert_eq!(saved.persons.len(), 1);
        assert_eq!(saved.firestations.len(), 1);
    }

    #[test]
    fn missing_snapshot_loads_as_none() {
        let gateway = PersistenceGateway::new(Arc::new(MemorySnapshot::new()));
        assert!(gateway.load_section::<Person>().unwrap().is_none());
    }

    #[test]
    fn corrupt_snapshot_is_a_parse_error() {
        let gateway = PersistenceGateway::new(Arc::new(MemorySnapshot::with_bytes("{not json")));
        assert!(matches!(
            gateway.load_section::<Person>(),
            Err(PersistError::Json(_))
        ));
    }

    #[test]
    fn save_over_corrupt_snapshot_without_history_is_refused() {
        let port = Arc::new(MemorySnapshot::with_bytes("garbage"));
        let gateway = PersistenceGateway::new(port.clone());
        assert!(matches!(
            gateway.save_section(&[person("Tenley", "Boyd")]),
            Err(PersistError::Json(_))
        ));
        assert_eq!(port.read().unwrap().unwrap(), b"garbage");
    }

    #[test]
    fn save_over_corrupt_snapshot_keeps_last_good_sections() {
        let document = DataDocument {
            persons: vec![person("John", "Boyd")],
            firestations: vec![FireStation {
                address: "1509 Culver St".to_owned(),
                station: StationId::new("3"),
            }],
            ..DataDocument::default()
        };
        let port = Arc::new(MemorySnapshot::with_document(&document).unwrap());
        let gateway = PersistenceGateway::new(port.clone());
        gateway.load_document().unwrap();

        port.replace("{half-written");
        gateway
            .save_section(&[person("John", "Boyd"), person("Tenley", "Boyd")])
            .unwrap();

        let saved = port.document().unwrap().unwrap();
        assert_eq!(saved.persons.len(), 2);
        assert_eq!(saved.firestations.len(), 1);
        assert_eq!(saved.firestations[0].station, StationId::new("3"));
    }

    #[test]
    fn failed_write_is_reported() {
        let port = Arc::new(MemorySnapshot::new());
        port.fail_writes(true);
        let gateway = PersistenceGateway::new(port);
        assert!(matches!(
            gateway.save_section(&[person("John", "Boyd")]),
            Err(PersistError::Io { .. })
        ));
    }
}
