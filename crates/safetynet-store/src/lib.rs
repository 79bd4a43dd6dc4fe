//! Data layer for the SafetyNet alerts service.
//!
//! Each record kind lives in its own [`EntityStore`], an internally
//! synchronized, ordered collection keyed by the record's identity. Every
//! mutation is written through to a single JSON document on disk via the
//! shared [`PersistenceGateway`].
//!
//! # Architecture
//!
//! ```text
//! mutation --> EntityStore<T> --(publish snapshot)--> readers
//!                   |
//!                   +-- save_section --> PersistenceGateway --> SnapshotPort
//!                                                               |-- FileSnapshot
//!                                                               +-- MemorySnapshot
//! ```
//!
//! # Modules
//!
//! - [`entity_store`] -- Generic copy-on-write store with write-through persistence
//! - [`gateway`] -- Document (de)serialization and the abstract snapshot port
//! - [`record`] -- Binding of each record type to its document section
//! - [`stores`] -- The three stores opened together over one gateway
//! - [`error`] -- Shared error types

pub mod entity_store;
pub mod error;
pub mod gateway;
pub mod record;
pub mod stores;

// Re-export primary types for convenience.
pub use entity_store::{
    EntityStore, FireStationStore, MedicalRecordStore, PersonStore, StoreView, UpsertOutcome,
};
pub use error::{PersistError, StoreError};
pub use gateway::{FileSnapshot, MemorySnapshot, PersistenceGateway, SnapshotPort};
pub use record::Record;
pub use stores::{DataStores, ReloadSummary};
