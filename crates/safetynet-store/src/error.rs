//! Error types for the data layer.
//!
//! [`PersistError`] covers everything that can go wrong between a store and
//! its backing document. Stores contain these errors (logging them) except
//! on an explicit reload, which surfaces them as [`StoreError`].

/// Errors raised while reading, seeding, or writing the data document.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// A filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document could not be parsed or serialized.
    #[error("invalid data document: {0}")]
    Json(#[from] serde_json::Error),

    /// The writable file is absent and there is no seed to copy from.
    #[error("seed file not found: {path}")]
    SeedMissing {
        /// The seed path that was looked up.
        path: String,
    },
}

/// Errors surfaced to callers of a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reloading a section from its backing document failed.
    #[error("failed to reload {section}: {source}")]
    Reload {
        /// The document section being reloaded.
        section: &'static str,
        /// What went wrong underneath.
        #[source]
        source: PersistError,
    },
}
