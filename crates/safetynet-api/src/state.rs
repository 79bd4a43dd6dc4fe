//! Shared application state for the HTTP API.
//!
//! [`AppState`] owns the data stores and the query engine reading them.
//! Handlers receive it as `State<Arc<AppState>>`.

use std::sync::Arc;

use safetynet_core::{Clock, QueryEngine, SystemClock};
use safetynet_store::DataStores;

/// State shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Persons, fire station mappings, and medical records.
    pub stores: Arc<DataStores>,
    /// Composite queries over `stores`.
    pub engine: QueryEngine,
}

impl AppState {
    /// Build state over `stores`, computing ages against the local date.
    pub fn new(stores: Arc<DataStores>) -> Self {
        Self::with_clock(stores, Arc::new(SystemClock))
    }

    /// Build state over `stores` with an explicit clock.
    pub fn with_clock(stores: Arc<DataStores>, clock: Arc<dyn Clock>) -> Self {
        let engine = QueryEngine::new(Arc::clone(&stores), clock);
        Self { stores, engine }
    }
}
