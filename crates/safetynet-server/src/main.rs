//! Server binary for the SafetyNet alerts service.
//!
//! Wires the configuration, the write-through data stores, and the HTTP
//! API together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `safetynet-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Seed the writable data file and open the stores
//! 4. Build the query engine and application state
//! 5. Serve HTTP until shutdown

mod error;

use std::path::Path;
use std::sync::Arc;

use safetynet_api::AppState;
use safetynet_core::config::CONFIG_FILE;
use safetynet_core::{LoggingConfig, ServiceConfig};
use safetynet_store::{DataStores, PersistenceGateway};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Application entry point for the SafetyNet server.
///
/// # Errors
///
/// Returns an error if the configuration file is unreadable or the HTTP
/// server cannot bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so note where it came from.
    let config_path = Path::new(CONFIG_FILE);
    let from_file = config_path.exists();
    let config = ServiceConfig::load_or_default(config_path).map_err(AppError::from)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("safetynet-server starting");
    if from_file {
        info!(path = CONFIG_FILE, "Configuration loaded");
    } else {
        info!("Config file not found, using defaults");
    }
    info!(
        host = config.server.host,
        port = config.server.port,
        seed_path = %config.data.seed_path.display(),
        writable_path = %config.data.writable_path.display(),
        "Effective configuration"
    );

    // 3. Open the stores over the writable copy of the seed.
    let gateway = Arc::new(PersistenceGateway::from_files(
        config.data.seed_path.clone(),
        config.data.writable_path.clone(),
    ));
    let stores = Arc::new(DataStores::open(&gateway));

    // 4. Build application state.
    let state = Arc::new(AppState::new(Arc::clone(&stores)));

    // 5. Serve.
    safetynet_api::start_server(&config.server, state)
        .await
        .map_err(AppError::from)?;

    let failures = stores.persist_failures();
    if failures > 0 {
        tracing::warn!(failures, "Some writes never reached the data file");
    }
    info!("safetynet-server exiting");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
