//! HTTP server lifecycle: bind the configured listener, serve the router,
//! and drain in-flight requests on `Ctrl-C`.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use safetynet_core::ServerSection;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// `host:port` from the configuration is not a socket address.
    #[error("invalid listen address {0}")]
    InvalidAddress(String),

    /// The listener could not bind.
    #[error("bind failed on {addr}: {source}")]
    Bind {
        /// Address the bind was attempted on.
        addr: SocketAddr,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Serving stopped on an I/O error.
    #[error("serve error: {0}")]
    Serve(#[source] io::Error),
}

/// Bind a TCP listener for the `server` section of the configuration.
///
/// # Errors
///
/// [`ServerError::InvalidAddress`] if host and port do not form a socket
/// address, [`ServerError::Bind`] if the bind itself fails.
pub async fn bind(server: &ServerSection) -> Result<TcpListener, ServerError> {
    let text = format!("{}:{}", server.host, server.port);
    let addr: SocketAddr = text.parse().map_err(|_| ServerError::InvalidAddress(text))?;
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve the API on the configured listener until `Ctrl-C`.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or serving fails.
pub async fn start_server(
    server: &ServerSection,
    state: Arc<AppState>,
) -> Result<(), ServerError> {
    let listener = bind(server).await?;
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "SafetyNet server listening");
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("SafetyNet server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C, serving until killed");
        std::future::pending::<()>().await;
    }
}
