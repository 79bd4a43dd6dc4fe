//! HTTP API for the SafetyNet alerts service.
//!
//! This crate exposes the dispatch queries and the record mutations over
//! Axum:
//!
//! - **Query endpoints** ([`handlers`]) answering coverage, flood, fire,
//!   child alert, phone alert, person info, and community email requests
//! - **Mutation endpoints** ([`mutations`]) for persons, fire station
//!   mappings, and medical records, plus an admin reload
//!
//! Every mutation is written through to the data file before the response
//! is sent. Errors are answered as `{"error", "status"}` JSON bodies.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod mutations;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use mutations::MutationResponse;
pub use router::build_router;
pub use server::{ServerError, bind, start_server};
pub use state::AppState;
