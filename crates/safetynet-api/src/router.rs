//! Axum router construction for the SafetyNet API.
//!
//! Assembles the query and mutation routes into a single [`Router`] with
//! CORS and request tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::mutations;
use crate::state::AppState;

/// Build the complete Axum router for the SafetyNet server.
///
/// The router includes:
/// - `GET|POST|PUT|DELETE /firestation` -- coverage query and mapping CRUD
/// - `GET /flood/stations` -- households by address for stations
/// - `GET /fire` -- residents and station for an address
/// - `GET /childAlert` -- children at an address
/// - `GET /phoneAlert` -- phone numbers covered by a station
/// - `GET /personInfo` -- person details by last name
/// - `GET /communityEmail` -- emails for a city
/// - `POST|PUT|DELETE /person` -- person CRUD
/// - `POST|PUT|DELETE /medicalRecord` -- medical record CRUD
/// - `POST /admin/reload` -- reload every store from disk
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Queries
        .route(
            "/firestation",
            get(handlers::station_coverage)
                .post(mutations::add_fire_station)
                .put(mutations::update_fire_station)
                .delete(mutations::delete_fire_station),
        )
        .route("/flood/stations", get(handlers::flood_stations))
        .route("/fire", get(handlers::fire))
        .route("/childAlert", get(handlers::child_alert))
        .route("/phoneAlert", get(handlers::phone_alert))
        .route("/personInfo", get(handlers::person_info))
        .route("/communityEmail", get(handlers::community_email))
        // Mutations
        .route(
            "/person",
            post(mutations::add_person)
                .put(mutations::update_person)
                .delete(mutations::delete_person),
        )
        .route(
            "/medicalRecord",
            post(mutations::add_medical_record)
                .put(mutations::update_medical_record)
                .delete(mutations::delete_medical_record),
        )
        // Admin
        .route("/admin/reload", post(mutations::reload))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
