//! Query endpoint handlers.
//!
//! Each handler delegates to the [`QueryEngine`](safetynet_core::QueryEngine)
//! in [`AppState`]. A query that matches nothing answers `200` with an
//! empty result; only a missing or malformed parameter is an error.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/firestation?stationNumber=` | Persons covered by a station |
//! | `GET` | `/flood/stations?stations=` | Households per address for stations |
//! | `GET` | `/fire?address=` | Residents and station for an address |
//! | `GET` | `/childAlert?address=` | Children living at an address |
//! | `GET` | `/phoneAlert?firestation=` | Phone numbers covered by a station |
//! | `GET` | `/personInfo?lastName=` | Person details by last name |
//! | `GET` | `/communityEmail?city=` | Emails of a city's residents |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use safetynet_types::{AddressReport, FloodReport, PersonInfo, StationCoverage, StationId};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{query, station_list};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /firestation`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationNumberQuery {
    /// Station to report on.
    pub station_number: StationId,
}

/// Query parameters for `GET /flood/stations`.
#[derive(Debug, Deserialize)]
pub struct FloodQuery {
    /// Comma-separated integer station numbers.
    pub stations: String,
}

/// Query parameters for the address-based endpoints.
#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    /// Street address.
    pub address: String,
}

/// Query parameters for `GET /phoneAlert`.
#[derive(Debug, Deserialize)]
pub struct PhoneAlertQuery {
    /// Station to report on.
    pub firestation: StationId,
}

/// Query parameters for `GET /personInfo`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastNameQuery {
    /// Family name to match.
    pub last_name: String,
}

/// Query parameters for `GET /communityEmail`.
#[derive(Debug, Deserialize)]
pub struct CityQuery {
    /// City to match.
    pub city: String,
}

// ---------------------------------------------------------------------------
// GET /firestation
// ---------------------------------------------------------------------------

/// Persons covered by a station with adult and child counts.
pub async fn station_coverage(
    State(state): State<Arc<AppState>>,
    params: Result<Query<StationNumberQuery>, QueryRejection>,
) -> Result<Json<StationCoverage>, ApiError> {
    let params = query(params)?;
    Ok(Json(state.engine.coverage_by_station(&params.station_number)))
}

// ---------------------------------------------------------------------------
// GET /flood/stations
// ---------------------------------------------------------------------------

/// Residents grouped by address for every listed station.
pub async fn flood_stations(
    State(state): State<Arc<AppState>>,
    params: Result<Query<FloodQuery>, QueryRejection>,
) -> Result<Json<FloodReport>, ApiError> {
    let params = query(params)?;
    let stations = station_list(&params.stations)?;
    Ok(Json(state.engine.flood_info(&stations)))
}

// ---------------------------------------------------------------------------
// GET /fire
// ---------------------------------------------------------------------------

/// Residents of an address and the station covering it.
pub async fn fire(
    State(state): State<Arc<AppState>>,
    params: Result<Query<AddressQuery>, QueryRejection>,
) -> Result<Json<AddressReport>, ApiError> {
    let params = query(params)?;
    Ok(Json(state.engine.residents_at_address(&params.address)))
}

// ---------------------------------------------------------------------------
// GET /childAlert
// ---------------------------------------------------------------------------

/// Children living at an address with the rest of their household.
pub async fn child_alert(
    State(state): State<Arc<AppState>>,
    params: Result<Query<AddressQuery>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let params = query(params)?;
    Ok(Json(state.engine.children_at_address(&params.address)))
}

// ---------------------------------------------------------------------------
// GET /phoneAlert
// ---------------------------------------------------------------------------

/// Distinct phone numbers of everyone covered by a station.
pub async fn phone_alert(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PhoneAlertQuery>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let params = query(params)?;
    Ok(Json(state.engine.phone_numbers_for_station(&params.firestation)))
}

// ---------------------------------------------------------------------------
// GET /personInfo
// ---------------------------------------------------------------------------

/// Contact and medical details for everyone with a last name.
pub async fn person_info(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LastNameQuery>, QueryRejection>,
) -> Result<Json<Vec<PersonInfo>>, ApiError> {
    let params = query(params)?;
    Ok(Json(state.engine.person_info_by_last_name(&params.last_name)))
}

// ---------------------------------------------------------------------------
// GET /communityEmail
// ---------------------------------------------------------------------------

/// Distinct emails of everyone living in a city.
pub async fn community_email(
    State(state): State<Arc<AppState>>,
    params: Result<Query<CityQuery>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let params = query(params)?;
    Ok(Json(state.engine.emails_by_city(&params.city)))
}
