//! Mutation endpoint handlers.
//!
//! Bodies are validated before any store is touched, so a rejected request
//! leaves every store unchanged. Each successful mutation has already been
//! written through to the data file when the response is sent. Store calls
//! run on the blocking pool since every write ends in file I/O.
//!
//! # Endpoints
//!
//! | Method | Path | Outcome |
//! |--------|------|---------|
//! | `POST` | `/person` | 201 |
//! | `PUT` | `/person` | 200 / 404 |
//! | `DELETE` | `/person?firstName=&lastName=` | 200 / 404 |
//! | `POST` | `/firestation` | 201 |
//! | `PUT` | `/firestation?address=&station=` | 200 / 404 |
//! | `DELETE` | `/firestation?address=` | 200 / 404 |
//! | `POST` | `/medicalRecord` | 201 |
//! | `PUT` | `/medicalRecord` | 200 |
//! | `DELETE` | `/medicalRecord?firstName=&lastName=` | 200 |
//! | `POST` | `/admin/reload` | 200 / 500 |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use safetynet_store::{DataStores, ReloadSummary};
use safetynet_types::{AddressKey, FireStation, MedicalRecord, NameKey, Person, StationId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::extract::{query, required, validated};
use crate::state::AppState;

/// Response body for mutation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Whether the mutation changed anything.
    pub ok: bool,
    /// Human-readable message.
    pub message: String,
}

impl MutationResponse {
    fn done(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            ok: true,
            message: message.into(),
        })
    }
}

/// A mutation answered with its status code.
type Mutation = Result<(StatusCode, Json<MutationResponse>), ApiError>;

/// Run `work` against the stores on the blocking pool.
async fn on_stores<R, F>(state: &AppState, work: F) -> Result<R, ApiError>
where
    F: FnOnce(&DataStores) -> R + Send + 'static,
    R: Send + 'static,
{
    let stores = Arc::clone(&state.stores);
    Ok(tokio::task::spawn_blocking(move || work(&stores)).await?)
}

/// Query parameters naming a person or medical record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameQuery {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl NameQuery {
    fn key(&self) -> NameKey {
        NameKey::new(&self.first_name, &self.last_name)
    }

    fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Query parameters for `PUT /firestation`.
#[derive(Debug, Deserialize)]
pub struct StationUpdateQuery {
    /// Address whose mapping changes.
    pub address: String,
    /// New station for the address.
    pub station: StationId,
}

/// Query parameters for `DELETE /firestation`.
#[derive(Debug, Deserialize)]
pub struct StationDeleteQuery {
    /// Address whose mapping is removed.
    pub address: String,
}

// ---------------------------------------------------------------------------
// /person
// ---------------------------------------------------------------------------

/// Add a person, replacing any person with the same name.
pub async fn add_person(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Person>, JsonRejection>,
) -> Mutation {
    let person = validated(payload)?;
    let name = person.full_name();
    let outcome = on_stores(&state, move |stores| stores.persons.upsert(person)).await?;
    info!(%name, ?outcome, "Person added");
    Ok((StatusCode::CREATED, MutationResponse::done(format!("Person {name} added"))))
}

/// Replace an existing person's details.
pub async fn update_person(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Person>, JsonRejection>,
) -> Mutation {
    let person = validated(payload)?;
    let name = person.full_name();
    let previous = on_stores(&state, move |stores| stores.persons.update(person)).await?;
    if previous.is_none() {
        return Err(ApiError::NotFound(format!("person {name} not found")));
    }
    info!(%name, "Person updated");
    Ok((StatusCode::OK, MutationResponse::done(format!("Person {name} updated"))))
}

/// Remove a person by name.
pub async fn delete_person(
    State(state): State<Arc<AppState>>,
    params: Result<Query<NameQuery>, QueryRejection>,
) -> Mutation {
    let params = query(params)?;
    let name = params.full_name();
    let key = params.key();
    if !on_stores(&state, move |stores| stores.persons.delete(&key)).await? {
        return Err(ApiError::NotFound(format!("person {name} not found")));
    }
    Ok((StatusCode::OK, MutationResponse::done(format!("Person {name} deleted"))))
}

// ---------------------------------------------------------------------------
// /firestation
// ---------------------------------------------------------------------------

/// Map an address to a station, replacing any existing mapping.
pub async fn add_fire_station(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FireStation>, JsonRejection>,
) -> Mutation {
    let mapping = validated(payload)?;
    let message = format!("Address {} mapped to station {}", mapping.address, mapping.station);
    let outcome = on_stores(&state, move |stores| stores.fire_stations.upsert(mapping)).await?;
    info!(?outcome, "{message}");
    Ok((StatusCode::CREATED, MutationResponse::done(message)))
}

/// Change the station serving an already mapped address.
pub async fn update_fire_station(
    State(state): State<Arc<AppState>>,
    params: Result<Query<StationUpdateQuery>, QueryRejection>,
) -> Mutation {
    let params = query(params)?;
    let address = required("address", &params.address)?;
    if params.station.is_blank() {
        return Err(ApiError::InvalidQuery("station must not be blank".to_owned()));
    }

    let key = AddressKey::new(address);
    let station = params.station.clone();
    let updated = on_stores(&state, move |stores| {
        stores.fire_stations.modify(&key, |mapping| mapping.station = station)
    })
    .await?;
    if !updated {
        return Err(ApiError::NotFound(format!("no mapping for address {address}")));
    }
    info!(address, station = %params.station, "Fire station mapping updated");
    Ok((
        StatusCode::OK,
        MutationResponse::done(format!(
            "Address {address} now served by station {}",
            params.station
        )),
    ))
}

/// Remove an address mapping.
pub async fn delete_fire_station(
    State(state): State<Arc<AppState>>,
    params: Result<Query<StationDeleteQuery>, QueryRejection>,
) -> Mutation {
    let params = query(params)?;
    let address = required("address", &params.address)?;
    let key = AddressKey::new(address);
    if !on_stores(&state, move |stores| stores.fire_stations.delete(&key)).await? {
        return Err(ApiError::NotFound(format!("no mapping for address {address}")));
    }
    Ok((
        StatusCode::OK,
        MutationResponse::done(format!("Mapping for {address} deleted")),
    ))
}

// ---------------------------------------------------------------------------
// /medicalRecord
// ---------------------------------------------------------------------------

/// Add a medical record, replacing any record with the same name.
pub async fn add_medical_record(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MedicalRecord>, JsonRejection>,
) -> Mutation {
    let record = validated(payload)?;
    let name = format!("{} {}", record.first_name, record.last_name);
    let outcome = on_stores(&state, move |stores| stores.medical_records.upsert(record)).await?;
    info!(%name, ?outcome, "Medical record added");
    Ok((
        StatusCode::CREATED,
        MutationResponse::done(format!("Medical record for {name} added")),
    ))
}

/// Store a medical record, inserting it if none exists.
pub async fn update_medical_record(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MedicalRecord>, JsonRejection>,
) -> Mutation {
    let record = validated(payload)?;
    let name = format!("{} {}", record.first_name, record.last_name);
    let outcome = on_stores(&state, move |stores| stores.medical_records.upsert(record)).await?;
    info!(%name, ?outcome, "Medical record updated");
    Ok((
        StatusCode::OK,
        MutationResponse::done(format!("Medical record for {name} updated")),
    ))
}

/// Remove a medical record. A missing record is logged, not an error.
pub async fn delete_medical_record(
    State(state): State<Arc<AppState>>,
    params: Result<Query<NameQuery>, QueryRejection>,
) -> Mutation {
    let params = query(params)?;
    let name = params.full_name();
    let key = params.key();
    let deleted = on_stores(&state, move |stores| stores.medical_records.delete(&key)).await?;
    let response = if deleted {
        MutationResponse::done(format!("Medical record for {name} deleted"))
    } else {
        warn!(%name, "Medical record to delete did not exist");
        Json(MutationResponse {
            ok: false,
            message: format!("No medical record for {name}"),
        })
    };
    Ok((StatusCode::OK, response))
}

// ---------------------------------------------------------------------------
// POST /admin/reload
// ---------------------------------------------------------------------------

/// Discard in-memory state and reload every store from the data file.
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<ReloadSummary>, ApiError> {
    let summary = on_stores(&state, DataStores::reload_all).await??;
    info!(
        persons = summary.persons,
        firestations = summary.firestations,
        medicalrecords = summary.medicalrecords,
        "Stores reloaded"
    );
    Ok(Json(summary))
}
