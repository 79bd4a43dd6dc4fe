//! Request input checks shared by the handlers.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and `Result<Query<T>,
//! QueryRejection>` so that a rejected request is answered with the API's
//! own error body instead of Axum's plain-text default.

use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use safetynet_types::StationId;
use validator::Validate;

use crate::error::ApiError;

/// Unwrap a JSON body and run its validation rules.
pub fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(body) = payload?;
    body.validate()?;
    Ok(body)
}

/// Unwrap query parameters.
pub fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    let Query(params) = params?;
    Ok(params)
}

/// Require a non-blank query parameter.
pub fn required<'a>(name: &str, value: &'a str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidQuery(format!("{name} must not be blank")));
    }
    Ok(value)
}

/// Parse a comma-separated list of integer station numbers.
///
/// A blank list is empty. Any segment that is not an integer rejects the
/// whole list.
pub fn station_list(raw: &str) -> Result<Vec<StationId>, ApiError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|segment| {
            segment
                .trim()
                .parse::<u32>()
                .map(StationId::from)
                .map_err(|e| ApiError::InvalidQuery(format!("invalid station {segment:?}: {e}")))
        })
        .collect()
}
