//! Query and configuration layer for the SafetyNet alerts service.
//!
//! - [`age`] turns stored birthdates into ages against an injectable clock.
//! - [`query`] answers the composite dispatch queries over the data stores.
//! - [`config`] loads `safetynet-config.yaml` with environment overrides.

pub mod age;
pub mod config;
pub mod query;

pub use age::{AgeGroup, Clock, FixedClock, SystemClock, UNKNOWN_AGE, age_from_birthdate, age_on};
pub use config::{ConfigError, DataConfig, LoggingConfig, ServerSection, ServiceConfig};
pub use query::QueryEngine;
