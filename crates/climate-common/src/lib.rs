//! Common types and utilities shared across the climate observation services.

pub mod date;
pub mod error;
pub mod models;

pub use date::{format_date, parse_observation_date, LookbackWindow, DATE_FORMAT, LOOKBACK_DAYS};
pub use error::{ClimateError, ClimateResult};
pub use models::{PrecipitationSeries, Station, TemperatureObservation, TemperatureSummary};
