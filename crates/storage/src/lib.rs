//! Storage access for the climate observation services.
//!
//! Provides:
//! - A pooled, read-only SQLite store
//! - Per-request sessions that own one pooled connection
//! - Static table declarations checked against the live database at startup

pub mod schema;
pub mod store;

pub use schema::{TableDef, MEASUREMENT, STATION, TABLES};
pub use store::{ClimateStore, StationActivity, StoreOptions, StoreSession};
