//! Error types for the climate observation services.

use thiserror::Error;

/// Result type alias using ClimateError.
pub type ClimateResult<T> = Result<T, ClimateError>;

/// Primary error type for climate data operations.
#[derive(Debug, Error)]
pub enum ClimateError {
    // === Request Errors ===
    #[error("Invalid date for '{param}': {message}")]
    InvalidDate { param: String, message: String },

    // === Storage Errors ===
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Corrupt data in store: {0}")]
    CorruptData(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ClimateError {
    /// Short machine-readable label, used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClimateError::InvalidDate { .. } => "bad_input",
            ClimateError::DatabaseError(_) => "database",
            ClimateError::SchemaMismatch(_) => "schema",
            ClimateError::CorruptData(_) => "corrupt_data",
            ClimateError::ConfigError(_) => "config",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ClimateError::InvalidDate { .. } => 400,
            _ => 500,
        }
    }

    /// Whether the error was caused by the client rather than the service.
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }
}
