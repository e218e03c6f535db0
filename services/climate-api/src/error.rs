//! Mapping of service errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use climate_common::ClimateError;

/// Body sent for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A failed request, tagged with the endpoint that produced it.
#[derive(Debug, Error)]
#[error("{endpoint}: {source}")]
pub struct ApiError {
    pub endpoint: &'static str,
    #[source]
    pub source: ClimateError,
}

impl ApiError {
    pub fn new(endpoint: &'static str, source: ClimateError) -> Self {
        Self { endpoint, source }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.source.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Client errors echo their message; server errors are logged and
        // answered with a generic body.
        let message = if self.source.is_client_error() {
            warn!(endpoint = self.endpoint, error = %self.source, "Rejected request");
            self.source.to_string()
        } else {
            error!(endpoint = self.endpoint, error = %self.source, "Request failed");
            "internal server error".to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
