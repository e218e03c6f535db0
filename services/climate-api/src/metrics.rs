//! Request metrics.
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! (as in tests) every call is a no-op.

use std::time::Instant;

use metrics::{counter, histogram};

use climate_common::ClimateResult;

use crate::error::ApiError;

/// Tracks one request to a data endpoint.
pub struct RequestMetrics {
    endpoint: &'static str,
    started: Instant,
}

impl RequestMetrics {
    pub fn start(endpoint: &'static str) -> Self {
        counter!("climate_api_requests_total", "endpoint" => endpoint).increment(1);
        Self {
            endpoint,
            started: Instant::now(),
        }
    }

    /// Record the outcome and attach the endpoint to any error.
    pub fn finish<T>(self, result: ClimateResult<T>) -> Result<T, ApiError> {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        histogram!("climate_api_request_duration_ms", "endpoint" => self.endpoint)
            .record(elapsed_ms);

        result.map_err(|e| {
            counter!(
                "climate_api_errors_total",
                "endpoint" => self.endpoint,
                "kind" => e.kind()
            )
            .increment(1);
            ApiError::new(self.endpoint, e)
        })
    }
}
