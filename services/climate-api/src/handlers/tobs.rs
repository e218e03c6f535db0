//! Temperature observations of the most active station.

use std::sync::Arc;

use axum::{extract::Extension, Json};

use climate_common::{ClimateResult, TemperatureObservation};

use crate::error::ApiError;
use crate::metrics::RequestMetrics;
use crate::state::AppState;

/// GET /api/tobs
///
/// Readings from the station with the most measurements overall, limited
/// to the lookback window and ordered by date.
pub async fn tobs_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureObservation>>, ApiError> {
    let request = RequestMetrics::start("tobs");
    let result = fetch_tobs(&state).await;
    request.finish(result).map(Json)
}

async fn fetch_tobs(state: &AppState) -> ClimateResult<Vec<TemperatureObservation>> {
    let mut session = state.store.session().await?;
    session.most_active_station_temperatures().await
}
