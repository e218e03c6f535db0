//! Station listing.

use std::sync::Arc;

use axum::{extract::Extension, Json};

use climate_common::{ClimateResult, Station};

use crate::error::ApiError;
use crate::metrics::RequestMetrics;
use crate::state::AppState;

/// GET /api/stations - Every station, ordered by id
pub async fn stations_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Station>>, ApiError> {
    let request = RequestMetrics::start("stations");
    let result = fetch_stations(&state).await;
    request.finish(result).map(Json)
}

async fn fetch_stations(state: &AppState) -> ClimateResult<Vec<Station>> {
    let mut session = state.store.session().await?;
    session.stations().await
}
