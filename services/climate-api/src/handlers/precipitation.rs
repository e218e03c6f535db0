//! Precipitation over the lookback window.

use std::sync::Arc;

use axum::{extract::Extension, Json};

use climate_common::{ClimateResult, PrecipitationSeries};

use crate::error::ApiError;
use crate::metrics::RequestMetrics;
use crate::state::AppState;

/// GET /api/precipitation
///
/// Object keyed by date for the 365 days ending at the most recent
/// measurement. When several stations report a date, the highest station
/// id's reading is kept.
pub async fn precipitation_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<PrecipitationSeries>, ApiError> {
    let request = RequestMetrics::start("precipitation");
    let result = fetch_precipitation(&state).await;
    request.finish(result).map(Json)
}

async fn fetch_precipitation(state: &AppState) -> ClimateResult<PrecipitationSeries> {
    let mut session = state.store.session().await?;
    session.recent_precipitation().await
}
