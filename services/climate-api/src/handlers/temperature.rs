//! Temperature summaries over a date range.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};

use climate_common::{parse_observation_date, ClimateResult, TemperatureSummary};

use crate::error::ApiError;
use crate::metrics::RequestMetrics;
use crate::state::AppState;

/// GET /api/start/:start_date - Summary of every reading on or after the date
pub async fn start_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(start_date): Path<String>,
) -> Result<Json<TemperatureSummary>, ApiError> {
    let request = RequestMetrics::start("start");
    let result = summarize(&state, &start_date, None).await;
    request.finish(result).map(Json)
}

/// GET /api/start-end/:start_date/:end_date - Summary over an inclusive range
pub async fn start_end_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<Json<TemperatureSummary>, ApiError> {
    let request = RequestMetrics::start("start_end");
    let result = summarize(&state, &start_date, Some(&end_date)).await;
    request.finish(result).map(Json)
}

/// Both dates are validated before a connection is taken. An end before
/// the start matches nothing and yields an all-null summary.
async fn summarize(
    state: &AppState,
    start_date: &str,
    end_date: Option<&str>,
) -> ClimateResult<TemperatureSummary> {
    let start = parse_observation_date("start_date", start_date)?;
    let end = end_date
        .map(|raw| parse_observation_date("end_date", raw))
        .transpose()?;

    let mut session = state.store.session().await?;
    session.temperature_summary(start, end).await
}
