//! Climate API Service Library
//!
//! Read-only HTTP reporting endpoints over a daily climate observation
//! dataset: precipitation and temperature series for the last year of data,
//! the station list, and temperature summaries over caller-chosen dates.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the service router over `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Landing page
        .route("/", get(handlers::landing::landing_handler))
        // Data endpoints
        .route(
            "/api/precipitation",
            get(handlers::precipitation::precipitation_handler),
        )
        .route("/api/stations", get(handlers::stations::stations_handler))
        .route("/api/tobs", get(handlers::tobs::tobs_handler))
        .route(
            "/api/start/:start_date",
            get(handlers::temperature::start_handler),
        )
        .route(
            "/api/start-end/:start_date/:end_date",
            get(handlers::temperature::start_end_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
