//! Application state for the climate API.

use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use climate_common::ClimateResult;
use storage::ClimateStore;

use crate::config::ApiConfig;

/// Shared application state.
///
/// Holds no per-request data. Each handler takes its own store session.
pub struct AppState {
    /// Read-only observation store.
    pub store: ClimateStore,

    /// Prometheus recorder handle, when one is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Connect to the configured database and verify its schema.
    pub async fn new(config: &ApiConfig) -> ClimateResult<Self> {
        let store = ClimateStore::connect(&config.database.url, &config.store_options()).await?;
        store.verify_schema().await?;

        info!(url = %config.database.url, "Observation database ready");

        Ok(Self::from_store(store))
    }

    /// State over an already opened store.
    pub fn from_store(store: ClimateStore) -> Self {
        Self {
            store,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
