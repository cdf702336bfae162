pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod signals;
pub mod swap;
pub mod wallet;

use crate::config::AppConfig;

/// Shared state of the relay service.
#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub config: AppConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
