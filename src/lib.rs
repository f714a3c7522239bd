pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod session;
pub mod store;
pub mod tracker;

use std::sync::Arc;

use crate::auth::{AdminAuth, AuthProvider};
use crate::config::AppConfig;
use crate::store::TrackerStore;
use crate::tracker::MonthLedger;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TrackerStore>,
    pub ledger: MonthLedger,
    pub auth: Arc<dyn AuthProvider>,
    /// Service-role provisioning; `None` when no elevated credential is configured.
    pub admin: Option<Arc<dyn AdminAuth>>,
    pub config: AppConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn TrackerStore>,
        auth: Arc<dyn AuthProvider>,
        admin: Option<Arc<dyn AdminAuth>>,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        let ledger = MonthLedger::new(
            Arc::clone(&store),
            config.persist_policy,
            config.settings_defaults(),
        );

        Self {
            store,
            ledger,
            auth,
            admin,
            config,
            metrics_handle,
        }
    }
}
