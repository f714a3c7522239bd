use std::sync::OnceLock;

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload. Safe to call more than once; only
/// the first call installs the recorder.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("A global metrics recorder was already installed");
            }

            // Pre-register counters so they appear even before the first increment.
            counter!("day_saves_total").absolute(0);
            counter!("persist_failures_total").absolute(0);
            counter!("summaries_recomputed_total").absolute(0);
            counter!("registrations_total").absolute(0);

            handle
        })
        .clone()
}
