use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("relay_requests_total").absolute(0);
    counter!("relay_failures_total").absolute(0);
    counter!("signals_loaded_total").absolute(0);
    counter!("swap_plans_requested_total").absolute(0);
    counter!("swap_plans_failed_total").absolute(0);
    counter!("swap_steps_signed_total").absolute(0);
    counter!("swaps_completed_total").absolute(0);

    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally, for tests
/// and embedders that manage their own recorder.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
