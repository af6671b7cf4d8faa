//! Metrics collection for relay-service.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus recorder. Call once at startup.
pub fn init_metrics() {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        panic!("failed to set metrics handle: already initialized");
    }
}

/// Metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record a completed forward by outcome.
pub fn record_forward(status: &str) {
    counter!("relay_forwards_total", "status" => status.to_string()).increment(1);
}

/// Record an outbound provider call.
pub fn record_provider_call(provider: &str, status: &str) {
    counter!(
        "relay_provider_calls_total",
        "provider" => provider.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
