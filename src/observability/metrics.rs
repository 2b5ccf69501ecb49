//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define connectivity metrics (probes, latency, state, transitions)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `db_probe_total` (counter): probes by outcome (success, timeout, refused, unknown)
//! - `db_probe_duration_seconds` (histogram): probe latency
//! - `db_connectivity` (gauge): 1=connected, 0=disconnected or unknown
//! - `db_connectivity_transitions_total` (counter): reported transitions by target state
//! - `http_requests_total` (counter): health surface requests by path, status

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::state::ConnectivityState;
use crate::health::types::ProbeResult;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Failure is logged and tolerated; the service runs without metrics.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);

    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus metrics exporter started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one connectivity probe.
pub fn record_probe(result: &ProbeResult) {
    let outcome = match result.error {
        None => "success",
        Some(kind) => kind.as_label(),
    };
    counter!("db_probe_total", "outcome" => outcome).increment(1);
    histogram!("db_probe_duration_seconds").record(result.elapsed.as_secs_f64());
}

/// Mirror the shared connectivity state.
pub fn record_connectivity(state: ConnectivityState) {
    let value = if state == ConnectivityState::Connected { 1.0 } else { 0.0 };
    gauge!("db_connectivity").set(value);
}

/// Count a reported connectivity transition.
pub fn record_transition(to: ConnectivityState) {
    counter!("db_connectivity_transitions_total", "to" => to.as_str()).increment(1);
}

/// Record a request served by the health surface.
pub fn record_request(path: &str, status: u16, elapsed: Duration) {
    counter!(
        "http_requests_total",
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "path" => path.to_string())
        .record(elapsed.as_secs_f64());
}
