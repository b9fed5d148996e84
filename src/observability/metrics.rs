//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_decisions_total` (counter): verdicts by decision and reason
//! - `geo_lookups_total` (counter): cache hits and provider outcomes
//! - `geo_cache_entries` (gauge): current cache size
//! - `geo_cache_evictions_total` (counter): capacity evictions
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - Prometheus exporter served on its own listener

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a gate verdict.
pub fn record_decision(decision: &'static str, reason: &'static str) {
    metrics::counter!("gate_decisions_total", "decision" => decision, "reason" => reason).increment(1);
}

/// Record a geo lookup outcome (`hit`, `miss_ok`, `miss_failed`).
pub fn record_geo_lookup(result: &'static str) {
    metrics::counter!("geo_lookups_total", "result" => result).increment(1);
}

/// Record the current number of cached addresses.
pub fn record_geo_cache_size(entries: usize) {
    metrics::gauge!("geo_cache_entries").set(entries as f64);
}

/// Record one capacity eviction.
pub fn record_geo_eviction() {
    metrics::counter!("geo_cache_evictions_total").increment(1);
}
