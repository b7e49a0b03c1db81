//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_requests_total` (counter): requests entering the pipeline
//! - `guard_rejections_total` (counter): rejections by reason
//! - `log_entries_dropped_total` (counter): attack logs lost to a full queue
//! - `log_entries_staged_total` (counter): attack logs written to the cache
//! - `archive_entries_total` (counter): archival outcomes per staged key
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are low-cardinality static strings

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request() {
    counter!("guard_requests_total").increment(1);
}

pub fn record_rejection(reason: &'static str) {
    counter!("guard_rejections_total", "reason" => reason).increment(1);
}

pub fn record_log_dropped() {
    counter!("log_entries_dropped_total").increment(1);
}

pub fn record_log_staged() {
    counter!("log_entries_staged_total").increment(1);
}

pub fn record_archive_outcome(outcome: &'static str, count: usize) {
    if count > 0 {
        counter!("archive_entries_total", "outcome" => outcome).increment(count as u64);
    }
}
