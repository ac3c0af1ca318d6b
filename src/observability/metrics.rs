//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define callback metrics (requests, responses, cache lookups, pipeline latency)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `callback_requests_total` (counter)
//! - `callback_responses_total` (counter)
//! - `callback_bytes_processed_total` (counter)
//! - `callback_cache_lookups_total` (counter): result=hit|miss
//! - `callback_pages_cached_total` (counter)
//! - `callback_content_modifications_total` (counter)
//! - `callback_transform_duration_seconds` (histogram): result=hit|miss
//! - `callback_pipeline_failures_total` (counter): stage
//!
//! # Design Decisions
//! - Facade calls are no-ops until a recorder is installed, so library code
//!   and tests record unconditionally

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request() {
    counter!("callback_requests_total").increment(1);
}

pub fn record_response(bytes: usize) {
    counter!("callback_responses_total").increment(1);
    counter!("callback_bytes_processed_total").increment(bytes as u64);
}

pub fn record_cache_lookup(hit: bool, elapsed: Duration) {
    let result = if hit { "hit" } else { "miss" };
    counter!("callback_cache_lookups_total", "result" => result).increment(1);
    histogram!("callback_transform_duration_seconds", "result" => result)
        .record(elapsed.as_secs_f64());
}

pub fn record_page_cached() {
    counter!("callback_pages_cached_total").increment(1);
}

pub fn record_content_modification() {
    counter!("callback_content_modifications_total").increment(1);
}

pub fn record_pipeline_failure(stage: &'static str) {
    counter!("callback_pipeline_failures_total", "stage" => stage).increment(1);
}
