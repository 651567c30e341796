//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Profanity Sieve metrics
pub const METRICS_PREFIX: &str = "profanity";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 100ms, P99 < 500ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms - P50 target
    0.250,  // 250ms
    0.500,  // 500ms - P99 target
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Classification metrics
    describe_counter!(
        format!("{}_classifications_total", METRICS_PREFIX),
        Unit::Count,
        "Total classifications by outcome"
    );

    describe_histogram!(
        format!("{}_classification_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Classification latency in seconds"
    );

    describe_counter!(
        format!("{}_chunks_total", METRICS_PREFIX),
        Unit::Count,
        "Total chunks compared against the index, by kind"
    );

    // Index metrics
    describe_counter!(
        format!("{}_index_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total similarity index queries"
    );

    describe_histogram!(
        format!("{}_index_query_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Similarity index query latency in seconds"
    );

    describe_counter!(
        format!("{}_index_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total similarity index errors"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record a finished classification
pub fn record_classification(duration_secs: f64, is_profane: bool) {
    let outcome = if is_profane { "profane" } else { "clean" };

    counter!(
        format!("{}_classifications_total", METRICS_PREFIX),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        format!("{}_classification_duration_seconds", METRICS_PREFIX),
        "outcome" => outcome
    )
    .record(duration_secs);
}

/// Helper to record how many chunks of a kind were produced
pub fn record_chunks(kind: &'static str, count: usize) {
    counter!(
        format!("{}_chunks_total", METRICS_PREFIX),
        "kind" => kind
    )
    .increment(count as u64);
}

/// Helper to record index query metrics
pub fn record_index_query(duration_secs: f64, index: &str, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_index_queries_total", METRICS_PREFIX),
        "index" => index.to_string(),
        "status" => status
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_index_query_duration_seconds", METRICS_PREFIX),
            "index" => index.to_string()
        )
        .record(duration_secs);
    } else {
        counter!(
            format!("{}_index_errors_total", METRICS_PREFIX),
            "index" => index.to_string()
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        assert!(LATENCY_BUCKETS.contains(&0.100));
        assert!(LATENCY_BUCKETS.contains(&0.500));
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: calls must be no-ops
        let metrics = RequestMetrics::start("POST", "/");
        metrics.finish(200);
        record_classification(0.01, true);
        record_chunks("word", 3);
        record_index_query(0.002, "memory", false);
    }
}
