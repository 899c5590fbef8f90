//! Metrics and observability utilities
//!
//! Provides Prometheus-style metrics with standardized naming conventions.
//! Recording is a no-op until an exporter is installed.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all FollowRank metrics
pub const METRICS_PREFIX: &str = "followrank";

/// Histogram buckets for request and ranking latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
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

    // Ranking metrics
    describe_counter!(
        format!("{}_rank_runs_total", METRICS_PREFIX),
        Unit::Count,
        "Total PageRank computations"
    );

    describe_histogram!(
        format!("{}_rank_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Graph build plus solve latency in seconds"
    );

    describe_gauge!(
        format!("{}_rank_iterations", METRICS_PREFIX),
        Unit::Count,
        "Power iterations run by the last computation"
    );

    describe_gauge!(
        format!("{}_rank_graph_nodes", METRICS_PREFIX),
        Unit::Count,
        "Accounts in the last follower graph"
    );

    // Persistence metrics
    describe_counter!(
        format!("{}_persist_batches_total", METRICS_PREFIX),
        Unit::Count,
        "Score write-back batches by outcome"
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

/// Helper to record one ranking computation.
///
/// `scope` is `global` or `restricted`.
pub fn record_rank_run(scope: &str, duration_secs: f64, iterations: usize, nodes: usize) {
    counter!(
        format!("{}_rank_runs_total", METRICS_PREFIX),
        "scope" => scope.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_rank_duration_seconds", METRICS_PREFIX),
        "scope" => scope.to_string()
    )
    .record(duration_secs);

    gauge!(
        format!("{}_rank_iterations", METRICS_PREFIX),
        "scope" => scope.to_string()
    )
    .set(iterations as f64);

    gauge!(
        format!("{}_rank_graph_nodes", METRICS_PREFIX),
        "scope" => scope.to_string()
    )
    .set(nodes as f64);
}

/// `status` label of `persist_batches_total`
fn persist_status(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}

/// Helper to record a score write-back batch
pub fn record_persist_batch(success: bool) {
    counter!(
        format!("{}_persist_batches_total", METRICS_PREFIX),
        "status" => persist_status(success)
    )
    .increment(1);
}
