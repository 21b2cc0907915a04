//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Copydesk metrics
pub const METRICS_PREFIX: &str = "copydesk";

/// Register all metric descriptions
pub fn register_metrics() {
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

    describe_counter!(
        format!("{}_articles_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total articles submitted"
    );

    describe_counter!(
        format!("{}_articles_updated_total", METRICS_PREFIX),
        Unit::Count,
        "Total article updates applied"
    );

    describe_counter!(
        format!("{}_editors_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total editors created"
    );

    describe_counter!(
        format!("{}_notifications_sent_total", METRICS_PREFIX),
        Unit::Count,
        "Total notifications handed to the relay"
    );

    describe_counter!(
        format!("{}_auth_attempts_total", METRICS_PREFIX),
        Unit::Count,
        "Total authentication attempts"
    );

    describe_counter!(
        format!("{}_tokens_purged_total", METRICS_PREFIX),
        Unit::Count,
        "Total expired auth tokens removed by the cleanup task"
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

/// Record an action-layer mutation
pub fn record_action(action: &'static str) {
    let name = match action {
        "createArticle" => format!("{}_articles_created_total", METRICS_PREFIX),
        "updateArticle" => format!("{}_articles_updated_total", METRICS_PREFIX),
        "createEditor" => format!("{}_editors_created_total", METRICS_PREFIX),
        _ => return,
    };
    counter!(name).increment(1);
}

/// Record a notification handoff
pub fn record_notification(success: bool) {
    counter!(
        format!("{}_notifications_sent_total", METRICS_PREFIX),
        "status" => if success { "sent" } else { "error" }
    )
    .increment(1);
}

/// Record an authentication attempt
pub fn record_auth(authenticated: bool) {
    counter!(
        format!("{}_auth_attempts_total", METRICS_PREFIX),
        "outcome" => if authenticated { "ok" } else { "denied" }
    )
    .increment(1);
}

/// Record expired tokens removed by the cleanup task
pub fn record_tokens_purged(count: usize) {
    counter!(format!("{}_tokens_purged_total", METRICS_PREFIX)).increment(count as u64);
}
