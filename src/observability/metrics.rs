//! # Metrics Collection
//!
//! Routing metrics recorded through the `metrics` facade. No exporter is
//! installed here; embedders pick one.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Metrics recorder that tracks routing metrics
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    /// Create a new metrics recorder instance
    pub fn new() -> Self {
        Self
    }

    /// Record one routed operation
    pub fn record_dispatch(&self, operation: &str, status: &str, duration: f64) {
        let labels = [("operation", operation.to_string()), ("status", status.to_string())];
        counter!("secret_dispatch_total", &labels).increment(1);

        let operation_label = [("operation", operation.to_string())];
        histogram!("secret_dispatch_duration_seconds", &operation_label).record(duration);
    }

    /// Update the number of mounted engines
    pub fn update_active_mounts(&self, count: usize) {
        gauge!("secret_mounts_active").set(count as f64);
    }

    /// Register descriptions for the routing metrics
    pub fn register_routing_metrics(&self) {
        describe_counter!(
            "secret_dispatch_total",
            Unit::Count,
            "Secret operations routed, by operation and outcome"
        );
        describe_histogram!(
            "secret_dispatch_duration_seconds",
            Unit::Seconds,
            "Time spent routing and serving a secret operation"
        );
        describe_gauge!("secret_mounts_active", Unit::Count, "Currently mounted secret engines");
    }
}
