//! # Observability Infrastructure
//!
//! Structured logging and routing metrics for secretplane.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, log_config_info};
pub use metrics::MetricsRecorder;

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use ::tracing::info;

/// Initialize logging and describe metrics
pub fn init_observability(config: &ObservabilityConfig) -> Result<MetricsRecorder> {
    init_logging(config)?;

    let recorder = MetricsRecorder::new();
    if config.enable_metrics {
        recorder.register_routing_metrics();
    }

    info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        metrics_enabled = %config.enable_metrics,
        json_logging = %config.json_logging,
        "Observability initialized successfully"
    );

    Ok(recorder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_observability() {
        let config = ObservabilityConfig { enable_metrics: false, ..Default::default() };

        // The first call may lose to another test's subscriber; the second never wins
        let _ = init_observability(&config);
        assert!(init_observability(&config).is_err());
    }
}
