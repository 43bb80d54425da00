//! # Structured Logging
//!
//! Subscriber initialisation and span macros for the tracing ecosystem.
//!
//! `RUST_LOG` takes precedence over the configured level. Secret bodies are
//! never recorded; spans carry paths, prefixes and operation names only.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{Result, SecretPlaneError};

/// Create a tracing span for a routed secret operation.
///
/// ```rust,ignore
/// let span = dispatch_span!("read", "secret/app1/key");
/// let span = dispatch_span!("write", path, request_id = %ctx.request_id());
/// ```
#[macro_export]
macro_rules! dispatch_span {
    ($operation:expr, $path:expr) => {
        tracing::debug_span!(
            "secret_dispatch",
            operation = %$operation,
            path = %$path,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $path:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "secret_dispatch",
            operation = %$operation,
            path = %$path,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a tracing span for mount registration
#[macro_export]
macro_rules! mount_span {
    ($prefix:expr) => {
        tracing::info_span!(
            "secret_mount",
            prefix = %$prefix,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($prefix:expr, $($field:tt)*) => {
        tracing::info_span!(
            "secret_mount",
            prefix = %$prefix,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global fmt subscriber, writing to stderr
///
/// Fails with a configuration error when the level directive is invalid or
/// a global subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            SecretPlaneError::config_with_source(
                format!("Invalid log level '{}'", config.log_level),
                Box::new(e),
            )
        })?,
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(config.log_targets)
        .with_writer(std::io::stderr);
    let installed = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| SecretPlaneError::config(format!("Logging already initialised: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        service_name = %config.observability.service_name,
        mounts = config.router.mounts.len(),
        enforce_cso_on_write = config.router.enforce_cso_on_write,
        builtin_regions = config.regions.use_builtin,
        custom_providers = config.regions.providers.len(),
        "secretplane configuration"
    );
}
