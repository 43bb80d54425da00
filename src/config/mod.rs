//! # Configuration Management
//!
//! Layered configuration: defaults, then an optional TOML file, then
//! `SECRETPLANE__*` environment variables (`__` separates sections, e.g.
//! `SECRETPLANE__ROUTER__ENFORCE_CSO_ON_WRITE=true`).

pub mod settings;

pub use settings::{AppConfig, MountConfig, ObservabilityConfig, RegionsConfig, RouterConfig};

use std::path::Path;

use ::config::{Config, Environment, File, FileFormat};

use crate::errors::Result;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SECRETPLANE";

impl AppConfig {
    /// Load and validate configuration
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            crate::errors::SecretPlaneError::config_with_source(
                "Failed to render configuration",
                Box::new(e),
            )
        })
    }
}
