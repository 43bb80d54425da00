//! # Configuration Settings
//!
//! Defines the configuration structure for secretplane.

use crate::cso::RegionTable;
use crate::errors::{Result, SecretPlaneError};
use crate::secrets::MountPrefix;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Mount table and write enforcement
    #[validate(nested)]
    pub router: RouterConfig,

    /// Provider/region reference table
    #[validate(nested)]
    pub regions: RegionsConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        // Use validator crate for basic validation
        Validate::validate(self).map_err(SecretPlaneError::from)?;

        // Custom validation logic
        self.validate_custom()?;

        Ok(())
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        // Mount namespaces must stay unique once sanitised
        let mut seen = BTreeSet::new();
        for mount in &self.router.mounts {
            let prefix = MountPrefix::sanitize(&mount.namespace)?;
            if !seen.insert(prefix.clone()) {
                return Err(SecretPlaneError::config(format!(
                    "Mount namespace '{}' is configured more than once",
                    prefix
                )));
            }
        }

        if let Some((provider, _)) =
            self.regions.providers.iter().find(|(_, regions)| regions.is_empty())
        {
            return Err(SecretPlaneError::config(format!(
                "Cloud provider '{}' must list at least one region",
                provider
            )));
        }

        if !self.regions.use_builtin && self.regions.providers.is_empty() {
            return Err(SecretPlaneError::config(
                "Region table is empty: enable use_builtin or configure providers",
            ));
        }

        Ok(())
    }
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Describe routing metrics on startup
    pub enable_metrics: bool,

    /// Service name attached to startup logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Include the event target in log lines
    pub log_targets: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            service_name: "secretplane".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
            log_targets: true,
        }
    }
}

/// Backend router configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Engines mounted at startup, registered in order
    #[validate(nested)]
    pub mounts: Vec<MountConfig>,

    /// Reject writes whose mount-relative path is not a valid CSO path
    pub enforce_cso_on_write: bool,
}

/// One namespace prefix bound to an engine URL
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct MountConfig {
    /// Namespace prefix; `/` mounts the root
    #[validate(length(min = 1, message = "Mount namespace cannot be empty"))]
    pub namespace: String,

    /// Engine URL, e.g. `memory://`
    #[validate(url(message = "Engine URL must be a valid URL"))]
    pub url: String,
}

impl MountConfig {
    pub fn new<N: Into<String>, U: Into<String>>(namespace: N, url: U) -> Self {
        Self { namespace: namespace.into(), url: url.into() }
    }
}

/// Provider/region table injected into the CSO grammar
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegionsConfig {
    /// Extra providers and regions, merged over the built-in table
    pub providers: BTreeMap<String, Vec<String>>,

    /// Start from the built-in aws/gcp/azure table
    pub use_builtin: bool,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self { providers: BTreeMap::new(), use_builtin: true }
    }
}

impl RegionsConfig {
    /// Build the effective region table
    pub fn table(&self) -> RegionTable {
        let mut table =
            if self.use_builtin { RegionTable::builtin().clone() } else { RegionTable::new() };
        for (provider, regions) in &self.providers {
            table.insert_provider(provider.as_str(), regions.iter().map(String::as_str));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.regions.use_builtin);
        assert!(config.router.mounts.is_empty());
    }

    #[test]
    fn test_duplicate_namespaces_after_sanitising() {
        let mut config = AppConfig::default();
        config.router.mounts =
            vec![MountConfig::new("secret/", "memory://"), MountConfig::new("/secret", "memory://")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mount_url_validation() {
        let mut config = AppConfig::default();
        config.router.mounts = vec![MountConfig::new("secret", "not a url")];
        assert!(config.validate().is_err());

        config.router.mounts = vec![MountConfig::new("", "memory://")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_errors() {
        let mut config = AppConfig::default();
        config.observability.log_level = String::new();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.regions.providers.insert("lab".to_string(), vec![]);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.regions.use_builtin = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_region_table_merge() {
        let mut regions = RegionsConfig::default();
        regions.providers.insert("lab".to_string(), vec!["rack-a".to_string()]);
        regions.providers.insert("aws".to_string(), vec!["mars-1".to_string()]);

        let table = regions.table();
        assert!(table.contains("lab", "rack-a"));
        assert!(table.contains("aws", "us-east-1"));
        assert!(table.contains("aws", "mars-1"));

        regions.use_builtin = false;
        let table = regions.table();
        assert!(!table.contains("aws", "us-east-1"));
        assert!(table.is_provider("lab"));
    }
}
