//! Pluggable secret engine architecture
//!
//! Every mount is served by a [`SecretEngine`]. The router only depends on
//! that trait; concrete engines are selected from their URL scheme.
//!
//! ## Engine URLs
//!
//! - **memory://**: in-process [`MemoryEngine`]
//! - **file://**, **vault://**, **awskms://**, **gcpkms://**, **azkv://**:
//!   provided by external engine crates and mounted with
//!   [`BackendManager::register`](crate::secrets::BackendManager::register)

pub mod backend;
pub mod memory;

pub use backend::{EngineKind, OperationContext, SecretEngine};
pub use memory::MemoryEngine;

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::errors::{Result, SecretPlaneError};

/// Build an engine from its configured URL
pub fn engine_from_url(raw: &str) -> Result<Arc<dyn SecretEngine>> {
    let url = Url::parse(raw).map_err(|e| {
        SecretPlaneError::config_with_source(format!("Invalid engine URL '{}'", raw), Box::new(e))
    })?;

    let kind: EngineKind =
        url.scheme().parse().map_err(|_| SecretPlaneError::unsupported_engine(raw))?;
    debug!(engine = %kind, url = %raw, "Building secret engine from URL");

    match kind {
        EngineKind::Memory => Ok(Arc::new(MemoryEngine::new())),
        _ => Err(SecretPlaneError::unsupported_engine(raw)),
    }
}
