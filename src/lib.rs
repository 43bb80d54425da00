//! # secretplane
//!
//! Secret addressing and backend routing.
//!
//! Secrets are named with the Common Secret Ontology (CSO), a fixed six-ring
//! path grammar, and stored in pluggable engines mounted under namespace
//! prefixes. Values travel in a binary envelope so already-binary bodies are
//! never text-encoded twice.
//!
//! ## Architecture
//!
//! ```text
//! caller → BackendManager → MountRegistry (longest prefix) → SecretEngine
//!              ↓                                                  ↑
//!         cso::clean / WritePolicy            codec::pack / codec::unpack
//! ```
//!
//! ## Core Components
//!
//! - **CSO grammar** ([`cso`]): `clean`, `validate` and `parse` into a typed [`cso::SecretPath`]
//! - **Mount registry** ([`secrets::MountRegistry`]): copy-on-write prefix table
//! - **Backend manager** ([`secrets::BackendManager`]): one routing decision, one engine call
//! - **Value codec** ([`secrets::codec`]): protobuf `Any` envelope
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use secretplane::secrets::{BackendManager, MemoryEngine, OperationContext, SecretValue};
//!
//! #[tokio::main]
//! async fn main() -> secretplane::Result<()> {
//!     secretplane::cso::validate("infra/aws/acme-prod/us-east-1/billing/db-password")?;
//!
//!     let manager = BackendManager::default();
//!     manager.register("secret", Arc::new(MemoryEngine::new()))?;
//!
//!     let ctx = OperationContext::new();
//!     let value = SecretValue::new("raw", b"hunter2".to_vec());
//!     manager.write(&ctx, "secret/meta/cso/db-password", &value).await?;
//!     assert_eq!(manager.read(&ctx, "secret/meta/cso/db-password").await?, value);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod cso;
pub mod errors;
pub mod observability;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{ErrorKind, Result, SecretPlaneError};
pub use secrets::{BackendManager, MountRegistry, OperationContext, SecretEngine, SecretValue};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
