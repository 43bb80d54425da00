//! Secret routing and value encoding.
//!
//! # Architecture
//!
//! A caller hands the [`BackendManager`] an operation on a raw path:
//! - the path is normalised with [`crate::cso::clean`]
//! - the [`MountRegistry`] picks the longest segment-aligned mount prefix
//! - values are packed with the [`codec`] and forwarded with the
//!   mount-relative remainder to the bound [`SecretEngine`]
//! - read results are unpacked; engine errors come back wrapped with the
//!   caller's raw path
//!
//! # Basic Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use secretplane::secrets::{BackendManager, MemoryEngine, OperationContext, SecretValue};
//!
//! let manager = BackendManager::default();
//! manager.register("secret", Arc::new(MemoryEngine::new()))?;
//!
//! let ctx = OperationContext::new();
//! manager.write(&ctx, "secret/meta/cso/token", &SecretValue::new("raw", b"s3cr3t".to_vec())).await?;
//! let value = manager.read(&ctx, "secret/meta/cso/token").await?;
//! ```

pub mod backends;
pub mod codec;
pub mod error;
pub mod manager;
pub mod policy;
pub mod registry;

pub use backends::{engine_from_url, EngineKind, MemoryEngine, OperationContext, SecretEngine};
pub use codec::{pack, unpack, unpack_into, Envelope, SecretMap, SecretValue};
pub use error::{EngineError, EngineResult};
pub use manager::{BackendManager, DispatchOutput, Operation, Route};
pub use policy::{CsoWritePolicy, WritePolicy};
pub use registry::{MountBinding, MountPrefix, MountRegistry, MountTable, Resolution};
