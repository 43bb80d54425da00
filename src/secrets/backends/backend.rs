//! Secret engine trait and types
//!
//! Defines the capability interface every mounted engine implements.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::secrets::error::EngineResult;

/// Type of secret engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// In-process map, lost on restart
    Memory,
    /// Local encrypted container files
    File,
    /// Remote Vault-compatible KV engine
    Vault,
    /// AWS KMS backed storage
    AwsKms,
    /// GCP KMS backed storage
    GcpKms,
    /// Azure Key Vault
    AzureKeyVault,
}

impl EngineKind {
    /// URL scheme selecting this engine kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Vault => "vault",
            Self::AwsKms => "awskms",
            Self::GcpKms => "gcpkms",
            Self::AzureKeyVault => "azkv",
        }
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "vault" => Ok(Self::Vault),
            "awskms" => Ok(Self::AwsKms),
            "gcpkms" => Ok(Self::GcpKms),
            "azkv" => Ok(Self::AzureKeyVault),
            _ => Err(format!("Unknown secret engine type: {}", s)),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-call context handed through the router to the engine.
///
/// Carries the caller's cancellation signal unchanged; the router adds no
/// deadline of its own.
#[derive(Debug, Clone)]
pub struct OperationContext {
    request_id: Uuid,
    cancellation: CancellationToken,
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationContext {
    /// A context that is never cancelled unless [`cancel`](Self::cancel) is called
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Bind to an existing cancellation token owned by the caller
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self { request_id: Uuid::new_v4(), cancellation }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Resolves once the caller cancels
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }
}

/// Trait for secret engines
///
/// Paths are mount-relative and already normalised by the router. Bodies are
/// packed value envelopes; engines store them as opaque bytes.
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait SecretEngine: Send + Sync + fmt::Debug {
    /// Get the engine type identifier
    fn kind(&self) -> EngineKind;

    /// Fetch the raw body stored at `path`
    async fn read(&self, ctx: &OperationContext, path: &str) -> EngineResult<Bytes>;

    /// Store `body` at `path`, replacing any previous body
    async fn write(&self, ctx: &OperationContext, path: &str, body: Bytes) -> EngineResult<()>;

    /// List the immediate children of `path`; folders end with `/`
    async fn list(&self, ctx: &OperationContext, path: &str) -> EngineResult<Vec<String>>;

    /// Remove the body stored at `path`
    async fn delete(&self, ctx: &OperationContext, path: &str) -> EngineResult<()>;

    /// Perform a health check on the engine
    ///
    /// Returns Ok(()) if the engine is healthy, Err otherwise.
    async fn health_check(&self) -> EngineResult<()> {
        Ok(())
    }
}
