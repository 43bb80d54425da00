//! # Backend Manager
//!
//! Routes KV operations to mounted engines. Each call makes exactly one
//! routing decision against one registry snapshot, then makes exactly one
//! engine call. The manager holds no per-call state; everything mutable
//! lives in the [`MountRegistry`].
//!
//! Paths are only normalised here (see [`crate::cso::clean`]). Full CSO
//! validation is opt-in through a [`WritePolicy`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, warn, Instrument};

use super::backends::{engine_from_url, EngineKind, OperationContext, SecretEngine};
use super::codec::{self, SecretValue};
use super::error::EngineResult;
use super::policy::{CsoWritePolicy, WritePolicy};
use super::registry::{MountBinding, MountPrefix, MountRegistry, Resolution};
use crate::config::AppConfig;
use crate::cso::{clean, CsoValidator};
use crate::errors::{Result, SecretPlaneError};
use crate::observability::MetricsRecorder;

/// KV operation forwarded to an engine
#[derive(Debug, Clone)]
pub enum Operation {
    Read,
    Write(SecretValue),
    List,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write(_) => "write",
            Self::List => "list",
            Self::Delete => "delete",
        }
    }
}

/// Result of [`BackendManager::dispatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutput {
    /// Unpacked value returned by a read
    Value(SecretValue),
    /// Child names returned by a list
    Keys(Vec<String>),
    /// Write or delete completed
    Done,
}

/// Where a path would be routed, without touching the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub prefix: MountPrefix,
    pub remainder: String,
    pub engine: EngineKind,
}

/// Router from namespace prefixes to secret engines
#[derive(Debug, Clone)]
pub struct BackendManager {
    registry: Arc<MountRegistry>,
    write_policy: Option<Arc<dyn WritePolicy>>,
    metrics: MetricsRecorder,
}

impl Default for BackendManager {
    fn default() -> Self {
        Self::new(Arc::new(MountRegistry::new()))
    }
}

impl BackendManager {
    /// Create a manager over an existing registry
    pub fn new(registry: Arc<MountRegistry>) -> Self {
        Self { registry, write_policy: None, metrics: MetricsRecorder::new() }
    }

    /// Apply `policy` to every write
    pub fn with_write_policy(mut self, policy: Arc<dyn WritePolicy>) -> Self {
        self.write_policy = Some(policy);
        self
    }

    /// Build a manager from configuration
    ///
    /// Every configured mount is registered in order; the first failure
    /// aborts. CSO enforcement on writes uses the configured region table.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut manager = Self::default();

        for mount in &config.router.mounts {
            let span = crate::mount_span!(mount.namespace, url = %mount.url);
            let _guard = span.enter();
            let engine = engine_from_url(&mount.url)?;
            manager.register(&mount.namespace, engine)?;
        }

        if config.router.enforce_cso_on_write {
            let validator = CsoValidator::new(Arc::new(config.regions.table()));
            manager = manager.with_write_policy(Arc::new(CsoWritePolicy::new(validator)));
            debug!("CSO path enforcement enabled for writes");
        }

        Ok(manager)
    }

    pub fn registry(&self) -> &Arc<MountRegistry> {
        &self.registry
    }

    /// Mount an engine under `prefix`
    pub fn register(&self, prefix: &str, engine: Arc<dyn SecretEngine>) -> Result<MountPrefix> {
        self.registry.register(prefix, engine)
    }

    /// Unmount `prefix`; calls already routed to it complete normally
    pub fn unregister(&self, prefix: &str) -> Result<Arc<MountBinding>> {
        self.registry.unregister(prefix)
    }

    /// Resolve the mount a path would be routed to
    pub fn route(&self, raw_path: &str) -> Result<Route> {
        let (path, resolution) = self.resolve(raw_path)?;
        Ok(Route {
            path,
            prefix: resolution.binding.prefix().clone(),
            remainder: resolution.remainder,
            engine: resolution.binding.engine_kind(),
        })
    }

    /// Perform one KV operation on `raw_path`
    pub async fn dispatch(
        &self,
        ctx: &OperationContext,
        raw_path: &str,
        operation: Operation,
    ) -> Result<DispatchOutput> {
        match operation {
            Operation::Read => self.read(ctx, raw_path).await.map(DispatchOutput::Value),
            Operation::Write(value) => {
                self.write(ctx, raw_path, &value).await.map(|()| DispatchOutput::Done)
            }
            Operation::List => self.list(ctx, raw_path).await.map(DispatchOutput::Keys),
            Operation::Delete => self.delete(ctx, raw_path).await.map(|()| DispatchOutput::Done),
        }
    }

    /// Read and unpack the value stored at `raw_path`
    pub async fn read(&self, ctx: &OperationContext, raw_path: &str) -> Result<SecretValue> {
        let started = Instant::now();
        let result = async {
            let (_, target) = self.resolve(raw_path)?;
            Self::ensure_live(ctx, raw_path)?;
            let body = target
                .binding
                .engine()
                .read(ctx, &target.remainder)
                .await
                .map_err(|e| SecretPlaneError::engine(raw_path, e))?;
            codec::unpack::<SecretValue>(&body)
        }
        .instrument(crate::dispatch_span!("read", raw_path, request_id = %ctx.request_id()))
        .await;

        self.observe("read", raw_path, &result, started);
        result
    }

    /// Pack `value` and store it at `raw_path`
    ///
    /// Nothing reaches the engine when routing, policy or packing fails.
    pub async fn write(
        &self,
        ctx: &OperationContext,
        raw_path: &str,
        value: &SecretValue,
    ) -> Result<()> {
        let started = Instant::now();
        let result = async {
            let (path, target) = self.resolve(raw_path)?;
            if let Some(policy) = &self.write_policy {
                policy.check_write(&path, &target.remainder, value)?;
            }
            let body = codec::pack(value)?;
            debug!(value_type = %value.r#type, size = value.body.len(), "Packed secret value");

            Self::ensure_live(ctx, raw_path)?;
            target
                .binding
                .engine()
                .write(ctx, &target.remainder, body)
                .await
                .map_err(|e| SecretPlaneError::engine(raw_path, e))
        }
        .instrument(crate::dispatch_span!("write", raw_path, request_id = %ctx.request_id()))
        .await;

        self.observe("write", raw_path, &result, started);
        result
    }

    /// List the children of `raw_path`
    pub async fn list(&self, ctx: &OperationContext, raw_path: &str) -> Result<Vec<String>> {
        let started = Instant::now();
        let result = async {
            let (_, target) = self.resolve(raw_path)?;
            Self::ensure_live(ctx, raw_path)?;
            target
                .binding
                .engine()
                .list(ctx, &target.remainder)
                .await
                .map_err(|e| SecretPlaneError::engine(raw_path, e))
        }
        .instrument(crate::dispatch_span!("list", raw_path, request_id = %ctx.request_id()))
        .await;

        self.observe("list", raw_path, &result, started);
        result
    }

    /// Delete the value stored at `raw_path`
    pub async fn delete(&self, ctx: &OperationContext, raw_path: &str) -> Result<()> {
        let started = Instant::now();
        let result = async {
            let (_, target) = self.resolve(raw_path)?;
            Self::ensure_live(ctx, raw_path)?;
            target
                .binding
                .engine()
                .delete(ctx, &target.remainder)
                .await
                .map_err(|e| SecretPlaneError::engine(raw_path, e))
        }
        .instrument(crate::dispatch_span!("delete", raw_path, request_id = %ctx.request_id()))
        .await;

        self.observe("delete", raw_path, &result, started);
        result
    }

    /// Perform health check on all mounted engines
    pub async fn health_check_all(&self) -> BTreeMap<MountPrefix, EngineResult<()>> {
        let snapshot = self.registry.snapshot();
        let checks = snapshot.bindings().map(|binding| async move {
            let result = binding.engine().health_check().await;
            if let Err(e) = &result {
                warn!(prefix = %binding.prefix(), error = %e, "Secret engine health check failed");
            }
            (binding.prefix().clone(), result)
        });

        join_all(checks).await.into_iter().collect()
    }

    /// Normalise a raw path and route it through one registry snapshot
    fn resolve(&self, raw_path: &str) -> Result<(String, Resolution)> {
        if let Some(c) = raw_path.chars().find(|c| c.is_ascii_control()) {
            return Err(SecretPlaneError::path_syntax(
                raw_path,
                format!("path contains control character {:?}", c),
            ));
        }

        let path = clean(raw_path);
        let resolution = self
            .registry
            .snapshot()
            .resolve(&path)
            .map_err(|_| SecretPlaneError::no_mount(raw_path))?;

        debug!(
            path = %path,
            prefix = %resolution.binding.prefix(),
            remainder = %resolution.remainder,
            "Routed secret operation"
        );
        Ok((path, resolution))
    }

    fn ensure_live(ctx: &OperationContext, raw_path: &str) -> Result<()> {
        if ctx.is_cancelled() {
            return Err(SecretPlaneError::cancelled(raw_path));
        }
        Ok(())
    }

    fn observe<T>(&self, operation: &str, raw_path: &str, result: &Result<T>, started: Instant) {
        let status = match result {
            Ok(_) => "ok".to_string(),
            Err(e) => e.kind().to_string(),
        };
        self.metrics.record_dispatch(operation, &status, started.elapsed().as_secs_f64());

        if let Err(e @ SecretPlaneError::Engine { .. }) = result {
            warn!(operation, path = %raw_path, error = %e, "Secret engine operation failed");
        }
    }
}
