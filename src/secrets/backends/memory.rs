//! In-process secret engine
//!
//! Keeps packed bodies in an ordered map guarded by an async RwLock. Used by
//! `memory://` mounts, the operator binary and the test suites.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::{EngineKind, OperationContext, SecretEngine};
use crate::secrets::error::{EngineError, EngineResult};

/// Memory-backed engine, cheap to clone (clones share storage)
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    inner: Arc<RwLock<BTreeMap<String, Bytes>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored bodies
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Remove every stored body
    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        debug!(entries = store.len(), "Clearing memory engine");
        store.clear();
    }

    fn check(ctx: &OperationContext, path: &str) -> EngineResult<()> {
        if ctx.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        if path.is_empty() {
            return Err(EngineError::invalid_path(path, "secret key must not be empty"));
        }
        Ok(())
    }
}

#[async_trait]
impl SecretEngine for MemoryEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Memory
    }

    async fn read(&self, ctx: &OperationContext, path: &str) -> EngineResult<Bytes> {
        Self::check(ctx, path)?;
        let store = self.inner.read().await;
        store.get(path).cloned().ok_or_else(|| EngineError::not_found(path))
    }

    async fn write(&self, ctx: &OperationContext, path: &str, body: Bytes) -> EngineResult<()> {
        Self::check(ctx, path)?;
        let mut store = self.inner.write().await;
        debug!(path = %path, size = body.len(), "Storing secret body");
        store.insert(path.to_string(), body);
        Ok(())
    }

    async fn list(&self, ctx: &OperationContext, path: &str) -> EngineResult<Vec<String>> {
        if ctx.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        // Empty path lists the mount root.
        let prefix = if path.is_empty() { String::new() } else { format!("{}/", path) };
        let store = self.inner.read().await;

        let children: BTreeSet<String> = store
            .range(prefix.clone()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(&prefix))
            .filter_map(|key| {
                let rest = &key[prefix.len()..];
                match rest.split_once('/') {
                    Some((folder, _)) if !folder.is_empty() => Some(format!("{}/", folder)),
                    Some(_) => None,
                    None if rest.is_empty() => None,
                    None => Some(rest.to_string()),
                }
            })
            .collect();

        if children.is_empty() {
            return Err(EngineError::not_found(path));
        }
        Ok(children.into_iter().collect())
    }

    async fn delete(&self, ctx: &OperationContext, path: &str) -> EngineResult<()> {
        Self::check(ctx, path)?;
        let mut store = self.inner.write().await;
        match store.remove(path) {
            Some(_) => {
                debug!(path = %path, "Deleted secret body");
                Ok(())
            }
            None => Err(EngineError::not_found(path)),
        }
    }
}
