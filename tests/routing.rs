//! Integration tests for mount registration and routed dispatch

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use secretplane::config::{AppConfig, MountConfig};
use secretplane::secrets::{
    BackendManager, DispatchOutput, EngineError, EngineKind, EngineResult, MemoryEngine,
    MountRegistry, Operation, OperationContext, SecretEngine, SecretValue,
};
use secretplane::{ErrorKind, SecretPlaneError};

/// Engine that parks reads until released, then honours cancellation
#[derive(Debug, Default)]
struct BlockingEngine {
    entered: Notify,
}

#[async_trait]
impl SecretEngine for BlockingEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::File
    }

    async fn read(&self, ctx: &OperationContext, _path: &str) -> EngineResult<Bytes> {
        self.entered.notify_one();
        ctx.cancelled().await;
        Err(EngineError::Cancelled)
    }

    async fn write(&self, _ctx: &OperationContext, _path: &str, _body: Bytes) -> EngineResult<()> {
        Ok(())
    }

    async fn list(&self, _ctx: &OperationContext, _path: &str) -> EngineResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn delete(&self, _ctx: &OperationContext, _path: &str) -> EngineResult<()> {
        Ok(())
    }
}

fn memory() -> Arc<dyn SecretEngine> {
    Arc::new(MemoryEngine::new())
}

#[test]
fn test_duplicate_mount_after_normalisation() {
    let registry = MountRegistry::new();
    registry.register("secret/", memory()).unwrap();

    let err = registry.register("secret", memory()).unwrap_err();
    assert!(matches!(err, SecretPlaneError::DuplicateMount { ref prefix } if prefix == "secret"));
}

#[test]
fn test_longest_prefix_match() {
    let registry = MountRegistry::new();
    registry.register("secret", memory()).unwrap();
    registry.register("secret/app1", memory()).unwrap();

    let resolution = registry.resolve("secret/app1/key").unwrap();
    assert_eq!(resolution.binding.prefix().as_str(), "secret/app1");
    assert_eq!(resolution.remainder, "key");
}

#[test]
fn test_no_substring_match() {
    let registry = MountRegistry::new();
    registry.register("sec", memory()).unwrap();

    let err = registry.resolve("secret/x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoMount);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_mounts_isolate_engines() {
    let manager = BackendManager::default();
    let team_a = MemoryEngine::new();
    let team_b = MemoryEngine::new();
    manager.register("teams/a", Arc::new(team_a.clone())).unwrap();
    manager.register("teams/b", Arc::new(team_b.clone())).unwrap();

    let ctx = OperationContext::new();
    let value = SecretValue::new("raw", b"a-only".to_vec());
    manager.write(&ctx, "teams/a/db/password", &value).await.unwrap();

    assert_eq!(team_a.len().await, 1);
    assert!(team_b.is_empty().await);
    assert!(manager.read(&ctx, "teams/b/db/password").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_root_mount_catches_unclaimed_paths() {
    let manager = BackendManager::default();
    let root = MemoryEngine::new();
    manager.register("/", Arc::new(root.clone())).unwrap();
    manager.register("kv", memory()).unwrap();

    let ctx = OperationContext::new();
    manager.write(&ctx, "meta/cso/token", &SecretValue::new("raw", b"t".to_vec())).await.unwrap();

    assert_eq!(root.len().await, 1);
    let out = manager.dispatch(&ctx, "meta", Operation::List).await.unwrap();
    assert_eq!(out, DispatchOutput::Keys(vec!["cso/".to_string()]));
}

#[tokio::test]
async fn test_cancellation_propagates_from_engine() {
    let manager = Arc::new(BackendManager::default());
    let engine = Arc::new(BlockingEngine::default());
    manager.register("slow", engine.clone()).unwrap();

    let token = CancellationToken::new();
    let ctx = OperationContext::with_cancellation(token.clone());

    let task = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.read(&ctx, "slow/key").await })
    };

    engine.entered.notified().await;
    token.cancel();

    let err = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    match err {
        SecretPlaneError::Engine { path, source } => {
            assert_eq!(path, "slow/key");
            assert_eq!(source, EngineError::Cancelled);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_precancelled_context_never_reaches_engine() {
    let manager = BackendManager::default();
    let engine = Arc::new(BlockingEngine::default());
    manager.register("slow", engine).unwrap();

    let ctx = OperationContext::new();
    ctx.cancel();

    // BlockingEngine would park forever on a live context
    let err = manager.read(&ctx, "slow/key").await.unwrap_err();
    assert!(matches!(err, SecretPlaneError::Cancelled { ref path } if path == "slow/key"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_register_and_resolve() {
    let manager = Arc::new(BackendManager::default());
    manager.register("stable", memory()).unwrap();

    let mut writers = Vec::new();
    for i in 0..8 {
        let manager = Arc::clone(&manager);
        writers.push(tokio::spawn(async move {
            for j in 0..25 {
                let prefix = format!("dyn/{}/{}", i, j);
                manager.register(&prefix, memory()).unwrap();

                // Visible to every resolve that starts after registration returned
                let route = manager.route(&format!("{}/key", prefix)).unwrap();
                assert_eq!(route.prefix.as_str(), prefix);
                assert_eq!(route.remainder, "key");
            }
        }));
    }

    let mut readers = Vec::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        readers.push(tokio::spawn(async move {
            let ctx = OperationContext::new();
            for n in 0..100 {
                let path = format!("stable/reader/{}", n);
                manager.write(&ctx, &path, &SecretValue::new("raw", vec![n as u8])).await.unwrap();
                assert_eq!(manager.read(&ctx, &path).await.unwrap().body, vec![n as u8]);
            }
        }));
    }

    for handle in writers.into_iter().chain(readers) {
        handle.await.unwrap();
    }
    assert_eq!(manager.registry().len(), 1 + 8 * 25);
}

#[tokio::test]
async fn test_manager_from_config() {
    let mut config = AppConfig::default();
    config.router.enforce_cso_on_write = true;
    config.router.mounts = vec![MountConfig::new("secret", "memory://"), MountConfig::new("/", "memory://")];

    let manager = BackendManager::from_config(&config).unwrap();
    assert_eq!(manager.registry().len(), 2);

    let ctx = OperationContext::new();
    let value = SecretValue::new("raw", b"v".to_vec());
    assert!(manager.write(&ctx, "secret/meta/cso/token", &value).await.is_ok());

    let err = manager.write(&ctx, "secret/not-cso/token", &value).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownRing);
}

#[test]
fn test_manager_from_config_rejects_unknown_engine() {
    let mut config = AppConfig::default();
    config.router.mounts = vec![MountConfig::new("vault", "vault://127.0.0.1:8200")];

    let err = BackendManager::from_config(&config).unwrap_err();
    assert!(matches!(err, SecretPlaneError::UnsupportedEngine { .. }));
}
