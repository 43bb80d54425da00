//! Mount registry
//!
//! Binds sanitised namespace prefixes to secret engines and resolves paths by
//! longest segment-aligned prefix. The table is copy-on-write: every
//! mutation builds a new [`MountTable`] and swaps it in under a short write
//! lock, so a lookup always works against one complete snapshot.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use super::backends::{EngineKind, SecretEngine};
use crate::cso::split_segments;
use crate::errors::{Result, SecretPlaneError};
use crate::observability::MetricsRecorder;

/// Sanitised mount prefix
///
/// Produced by the same normalisation as path validation. The root mount is
/// spelled `/` and matches every path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MountPrefix(String);

impl MountPrefix {
    pub const ROOT: &'static str = "/";

    /// Normalise a raw prefix; empty, `/` and `.` all sanitise to the root
    ///
    /// `..` segments are rejected so a prefix can never collapse onto an
    /// ancestor or the root.
    pub fn sanitize(raw: &str) -> Result<Self> {
        if let Some(c) = raw.chars().find(|c| c.is_ascii_control()) {
            return Err(SecretPlaneError::path_syntax(
                raw,
                format!("mount prefix contains control character {:?}", c),
            ));
        }

        if raw.split('/').any(|segment| segment.trim_matches(' ') == "..") {
            return Err(SecretPlaneError::path_syntax(raw, "mount prefix must not contain '..'"));
        }

        let segments = split_segments(raw);
        if segments.is_empty() {
            Ok(Self(Self::ROOT.to_string()))
        } else {
            Ok(Self(segments.join("/")))
        }
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MountPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A prefix bound to an engine; replaced wholesale, never mutated
#[derive(Debug)]
pub struct MountBinding {
    prefix: MountPrefix,
    engine: Arc<dyn SecretEngine>,
}

impl MountBinding {
    pub fn prefix(&self) -> &MountPrefix {
        &self.prefix
    }

    pub fn engine(&self) -> &Arc<dyn SecretEngine> {
        &self.engine
    }

    pub fn engine_kind(&self) -> EngineKind {
        self.engine.kind()
    }
}

/// Outcome of a successful lookup
#[derive(Debug, Clone)]
pub struct Resolution {
    pub binding: Arc<MountBinding>,
    /// Segments after the matched prefix, `/`-joined; empty when the path is the mount itself
    pub remainder: String,
}

/// Immutable routing snapshot
#[derive(Debug, Default)]
pub struct MountTable {
    bindings: BTreeMap<MountPrefix, Arc<MountBinding>>,
}

impl MountTable {
    /// Longest-prefix match over whole path segments
    pub fn resolve(&self, path: &str) -> Result<Resolution> {
        let segments = split_segments(path);

        for split in (1..=segments.len()).rev() {
            let candidate = MountPrefix(segments[..split].join("/"));
            if let Some(binding) = self.bindings.get(&candidate) {
                return Ok(Resolution {
                    binding: Arc::clone(binding),
                    remainder: segments[split..].join("/"),
                });
            }
        }

        match self.bindings.get(&MountPrefix(MountPrefix::ROOT.to_string())) {
            Some(binding) => {
                Ok(Resolution { binding: Arc::clone(binding), remainder: segments.join("/") })
            }
            None => Err(SecretPlaneError::no_mount(path)),
        }
    }

    pub fn get(&self, prefix: &MountPrefix) -> Option<&Arc<MountBinding>> {
        self.bindings.get(prefix)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Arc<MountBinding>> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Registry of mounted secret engines
///
/// Lookups clone the current snapshot `Arc` and release the lock before any
/// matching happens; mutations serialise on the write lock.
pub struct MountRegistry {
    table: RwLock<Arc<MountTable>>,
    metrics: MetricsRecorder,
}

impl fmt::Debug for MountRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountRegistry").field("mounts", &self.mounts()).finish()
    }
}

impl Default for MountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MountRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { table: RwLock::new(Arc::new(MountTable::default())), metrics: MetricsRecorder::new() }
    }

    /// Current routing snapshot
    pub fn snapshot(&self) -> Arc<MountTable> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&table)
    }

    /// Bind `prefix` to `engine`; fails if the sanitised prefix is already bound
    pub fn register(&self, prefix: &str, engine: Arc<dyn SecretEngine>) -> Result<MountPrefix> {
        let prefix = MountPrefix::sanitize(prefix)?;
        let engine_kind = engine.kind();

        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if table.bindings.contains_key(&prefix) {
            return Err(SecretPlaneError::duplicate_mount(prefix.as_str()));
        }

        let mut bindings = table.bindings.clone();
        let binding = Arc::new(MountBinding { prefix: prefix.clone(), engine });
        bindings.insert(prefix.clone(), binding);
        *table = Arc::new(MountTable { bindings });
        let mounts = table.len();
        drop(table);

        self.metrics.update_active_mounts(mounts);
        info!(prefix = %prefix, engine = %engine_kind, mounts, "Registering secret engine mount");
        Ok(prefix)
    }

    /// Remove the binding for `prefix`
    ///
    /// Calls already holding the binding keep using its engine.
    pub fn unregister(&self, prefix: &str) -> Result<Arc<MountBinding>> {
        let prefix = MountPrefix::sanitize(prefix)?;

        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let mut bindings = table.bindings.clone();
        let removed = bindings
            .remove(&prefix)
            .ok_or_else(|| SecretPlaneError::unknown_mount(prefix.as_str()))?;
        *table = Arc::new(MountTable { bindings });
        let mounts = table.len();
        drop(table);

        self.metrics.update_active_mounts(mounts);
        info!(prefix = %prefix, engine = %removed.engine_kind(), mounts, "Unregistered secret engine mount");
        Ok(removed)
    }

    /// Resolve a path against the current snapshot
    pub fn resolve(&self, path: &str) -> Result<Resolution> {
        let resolution = self.snapshot().resolve(path)?;
        debug!(
            path = %path,
            prefix = %resolution.binding.prefix(),
            remainder = %resolution.remainder,
            "Resolved secret mount"
        );
        Ok(resolution)
    }

    /// Check if a sanitised prefix is bound
    pub fn contains(&self, prefix: &str) -> bool {
        MountPrefix::sanitize(prefix).map(|p| self.snapshot().get(&p).is_some()).unwrap_or(false)
    }

    /// Registered prefixes, sorted
    pub fn mounts(&self) -> Vec<MountPrefix> {
        self.snapshot().bindings.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::secrets::backends::MemoryEngine;
    use tracing_test::traced_test;

    fn engine() -> Arc<dyn SecretEngine> {
        Arc::new(MemoryEngine::new())
    }

    #[test]
    fn test_registry_creation() {
        let registry = MountRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.mounts().is_empty());
    }

    #[test]
    fn test_sanitize_prefix() {
        assert_eq!(MountPrefix::sanitize("secret/").unwrap().as_str(), "secret");
        assert_eq!(MountPrefix::sanitize("//a//b/").unwrap().as_str(), "a/b");
        assert!(MountPrefix::sanitize("").unwrap().is_root());
        assert!(MountPrefix::sanitize("/").unwrap().is_root());
        assert!(MountPrefix::sanitize("a\nb").is_err());
        assert!(MountPrefix::sanitize(".").unwrap().is_root());
    }

    #[test]
    fn test_parent_segments_rejected_in_prefix() {
        for raw in ["..", "a/..", "a/b/../c", " .. /x"] {
            let err = MountPrefix::sanitize(raw).unwrap_err();
            assert_eq!(err.kind(), crate::errors::ErrorKind::PathSyntax, "accepted {:?}", raw);
        }

        let registry = MountRegistry::new();
        assert!(registry.register("a/..", engine()).is_err());
        assert!(registry.is_empty());
        assert!(!registry.contains(".."));
    }

    #[test]
    fn test_duplicate_after_normalisation() {
        let registry = MountRegistry::new();
        registry.register("secret/", engine()).unwrap();

        let err = registry.register("secret", engine()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateMount);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let registry = MountRegistry::new();
        registry.register("secret", engine()).unwrap();
        registry.register("secret/app1", engine()).unwrap();

        let resolution = registry.resolve("secret/app1/key").unwrap();
        assert_eq!(resolution.binding.prefix().as_str(), "secret/app1");
        assert_eq!(resolution.remainder, "key");

        let resolution = registry.resolve("secret/app2/key").unwrap();
        assert_eq!(resolution.binding.prefix().as_str(), "secret");
        assert_eq!(resolution.remainder, "app2/key");
    }

    #[test]
    fn test_segment_aligned_only() {
        let registry = MountRegistry::new();
        registry.register("sec", engine()).unwrap();
        registry.register("prod", engine()).unwrap();

        assert_eq!(registry.resolve("secret/x").unwrap_err().kind(), ErrorKind::NoMount);
        assert_eq!(registry.resolve("production/x").unwrap_err().kind(), ErrorKind::NoMount);
    }

    #[test]
    fn test_root_mount_is_fallback() {
        let registry = MountRegistry::new();
        registry.register("/", engine()).unwrap();
        registry.register("meta", engine()).unwrap();

        let resolution = registry.resolve("infra/aws/x").unwrap();
        assert!(resolution.binding.prefix().is_root());
        assert_eq!(resolution.remainder, "infra/aws/x");

        let resolution = registry.resolve("meta/cso/key").unwrap();
        assert_eq!(resolution.binding.prefix().as_str(), "meta");
    }

    #[test]
    fn test_exact_mount_path_has_empty_remainder() {
        let registry = MountRegistry::new();
        registry.register("kv", engine()).unwrap();
        assert_eq!(registry.resolve("kv/").unwrap().remainder, "");
    }

    #[test]
    fn test_unregister() {
        let registry = MountRegistry::new();
        registry.register("secret", engine()).unwrap();

        let removed = registry.unregister("secret/").unwrap();
        assert_eq!(removed.prefix().as_str(), "secret");
        assert!(registry.resolve("secret/key").is_err());

        let err = registry.unregister("secret").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownMount);
    }

    #[test]
    fn test_snapshot_survives_unregister() {
        let registry = MountRegistry::new();
        registry.register("secret", engine()).unwrap();

        let snapshot = registry.snapshot();
        registry.unregister("secret").unwrap();

        assert!(snapshot.resolve("secret/key").is_ok());
        assert!(registry.resolve("secret/key").is_err());
    }

    #[test]
    fn test_nested_mount_registration_permitted() {
        let registry = MountRegistry::new();
        registry.register("a/b", engine()).unwrap();
        registry.register("a", engine()).unwrap();

        let mounts: Vec<String> = registry.mounts().iter().map(|p| p.to_string()).collect();
        assert_eq!(mounts, vec!["a", "a/b"]);
        assert_eq!(registry.resolve("a/b/c").unwrap().binding.prefix().as_str(), "a/b");
        assert_eq!(registry.resolve("a/c").unwrap().binding.prefix().as_str(), "a");
    }

    #[test]
    #[traced_test]
    fn test_registration_is_logged() {
        let registry = MountRegistry::new();
        registry.register("audit", engine()).unwrap();
        registry.unregister("audit").unwrap();

        assert!(logs_contain("Registering secret engine mount"));
        assert!(logs_contain("Unregistered secret engine mount"));
    }

    #[test]
    fn test_concurrent_register_and_resolve() {
        let registry = Arc::new(MountRegistry::new());
        registry.register("base", engine()).unwrap();

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        registry.register(&format!("w{}/m{}", i, j), engine()).unwrap();
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let resolution = registry.resolve("base/key").unwrap();
                        assert_eq!(resolution.remainder, "key");
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 201);
    }
}
