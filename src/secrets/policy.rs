//! Write-time policies applied by the backend manager before a write
//! reaches an engine.

use std::fmt::Debug;

use super::codec::SecretValue;
use crate::cso::CsoValidator;
use crate::errors::Result;

/// Gate evaluated for every write, after routing and before packing
pub trait WritePolicy: Send + Sync + Debug {
    /// `path` is the normalised full path, `remainder` the mount-relative part
    fn check_write(&self, path: &str, remainder: &str, value: &SecretValue) -> Result<()>;
}

/// Rejects writes whose mount-relative path is not a valid CSO path
///
/// Reads, lists and deletes are never checked, so legacy data stays reachable.
#[derive(Debug, Clone, Default)]
pub struct CsoWritePolicy {
    validator: CsoValidator,
}

impl CsoWritePolicy {
    pub fn new(validator: CsoValidator) -> Self {
        Self { validator }
    }
}

impl WritePolicy for CsoWritePolicy {
    fn check_write(&self, _path: &str, remainder: &str, _value: &SecretValue) -> Result<()> {
        self.validator.validate(remainder)
    }
}
