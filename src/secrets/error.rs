//! Error types reported by secret engines.
//!
//! The routing core treats these as opaque: it wraps them with the caller's
//! raw path and never translates one kind into another.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors that can occur inside a secret engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Nothing stored at the mount-relative path.
    #[error("Secret not found: {path}")]
    NotFound { path: String },

    /// The engine cannot address this mount-relative path.
    #[error("Invalid secret path: {path} - {reason}")]
    InvalidPath { path: String, reason: String },

    /// The operation observed the caller's cancellation signal.
    #[error("Operation cancelled")]
    Cancelled,

    /// The engine is temporarily unreachable.
    #[error("Engine unavailable: {message}")]
    Unavailable { message: String },

    /// Engine-specific error.
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl EngineError {
    /// Create a not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into(), reason: reason.into() }
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into() }
    }

    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }

    /// Unavailability and opaque backend failures may be transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Backend { .. })
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidPath { .. } => 400,
            Self::Cancelled => 499,
            Self::Unavailable { .. } => 503,
            Self::Backend { .. } => 500,
        }
    }
}
