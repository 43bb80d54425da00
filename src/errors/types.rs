//! # Error Types
//!
//! Error types for secret addressing, mount routing and value encoding using `thiserror`.

use std::fmt;

use crate::cso::Ring;
use crate::secrets::EngineError;

/// Custom result type for secretplane operations
pub type Result<T> = std::result::Result<T, SecretPlaneError>;

/// Main error type for the secretplane core
#[derive(thiserror::Error, Debug)]
pub enum SecretPlaneError {
    /// Malformed raw path (empty, non printable ASCII, too few segments)
    #[error("Invalid secret path '{path}': {reason}")]
    PathSyntax { path: String, reason: String },

    /// First path segment is not a known ring selector
    #[error("Invalid ring value ({ring})")]
    UnknownRing { ring: String },

    /// A ring specific field failed its rule
    #[error("Invalid {ring} secret path, segment {index} ('{segment}'): {reason}")]
    RingValidation { ring: Ring, index: usize, segment: String, reason: String },

    /// Registration on an already bound prefix
    #[error("Mount already registered: {prefix}")]
    DuplicateMount { prefix: String },

    /// Unregistration of a prefix that is not bound
    #[error("Mount not registered: {prefix}")]
    UnknownMount { prefix: String },

    /// No registered mount claims the path
    #[error("No mount found for path '{path}'")]
    NoMount { path: String },

    /// Malformed or truncated value envelope
    #[error("Unable to unpack secret value: {message}")]
    Codec {
        message: String,
        #[source]
        source: Option<prost::DecodeError>,
    },

    /// Engine level failure, tagged with the caller's raw path
    #[error("Engine error on '{path}': {source}")]
    Engine {
        path: String,
        #[source]
        source: EngineError,
    },

    /// The caller cancelled the operation before it reached an engine
    #[error("Operation on '{path}' cancelled")]
    Cancelled { path: String },

    /// Engine URL with a scheme no engine factory handles
    #[error("Unsupported engine URL: {url}")]
    UnsupportedEngine { url: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Coarse error classification, stable across message wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PathSyntax,
    UnknownRing,
    RingValidation,
    DuplicateMount,
    UnknownMount,
    NoMount,
    Codec,
    Engine,
    Cancelled,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::PathSyntax => "path_syntax",
            ErrorKind::UnknownRing => "unknown_ring",
            ErrorKind::RingValidation => "ring_validation",
            ErrorKind::DuplicateMount => "duplicate_mount",
            ErrorKind::UnknownMount => "unknown_mount",
            ErrorKind::NoMount => "no_mount",
            ErrorKind::Codec => "codec",
            ErrorKind::Engine => "engine",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Config => "config",
        };
        f.write_str(name)
    }
}

impl SecretPlaneError {
    /// Create a path syntax error
    pub fn path_syntax<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        Self::PathSyntax { path: path.into(), reason: reason.into() }
    }

    /// Create an unknown ring error
    pub fn unknown_ring<S: Into<String>>(ring: S) -> Self {
        Self::UnknownRing { ring: ring.into() }
    }

    /// Create a ring validation error for the segment at `index`
    pub fn ring_validation<S: Into<String>, R: Into<String>>(
        ring: Ring,
        index: usize,
        segment: S,
        reason: R,
    ) -> Self {
        Self::RingValidation { ring, index, segment: segment.into(), reason: reason.into() }
    }

    /// Create a duplicate mount error
    pub fn duplicate_mount<S: Into<String>>(prefix: S) -> Self {
        Self::DuplicateMount { prefix: prefix.into() }
    }

    /// Create an unknown mount error
    pub fn unknown_mount<S: Into<String>>(prefix: S) -> Self {
        Self::UnknownMount { prefix: prefix.into() }
    }

    /// Create a routing failure
    pub fn no_mount<S: Into<String>>(path: S) -> Self {
        Self::NoMount { path: path.into() }
    }

    /// Create a codec error
    pub fn codec<S: Into<String>>(message: S) -> Self {
        Self::Codec { message: message.into(), source: None }
    }

    /// Create a codec error from a protobuf decode failure
    pub fn codec_with_source<S: Into<String>>(message: S, source: prost::DecodeError) -> Self {
        Self::Codec { message: message.into(), source: Some(source) }
    }

    /// Wrap an engine error with the raw path the caller asked for
    pub fn engine<S: Into<String>>(path: S, source: EngineError) -> Self {
        Self::Engine { path: path.into(), source }
    }

    /// Create a cancellation error
    pub fn cancelled<S: Into<String>>(path: S) -> Self {
        Self::Cancelled { path: path.into() }
    }

    /// Create an unsupported engine error
    pub fn unsupported_engine<S: Into<String>>(url: S) -> Self {
        Self::UnsupportedEngine { url: url.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Classify this error.
    ///
    /// An engine failure caused by cancellation reports [`ErrorKind::Cancelled`]
    /// even though it keeps its engine wrapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PathSyntax { .. } => ErrorKind::PathSyntax,
            Self::UnknownRing { .. } => ErrorKind::UnknownRing,
            Self::RingValidation { .. } => ErrorKind::RingValidation,
            Self::DuplicateMount { .. } => ErrorKind::DuplicateMount,
            Self::UnknownMount { .. } => ErrorKind::UnknownMount,
            Self::NoMount { .. } => ErrorKind::NoMount,
            Self::Codec { .. } => ErrorKind::Codec,
            Self::Engine { source: EngineError::Cancelled, .. } => ErrorKind::Cancelled,
            Self::Engine { .. } => ErrorKind::Engine,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::UnsupportedEngine { .. } | Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Check if this error should be retried
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Engine { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Whether an upstream layer should report this as "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoMount { .. } | Self::Engine { source: EngineError::NotFound { .. }, .. })
    }

    /// Get the HTTP status code a transport layer should map this error to
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PathSyntax { .. } | Self::UnknownRing { .. } | Self::RingValidation { .. } => 400,
            Self::DuplicateMount { .. } => 409,
            Self::UnknownMount { .. } | Self::NoMount { .. } => 404,
            Self::Codec { .. } => 500,
            Self::Engine { source, .. } => source.status_code(),
            Self::Cancelled { .. } => 499,
            Self::UnsupportedEngine { .. } | Self::Config { .. } => 500,
        }
    }
}

impl From<config::ConfigError> for SecretPlaneError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for SecretPlaneError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        // Nested struct and list errors only show up in the Display form
        if message.is_empty() {
            return Self::config(format!("Validation failed: {}", errors));
        }
        Self::config(format!("Validation failed: {}", message))
    }
}
