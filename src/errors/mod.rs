//! # Error Handling
//!
//! This module provides error handling for the secretplane core.
//! Every failure is returned as a [`SecretPlaneError`]; nothing in the
//! routing or validation paths panics.

pub mod types;

pub use types::{ErrorKind, Result, SecretPlaneError};
