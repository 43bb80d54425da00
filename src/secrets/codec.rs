//! # Secret Value Codec
//!
//! Canonical binary envelope for secret payloads. A payload is encoded as a
//! protobuf message wrapped in a `google.protobuf.Any`, so the envelope
//! carries its own type URL and binary bodies are never re-encoded as text.
//! The transport layer may Base64 the envelope once; nothing here does.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use prost::Message;
use prost_types::Any;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{Result, SecretPlaneError};

/// A payload type that can travel inside the envelope
pub trait Envelope: Message + Default {
    /// Type URL stamped into the envelope and checked on unpack
    const TYPE_URL: &'static str;

    /// Payload-level invariants, run before packing and after unpacking
    fn check(&self) -> Result<()> {
        Ok(())
    }
}

/// Typed secret payload: a format tag plus an opaque body
///
/// Both fields are zeroised on drop.
#[derive(Clone, PartialEq, Eq, Message, Zeroize, ZeroizeOnDrop)]
#[prost(skip_debug)]
pub struct SecretValue {
    /// Format of `body`, e.g. `jwk`, `pem` or `application/octet-stream`
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(bytes = "vec", tag = "2")]
    pub body: Vec<u8>,
}

impl SecretValue {
    pub fn new<T: Into<String>, B: Into<Vec<u8>>>(r#type: T, body: B) -> Self {
        Self { r#type: r#type.into(), body: body.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretValue")
            .field("type", &self.r#type)
            .field("body", &format_args!("<{} bytes redacted>", self.body.len()))
            .finish()
    }
}

impl Envelope for SecretValue {
    const TYPE_URL: &'static str = "type.googleapis.com/secretplane.v1.SecretValue";

    fn check(&self) -> Result<()> {
        if self.r#type.is_empty() && !self.body.is_empty() {
            return Err(SecretPlaneError::codec("secret value type must be set when body is not empty"));
        }
        Ok(())
    }
}

/// Key/value secret payload, as stored by KV style mounts
///
/// `BTreeMap` has no `Zeroize` impl, so values are cleared by hand on drop.
#[derive(Clone, PartialEq, Eq, Message)]
#[prost(skip_debug)]
pub struct SecretMap {
    #[prost(btree_map = "string, bytes", tag = "1")]
    pub entries: BTreeMap<String, Vec<u8>>,
}

impl SecretMap {
    pub fn insert<K: Into<String>, V: Into<Vec<u8>>>(&mut self, key: K, value: V) {
        self.entries.insert(key.into(), value.into());
    }
}

impl fmt::Debug for SecretMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretMap").field("keys", &self.entries.keys().collect::<Vec<_>>()).finish()
    }
}

impl Drop for SecretMap {
    fn drop(&mut self) {
        self.entries.values_mut().for_each(|value| value.zeroize());
    }
}

impl Envelope for SecretMap {
    const TYPE_URL: &'static str = "type.googleapis.com/secretplane.v1.SecretMap";
}

/// Encode a payload into its canonical envelope
///
/// The intermediate payload buffer is zeroised; the returned envelope is the
/// caller's to protect.
pub fn pack<T: Envelope>(value: &T) -> Result<Bytes> {
    value.check()?;
    let mut envelope = Any { type_url: T::TYPE_URL.to_string(), value: value.encode_to_vec() };
    let packed = Bytes::from(envelope.encode_to_vec());
    envelope.value.zeroize();
    Ok(packed)
}

/// Decode an envelope, failing on truncation, malformed input or a type mismatch
pub fn unpack<T: Envelope>(input: &[u8]) -> Result<T> {
    if input.is_empty() {
        return Err(SecretPlaneError::codec("empty envelope"));
    }

    let mut envelope = Any::decode(input)
        .map_err(|e| SecretPlaneError::codec_with_source("malformed envelope", e))?;
    if envelope.type_url != T::TYPE_URL {
        envelope.value.zeroize();
        return Err(SecretPlaneError::codec(format!(
            "type mismatch: expected {}, found {}",
            T::TYPE_URL,
            envelope.type_url
        )));
    }

    // The payload copy is cleared whether or not it decodes
    let decoded = T::decode(envelope.value.as_slice());
    envelope.value.zeroize();
    let value =
        decoded.map_err(|e| SecretPlaneError::codec_with_source("malformed payload", e))?;
    value.check()?;
    Ok(value)
}

/// Decode an envelope into an existing value, leaving it untouched on failure
pub fn unpack_into<T: Envelope>(input: &[u8], out: &mut T) -> Result<()> {
    *out = unpack(input)?;
    Ok(())
}
