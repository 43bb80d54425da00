//! Path normalisation and the typed secret path.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ring::{QualityLevel, Ring};

/// Normalise a raw slash-delimited path.
///
/// Redundant separators collapse, each segment is trimmed of spaces (control
/// characters such as tabs are kept so validation can reject them), empty and `.` segments are dropped and `..` removes the previous segment
/// (never climbing above the first one). The result has no leading or trailing
/// slash. `clean(clean(p)) == clean(p)` for every input.
pub fn clean(raw: &str) -> String {
    split_segments(raw).join("/")
}

/// Normalised segments of a raw path, see [`clean`]
pub fn split_segments(raw: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment.trim_matches(' ') {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments
}

/// Join a fixed field list with an optional free-form key tail
fn join_path(ring: Ring, fields: &[&str], key: &str) -> String {
    let mut out = String::from(ring.selector());
    for field in fields {
        out.push('/');
        out.push_str(field);
    }
    if !key.is_empty() {
        out.push('/');
        out.push_str(key);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaPath {
    pub namespace: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfrastructurePath {
    pub cloud_provider: String,
    pub account_id: String,
    pub region: String,
    pub service_name: String,
    /// Remaining segments, may be empty
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPath {
    pub stage: QualityLevel,
    pub name: String,
    pub region: String,
    pub service_name: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPath {
    pub name: String,
    pub version: String,
    pub component_name: String,
    /// Remaining segments, may be empty
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPath {
    pub stage: QualityLevel,
    pub platform_name: String,
    pub product_name: String,
    pub product_version: String,
    pub component_name: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPath {
    pub r#type: String,
    pub id: String,
    /// Remaining segments, may be empty
    pub key: String,
}

/// A validated Common Secret Ontology path, one variant per ring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ring", rename_all = "snake_case")]
pub enum SecretPath {
    Meta(MetaPath),
    Infrastructure(InfrastructurePath),
    Platform(PlatformPath),
    Product(ProductPath),
    Application(ApplicationPath),
    Artifact(ArtifactPath),
}

impl SecretPath {
    /// Ring discriminator
    pub fn ring(&self) -> Ring {
        match self {
            Self::Meta(_) => Ring::Meta,
            Self::Infrastructure(_) => Ring::Infrastructure,
            Self::Platform(_) => Ring::Platform,
            Self::Product(_) => Ring::Product,
            Self::Application(_) => Ring::Application,
            Self::Artifact(_) => Ring::Artifact,
        }
    }

    /// Re-serialise to the canonical slash-delimited form
    pub fn to_path_string(&self) -> String {
        let ring = self.ring();
        match self {
            Self::Meta(p) => join_path(ring, &[&p.namespace], &p.key),
            Self::Infrastructure(p) => join_path(
                ring,
                &[&p.cloud_provider, &p.account_id, &p.region, &p.service_name],
                &p.key,
            ),
            Self::Platform(p) => join_path(
                ring,
                &[p.stage.as_str(), &p.name, &p.region, &p.service_name],
                &p.key,
            ),
            Self::Product(p) => {
                join_path(ring, &[&p.name, &p.version, &p.component_name], &p.key)
            }
            Self::Application(p) => join_path(
                ring,
                &[
                    p.stage.as_str(),
                    &p.platform_name,
                    &p.product_name,
                    &p.product_version,
                    &p.component_name,
                ],
                &p.key,
            ),
            Self::Artifact(p) => join_path(ring, &[&p.r#type, &p.id], &p.key),
        }
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_string())
    }
}
