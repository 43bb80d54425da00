//! Ring grammars.
//!
//! Each ring defines an ordered field list with a rule per field and a
//! minimum segment count. Validation always runs on the [`clean`]ed form of
//! the input, so `validate(clean(p))` and `validate(p)` agree for every `p`.

use std::sync::{Arc, LazyLock};

use super::path::{
    clean, ApplicationPath, ArtifactPath, InfrastructurePath, MetaPath, PlatformPath,
    ProductPath, SecretPath,
};
use super::regions::RegionTable;
use super::ring::{QualityLevel, Ring};
use crate::errors::{Result, SecretPlaneError};

static DEFAULT_VALIDATOR: LazyLock<CsoValidator> =
    LazyLock::new(|| CsoValidator::new(Arc::new(RegionTable::builtin().clone())));

/// Validate a path against the built-in region table
pub fn validate(raw: &str) -> Result<()> {
    DEFAULT_VALIDATOR.validate(raw)
}

/// Parse a path against the built-in region table
pub fn parse(raw: &str) -> Result<SecretPath> {
    DEFAULT_VALIDATOR.parse(raw)
}

/// Validate a product version: case-insensitive, optional leading `v`, strict semver
pub fn parse_version(version: &str) -> std::result::Result<semver::Version, semver::Error> {
    let lowered = version.trim().to_lowercase();
    let stripped = lowered.strip_prefix('v').unwrap_or(&lowered);
    semver::Version::parse(stripped)
}

fn is_printable_ascii(c: char) -> bool {
    (' '..='~').contains(&c)
}

/// Path grammar bound to a region table
#[derive(Debug, Clone)]
pub struct CsoValidator {
    regions: Arc<RegionTable>,
}

impl Default for CsoValidator {
    fn default() -> Self {
        DEFAULT_VALIDATOR.clone()
    }
}

impl CsoValidator {
    pub fn new(regions: Arc<RegionTable>) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Check a raw path, discarding the parsed form
    pub fn validate(&self, raw: &str) -> Result<()> {
        self.parse(raw).map(|_| ())
    }

    /// Normalise, check and decode a raw path into its ring variant
    pub fn parse(&self, raw: &str) -> Result<SecretPath> {
        let cleaned = clean(raw);

        if cleaned.is_empty() {
            return Err(SecretPlaneError::path_syntax(cleaned, "path is empty"));
        }
        if let Some(c) = cleaned.chars().find(|c| !is_printable_ascii(*c)) {
            return Err(SecretPlaneError::path_syntax(
                cleaned.clone(),
                format!("non printable ASCII character {:?}", c),
            ));
        }

        let segments: Vec<&str> = cleaned.split('/').collect();
        if segments.len() < 2 {
            return Err(SecretPlaneError::path_syntax(
                cleaned.clone(),
                "secret path must contain at least 2 segments",
            ));
        }

        let ring: Ring =
            segments[0].parse().map_err(|_| SecretPlaneError::unknown_ring(segments[0]))?;

        let fields = Fields { ring, segments: &segments };
        fields.require_count()?;

        match ring {
            Ring::Meta => Ok(SecretPath::Meta(MetaPath {
                namespace: fields.required(1, "meta namespace")?,
                key: fields.tail(2),
            })),
            Ring::Infrastructure => self.parse_infrastructure(&fields),
            Ring::Platform => self.parse_platform(&fields),
            Ring::Product => Ok(SecretPath::Product(ProductPath {
                name: fields.required(1, "product name")?,
                version: fields.version(2)?,
                component_name: fields.required(3, "product component")?,
                key: fields.tail(4),
            })),
            Ring::Application => Ok(SecretPath::Application(ApplicationPath {
                stage: fields.stage(1)?,
                platform_name: fields.required(2, "platform name")?,
                product_name: fields.required(3, "product name")?,
                product_version: fields.version(4)?,
                component_name: fields.required(5, "component")?,
                key: fields.tail(6),
            })),
            Ring::Artifact => Ok(SecretPath::Artifact(ArtifactPath {
                r#type: fields.required(1, "artifact type")?,
                id: fields.required(2, "artifact id")?,
                key: fields.tail(3),
            })),
        }
    }

    fn parse_infrastructure(&self, fields: &Fields<'_>) -> Result<SecretPath> {
        let provider = fields.get(1);
        if !self.regions.is_provider(provider) {
            return Err(fields.error(1, format!("cloud provider ({}) not supported", provider)));
        }

        let account_id = fields.required(2, "cloud provider account")?;

        // Region must belong to this provider's own list.
        let region = fields.get(3);
        if !self.regions.contains(provider, region) {
            return Err(fields.error(
                3,
                format!(
                    "invalid region ({}) for account ({}) on cloud provider ({})",
                    region, account_id, provider
                ),
            ));
        }

        Ok(SecretPath::Infrastructure(InfrastructurePath {
            cloud_provider: provider.to_string(),
            account_id,
            region: region.to_string(),
            service_name: fields.required(4, "infrastructure service")?,
            key: fields.tail(5),
        }))
    }

    fn parse_platform(&self, fields: &Fields<'_>) -> Result<SecretPath> {
        let stage = fields.stage(1)?;
        let name = fields.required(2, "platform name")?;

        // No provider segment here, so any provider's region is accepted.
        let region = fields.get(3);
        if !self.regions.contains_any(region) {
            return Err(fields.error(3, format!("unable to find a region matching ({})", region)));
        }

        Ok(SecretPath::Platform(PlatformPath {
            stage,
            name,
            region: region.to_string(),
            service_name: fields.required(4, "platform service")?,
            key: fields.tail(5),
        }))
    }
}

/// Segment accessor for one ring; indexes are absolute (0 is the ring selector)
struct Fields<'a> {
    ring: Ring,
    segments: &'a [&'a str],
}

impl Fields<'_> {
    fn require_count(&self) -> Result<()> {
        let found = self.segments.len() - 1;
        let min = self.ring.min_segments();
        if found < min {
            return Err(SecretPlaneError::ring_validation(
                self.ring,
                self.segments.len(),
                "",
                format!(
                    "invalid part count for {} secret path, expected at least {} after the ring selector, found {}",
                    self.ring, min, found
                ),
            ));
        }
        Ok(())
    }

    fn get(&self, index: usize) -> &str {
        self.segments.get(index).copied().unwrap_or_default()
    }

    fn error(&self, index: usize, reason: String) -> SecretPlaneError {
        SecretPlaneError::ring_validation(self.ring, index, self.get(index), reason)
    }

    fn required(&self, index: usize, what: &str) -> Result<String> {
        let segment = self.get(index);
        if segment.is_empty() || !segment.chars().all(is_printable_ascii) {
            return Err(self.error(index, format!("unable to validate {} ({})", what, segment)));
        }
        Ok(segment.to_string())
    }

    fn stage(&self, index: usize) -> Result<QualityLevel> {
        self.get(index).parse().map_err(|reason| self.error(index, reason))
    }

    fn version(&self, index: usize) -> Result<String> {
        let version = self.get(index);
        parse_version(version).map_err(|e| {
            self.error(index, format!("version ({}) is not semver compliant: {}", version, e))
        })?;
        Ok(version.to_string())
    }

    fn tail(&self, from: usize) -> String {
        self.segments.get(from..).map(|rest| rest.join("/")).unwrap_or_default()
    }
}
