//! Ring selectors and quality levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six top level categories of a secret path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ring {
    /// Secrets about the secret system itself
    Meta,
    /// Cloud account level secrets
    Infrastructure,
    /// Platform instance secrets
    Platform,
    /// Product release secrets
    Product,
    /// Application deployment secrets
    Application,
    /// Build artifact secrets
    Artifact,
}

impl Ring {
    /// All rings, in ontology order
    pub const ALL: [Ring; 6] = [
        Ring::Meta,
        Ring::Infrastructure,
        Ring::Platform,
        Ring::Product,
        Ring::Application,
        Ring::Artifact,
    ];

    /// Path selector used as the first segment
    pub fn selector(&self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Infrastructure => "infra",
            Self::Platform => "platform",
            Self::Product => "product",
            Self::Application => "app",
            Self::Artifact => "artifact",
        }
    }

    /// Minimum number of segments after the ring selector
    pub fn min_segments(&self) -> usize {
        match self {
            Self::Meta => 2,
            Self::Infrastructure => 4,
            Self::Platform => 5,
            Self::Product => 3,
            Self::Application => 6,
            Self::Artifact => 2,
        }
    }
}

impl FromStr for Ring {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "meta" => Ok(Self::Meta),
            "infra" => Ok(Self::Infrastructure),
            "platform" => Ok(Self::Platform),
            "product" => Ok(Self::Product),
            "app" => Ok(Self::Application),
            "artifact" => Ok(Self::Artifact),
            _ => Err(format!("Unknown ring selector: {}", s)),
        }
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// Deployment grade shared by platform and application paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Production,
    Staging,
    Qa,
    Dev,
}

impl QualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Qa => "qa",
            Self::Dev => "dev",
        }
    }
}

impl FromStr for QualityLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "qa" => Ok(Self::Qa),
            "dev" => Ok(Self::Dev),
            _ => Err(format!("quality level ({}) is not supported", s)),
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
