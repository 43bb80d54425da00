//! Cloud provider region reference table.
//!
//! The table is injected into the validator rather than consulted as a global,
//! so grammars can be exercised against synthetic provider sets. The built-in
//! table covers aws, aws-us-gov, gcp, azure and azure-us-gov.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static BUILTIN_REGIONS: LazyLock<RegionTable> = LazyLock::new(|| {
    RegionTable::new()
        .with_provider(
            "aws",
            [
                "global",
                "us-east-1",
                "us-east-2",
                "us-west-1",
                "us-west-2",
                "ap-east-1",
                "ap-south-1",
                "ap-northeast-3",
                "ap-northeast-2",
                "ap-southeast-1",
                "ap-southeast-2",
                "ap-northeast-1",
                "ca-central-1",
                "cn-north-1",
                "cn-northwest-1",
                "eu-central-1",
                "eu-west-1",
                "eu-west-2",
                "eu-west-3",
                "eu-north-1",
                "me-south-1",
                "sa-east-1",
            ],
        )
        .with_provider("aws-us-gov", ["us-gov-east-1", "us-gov-west-1"])
        .with_provider(
            "gcp",
            [
                "global",
                "asia-east1",
                "asia-east2",
                "asia-northeast1",
                "asia-northeast2",
                "asia-south1",
                "asia-southeast1",
                "australia-southeast1",
                "europe-north1",
                "europe-west1",
                "europe-west2",
                "europe-west3",
                "europe-west4",
                "europe-west6",
                "northamerica-northeast1",
                "southamerica-east1",
                "us-central1",
                "us-east1",
                "us-east4",
                "us-west1",
                "us-west2",
            ],
        )
        .with_provider(
            "azure",
            [
                "global",
                "eastasia",
                "southeastasia",
                "centralus",
                "eastus",
                "eastus2",
                "westus",
                "northcentralus",
                "southcentralus",
                "northeurope",
                "westeurope",
                "japanwest",
                "japaneast",
                "brazilsouth",
                "australiaeast",
                "australiasoutheast",
                "southindia",
                "centralindia",
                "westindia",
                "canadacentral",
                "canadaeast",
                "uksouth",
                "ukwest",
                "westcentralus",
                "westus2",
                "koreacentral",
                "koreasouth",
                "francecentral",
                "francesouth",
                "australiacentral",
                "australiacentral2",
                "uaecentral",
                "uaenorth",
                "southafricanorth",
                "southafricawest",
                "switzerlandnorth",
                "switzerlandwest",
                "germanynorth",
                "germanywestcentral",
                "norwaywest",
                "norwayeast",
                "brazilsoutheast",
            ],
        )
        .with_provider(
            "azure-us-gov",
            ["usgovvirginia", "usgoviowa", "usgovarizona", "usgovtexas"],
        )
});

/// Mapping from cloud provider identifier to its valid regions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTable {
    providers: BTreeMap<String, BTreeSet<String>>,
}

impl RegionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in provider/region reference table
    pub fn builtin() -> &'static RegionTable {
        &BUILTIN_REGIONS
    }

    /// Add (or extend) a provider's regions
    pub fn with_provider<P, I, R>(mut self, provider: P, regions: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.insert_provider(provider, regions);
        self
    }

    /// Add (or extend) a provider's regions in place
    pub fn insert_provider<P, I, R>(&mut self, provider: P, regions: I)
    where
        P: Into<String>,
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.providers
            .entry(provider.into())
            .or_default()
            .extend(regions.into_iter().map(Into::into));
    }

    /// Whether the provider is known
    pub fn is_provider(&self, provider: &str) -> bool {
        self.providers.contains_key(provider)
    }

    /// Whether `region` belongs to this specific provider
    pub fn contains(&self, provider: &str, region: &str) -> bool {
        self.providers.get(provider).is_some_and(|regions| regions.contains(region))
    }

    /// Whether `region` belongs to any provider
    pub fn contains_any(&self, region: &str) -> bool {
        self.providers.values().any(|regions| regions.contains(region))
    }

    /// Known provider identifiers, sorted
    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
