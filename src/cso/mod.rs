//! # Common Secret Ontology
//!
//! Secrets are addressed by what kind of thing owns them rather than by
//! operator-chosen paths. Every path starts with one of six ring selectors:
//!
//! ```text
//! meta/<namespace>/<key...>
//! infra/<provider>/<account>/<region>/<service>[/<key...>]
//! platform/<stage>/<name>/<region>/<service>/<key...>
//! product/<name>/<version>/<component>[/<key...>]
//! app/<stage>/<platform>/<product>/<version>/<component>/<key...>
//! artifact/<type>/<id>[/<key...>]
//! ```
//!
//! Use [`validate`] for a yes/no answer, [`parse`] for the typed
//! [`SecretPath`], or a [`CsoValidator`] bound to a custom [`RegionTable`].

pub mod path;
pub mod regions;
pub mod ring;
pub mod validator;

pub use path::{
    clean, split_segments, ApplicationPath, ArtifactPath, InfrastructurePath, MetaPath,
    PlatformPath, ProductPath, SecretPath,
};
pub use regions::RegionTable;
pub use ring::{QualityLevel, Ring};
pub use validator::{parse, parse_version, validate, CsoValidator};
