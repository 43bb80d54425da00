//! Integration tests for the CSO path grammar
//!
//! Exercises every ring through the public `cso` entrypoints with the
//! built-in region table and with an injected one.

use std::sync::Arc;

use secretplane::cso::{self, CsoValidator, QualityLevel, RegionTable, Ring, SecretPath};
use secretplane::{ErrorKind, SecretPlaneError};

#[test]
fn test_infrastructure_region_must_belong_to_provider() {
    assert!(cso::validate("infra/aws/acme-prod/us-east-1/billing/db-password").is_ok());

    let err = cso::validate("infra/aws/acme-prod/mars-1/billing/db-password").unwrap_err();
    match err {
        SecretPlaneError::RingValidation { ring, index, segment, reason } => {
            assert_eq!(ring, Ring::Infrastructure);
            assert_eq!(index, 3);
            assert_eq!(segment, "mars-1");
            assert!(reason.contains("region"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // A real region of another provider is still rejected
    assert!(cso::validate("infra/gcp/acme-prod/us-east-1/billing/db-password").is_err());
}

#[test]
fn test_platform_region_from_any_provider() {
    assert!(cso::validate("platform/production/checkout/us-east-1/api/token").is_ok());
    assert!(cso::validate("platform/production/checkout/europe-west1/api/token").is_ok());

    let err = cso::validate("platform/production/checkout/nowhere/api/token").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RingValidation);
}

#[test]
fn test_product_version_must_be_semver() {
    assert!(cso::validate("product/payments/v2.3.1/key").is_ok());
    assert!(cso::validate("product/payments/V2.3.1-RC.1/key").is_ok());

    let err = cso::validate("product/payments/not-a-version/key").unwrap_err();
    assert!(err.to_string().contains("semver"));
}

#[test]
fn test_application_grammar() {
    let path = cso::parse("app/staging/checkout/payments/v1.0.0/worker/key").unwrap();
    assert_eq!(path.ring(), Ring::Application);
    match path {
        SecretPath::Application(app) => {
            assert_eq!(app.stage, QualityLevel::Staging);
            assert_eq!(app.platform_name, "checkout");
            assert_eq!(app.product_name, "payments");
            assert_eq!(app.product_version, "v1.0.0");
            assert_eq!(app.component_name, "worker");
            assert_eq!(app.key, "key");
        }
        other => panic!("unexpected path: {other:?}"),
    }

    // Missing the key segment
    let err = cso::validate("app/staging/checkout/payments/v1.0.0/worker").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RingValidation);

    let err = cso::validate("app/prod/checkout/payments/v1.0.0/worker/key").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RingValidation);
}

#[test]
fn test_error_kinds() {
    assert_eq!(cso::validate("").unwrap_err().kind(), ErrorKind::PathSyntax);
    assert_eq!(cso::validate("meta").unwrap_err().kind(), ErrorKind::PathSyntax);
    assert_eq!(cso::validate("meta/\u{1}/x").unwrap_err().kind(), ErrorKind::PathSyntax);
    assert_eq!(cso::validate("secret/app/key").unwrap_err().kind(), ErrorKind::UnknownRing);
    assert_eq!(cso::validate("artifact/docker").unwrap_err().kind(), ErrorKind::RingValidation);
}

#[test]
fn test_control_characters_in_raw_path_rejected() {
    for raw in ["meta/cso/key\t", "\nmeta/cso/key", "meta/cso\r/key", "meta/cso/key\u{c}", "meta/\t/key"] {
        let err = cso::validate(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathSyntax, "accepted {:?}", raw);
    }

    // Plain spaces around segments are still trimmed
    assert!(cso::validate(" meta / cso / key ").is_ok());
}

#[test]
fn test_normalisation_before_validation() {
    let raw = "  /infra//aws/ acme-prod /./us-east-1/billing/tmp/../db-password/ ";
    assert_eq!(cso::clean(raw), "infra/aws/acme-prod/us-east-1/billing/db-password");
    assert!(cso::validate(raw).is_ok());

    // ".." can shorten a path below its ring minimum
    assert!(cso::validate("meta/cso/key/../..").is_err());
}

#[test]
fn test_parsed_path_reserialises() {
    let inputs = [
        "meta/cso/bootstrap/token",
        "infra/azure/sub-1/eastus/keyvault",
        "platform/qa/edge/eu-west-1/cdn/tls/key",
        "product/payments/2.0.0/api",
        "app/dev/checkout/payments/v3.1.4/web/session/key",
        "artifact/oci/sha256-deadbeef/cosign",
    ];

    for input in inputs {
        let parsed = cso::parse(input).unwrap();
        let rendered = parsed.to_path_string();
        assert_eq!(rendered, input);
        assert_eq!(cso::parse(&rendered).unwrap(), parsed);
    }
}

#[test]
fn test_parsed_path_serialises_with_ring_tag() {
    let parsed = cso::parse("infra/aws/acme-prod/us-east-1/billing/db-password").unwrap();
    let json = serde_json::to_value(&parsed).unwrap();

    assert_eq!(json["ring"], "infrastructure");
    assert_eq!(json["cloud_provider"], "aws");
    assert_eq!(json["key"], "db-password");
}

#[test]
fn test_injected_region_table() {
    let validator = CsoValidator::new(Arc::new(
        RegionTable::new().with_provider("lab", ["rack-a", "rack-b"]).with_provider("edge", ["pop-1"]),
    ));

    assert!(validator.validate("infra/lab/acct/rack-b/vault").is_ok());
    assert!(validator.validate("infra/edge/acct/rack-b/vault").is_err());
    assert!(validator.validate("platform/dev/cdn/pop-1/origin/key").is_ok());
    assert!(validator.validate("platform/dev/cdn/us-east-1/origin/key").is_err());
}
