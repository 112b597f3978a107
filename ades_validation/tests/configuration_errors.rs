// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation::diagnostic::PdfRevisionFacts;
use ades_validation::DocumentValidator;
use ades_validation_chain::policy::{Level, TimeConstraint, TimeUnit};
use ades_validation_chain::{Indication, ValidationError, ValidationPolicy, ValidationPolicyBuilder};
use ades_validation_test_utils::*;

fn validate(
    policy: ValidationPolicy,
    data: &ades_validation::DiagnosticData,
) -> Result<ades_validation::DetailedReport, ValidationError> {
    DocumentValidator::new(policy).validate(data)
}

#[test]
fn unknown_certificate_reference_is_an_error() {
    let mut data = valid_signature_scenario();
    data.certificates[1].issuer = Some(token("C-MISSING"));

    let err = validate(ValidationPolicy::default(), &data).unwrap_err();
    assert_eq!(err, ValidationError::UnknownToken(token("C-MISSING")));
}

#[test]
fn unknown_timestamp_reference_is_an_error() {
    let mut data = valid_signature_scenario();
    data.signatures[0].timestamps.push(token("T-MISSING"));

    let err = validate(ValidationPolicy::default(), &data).unwrap_err();
    assert_eq!(err, ValidationError::UnknownToken(token("T-MISSING")));
}

#[test]
fn counter_signature_needs_a_counter_signature_policy() {
    let mut data = valid_signature_scenario();
    let mut counter = signature("S-COUNTER", ids::SIGNER, signing_time());
    counter.counter_signature_of = Some(token(ids::SIGNATURE));
    data.signatures.push(counter);

    let err = validate(ValidationPolicy::default(), &data).unwrap_err();
    assert_eq!(
        err,
        ValidationError::UndefinedConstraint("counter_signature".to_string())
    );

    let policy = ValidationPolicyBuilder::new()
        .with_counter_signature(|_| {})
        .build()
        .unwrap();
    let report = validate(policy, &data).unwrap();
    let counter = report.signature(&token("S-COUNTER")).unwrap();
    assert_eq!(counter.counter_signature_of, Some(token(ids::SIGNATURE)));
    assert_eq!(counter.indication(), Indication::Passed);
}

#[test]
fn unsupported_doc_mdp_permission_is_an_error() {
    let mut data = valid_signature_scenario();
    data.signatures[0].pdf = Some(PdfRevisionFacts {
        doc_mdp_permission: Some(7),
        ..PdfRevisionFacts::default()
    });

    let err = validate(ValidationPolicy::default(), &data).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::UnsupportedValue { ref value, .. } if value == "7"
    ));
}

#[test]
fn timestamp_without_covered_objects_is_an_error() {
    let mut data = expired_signer_scenario();
    data.timestamps[0].covered_objects.clear();

    let err = validate(ValidationPolicy::default(), &data).unwrap_err();
    assert!(matches!(err, ValidationError::MissingFacts(_)));
}

#[test]
fn invalid_policy_is_rejected_before_evaluation() {
    let mut policy = ValidationPolicy::default();
    policy.signature.basic_signature.signing_certificate.revocation_freshness =
        Some(TimeConstraint::new(Level::Fail, TimeUnit::Hours, -4));

    let err = validate(policy, &valid_signature_scenario()).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidConstraint { .. }));
}

#[test]
fn negative_findings_are_not_errors() {
    let mut data = valid_signature_scenario();
    data.signatures[0].digest_matchers.clear();
    data.signatures[0].signing_certificate_candidates.clear();

    let report = validate(ValidationPolicy::default(), &data).unwrap();
    assert_eq!(report.signatures.len(), 1);
    assert_ne!(report.signatures[0].indication(), Indication::Passed);
}
