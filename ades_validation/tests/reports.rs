// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation::render::render_text;
use ades_validation::{DiagnosticData, DocumentValidator};
use ades_validation_chain::{
    tags, DefaultMessageCatalog, Indication, MessageCatalog, MessageTag, SubIndication,
    ValidationPolicy,
};
use ades_validation_test_utils::*;
use std::borrow::Cow;

/// The LTA facts plus an untimestamped second signature by the same signer.
fn two_signatures() -> DiagnosticData {
    let mut data = archive_timestamp_scenario();
    let mut second = data.signatures[0].clone();
    second.id = token("S-2");
    second.timestamps.clear();
    data.signatures.push(second);
    data
}

#[test]
fn repeated_validation_is_deterministic() {
    let data = archive_timestamp_scenario();
    let validator = DocumentValidator::new(ValidationPolicy::default());

    let a = validator.validate(&data).unwrap();
    let b = validator.validate(&data).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn parallel_signatures_match_sequential_ones() {
    let data = two_signatures();

    let sequential = DocumentValidator::new(ValidationPolicy::default())
        .validate(&data)
        .unwrap();
    let parallel = DocumentValidator::new(ValidationPolicy::default())
        .with_options(|o| o.parallel = true)
        .validate(&data)
        .unwrap();

    assert_eq!(sequential, parallel);
    let order: Vec<_> = parallel.signatures.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(order, vec![ids::SIGNATURE, "S-2"]);
}

#[test]
fn parallel_validation_propagates_errors() {
    let mut data = two_signatures();
    data.signatures[1].counter_signature_of = Some(token(ids::SIGNATURE));

    let err = DocumentValidator::new(ValidationPolicy::default())
        .with_options(|o| o.parallel = true)
        .validate(&data)
        .unwrap_err();
    assert_eq!(
        err,
        ades_validation_chain::ValidationError::UndefinedConstraint("counter_signature".into())
    );
}

#[test]
fn simple_report_summarises_each_signature() {
    let data = two_signatures();
    let report = DocumentValidator::new(ValidationPolicy::default())
        .validate(&data)
        .unwrap();
    let simple = report.simple_report();

    assert_eq!(simple.signatures_count, 2);
    assert_eq!(simple.valid_signatures, 1);
    assert_eq!(simple.policy_name, "default");
    assert_eq!(simple.validation_time, data.validation_time);

    let first = &simple.signatures[0];
    assert_eq!(first.indication, Indication::Passed);
    assert_eq!(first.control_time, Some(lta_signature_timestamp_time()));
    assert_eq!(first.format, "PAdES-BASELINE-LTA");

    let second = &simple.signatures[1];
    assert_eq!(second.indication, Indication::Indeterminate);
    assert_eq!(second.sub_indication, Some(SubIndication::OutOfBoundsNotRevoked));
    assert_eq!(second.errors, vec![tags::PSV_IPSVC_ANS]);
    assert_eq!(second.control_time, None);
}

#[test]
fn detailed_report_serializes_block_variants_by_name() {
    let report = DocumentValidator::new(ValidationPolicy::default())
        .validate(&expired_signer_scenario())
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let blocks = &json["signatures"][0]["basic_building_blocks"]["blocks"];
    assert_eq!(blocks[0]["block"], "FormatChecking");
    assert_eq!(blocks[2]["block"], "X509CertificateValidation");
    assert_eq!(
        json["signatures"][0]["basic_building_blocks"]["conclusion"]["sub_indication"],
        "OUT_OF_BOUNDS_NOT_REVOKED"
    );
    assert_eq!(json["signatures"][0]["conclusion"]["indication"], "PASSED");
}

#[test]
fn rendering_uses_the_supplied_catalog() {
    let report = DocumentValidator::new(ValidationPolicy::default())
        .validate(&revoked_signer_scenario())
        .unwrap();

    let text = render_text(&report, &DefaultMessageCatalog);
    assert!(text.contains("Signature S-1"));
    assert!(text.contains("INDETERMINATE / REVOKED_NO_POE"));
    assert!(text.contains(DefaultMessageCatalog.render(tags::BBB_XCV_ISCR_ANS).as_str()));
    assert!(!text.contains("BBB_XCV_ISCR"));
}

struct IdentifiersOnly;

impl MessageCatalog for IdentifiersOnly {
    fn text(&self, _tag: MessageTag) -> Option<Cow<'_, str>> {
        None
    }
}

#[test]
fn rendering_falls_back_to_identifiers() {
    let report = DocumentValidator::new(ValidationPolicy::default())
        .validate(&revoked_signer_scenario())
        .unwrap();

    let text = render_text(&report, &IdentifiersOnly);
    assert!(text.contains("BBB_XCV_ISCR"));
    assert!(text.contains("PSV_IPSVC_ANS"));
}
