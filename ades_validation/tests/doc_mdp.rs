// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation::diagnostic::PdfRevisionFacts;
use ades_validation::report::BlockKind;
use ades_validation::DocumentValidator;
use ades_validation_chain::{tags, Indication, SubIndication, ValidationPolicy};
use ades_validation_test_utils::*;

#[derive(Clone, Copy)]
enum Change {
    None,
    FormFill,
    Annotation,
    Undefined,
}

fn pdf(permission: u8, change: Change) -> PdfRevisionFacts {
    let mut facts = PdfRevisionFacts {
        doc_mdp_permission: Some(permission),
        ..PdfRevisionFacts::default()
    };
    let object = vec!["12 0 obj".to_string()];
    match change {
        Change::None => {}
        Change::FormFill => facts.form_fill_changes = object,
        Change::Annotation => facts.annotation_changes = object,
        Change::Undefined => facts.undefined_changes = object,
    }
    facts
}

fn format_indication(permission: u8, change: Change) -> (Indication, Option<SubIndication>) {
    let mut data = valid_signature_scenario();
    data.signatures[0].pdf = Some(pdf(permission, change));
    let report = DocumentValidator::new(ValidationPolicy::default())
        .validate(&data)
        .unwrap();
    let fc = report.signatures[0]
        .basic_building_blocks
        .block(BlockKind::FormatChecking)
        .unwrap();
    (fc.conclusion().indication, fc.conclusion().sub_indication)
}

const FORMAT_FAILURE: (Indication, Option<SubIndication>) =
    (Indication::Failed, Some(SubIndication::FormatFailure));
const PASSED: (Indication, Option<SubIndication>) = (Indication::Passed, None);

#[test]
fn no_change_permission_rejects_every_modification() {
    assert_eq!(format_indication(1, Change::None), PASSED);
    assert_eq!(format_indication(1, Change::FormFill), FORMAT_FAILURE);
    assert_eq!(format_indication(1, Change::Annotation), FORMAT_FAILURE);
    assert_eq!(format_indication(1, Change::Undefined), FORMAT_FAILURE);
}

#[test]
fn minimal_permission_allows_form_fill_only() {
    assert_eq!(format_indication(2, Change::FormFill), PASSED);
    assert_eq!(format_indication(2, Change::Annotation), FORMAT_FAILURE);
    assert_eq!(format_indication(2, Change::Undefined), FORMAT_FAILURE);
}

#[test]
fn changes_permitted_rejects_only_undefined_changes() {
    assert_eq!(format_indication(3, Change::FormFill), PASSED);
    assert_eq!(format_indication(3, Change::Annotation), PASSED);
    assert_eq!(format_indication(3, Change::Undefined), FORMAT_FAILURE);
}

#[test]
fn undefined_changes_without_certification_only_warn() {
    let mut data = valid_signature_scenario();
    data.signatures[0].pdf = Some(PdfRevisionFacts {
        undefined_changes: vec!["7 0 obj".to_string()],
        ..PdfRevisionFacts::default()
    });

    let report = DocumentValidator::new(ValidationPolicy::default())
        .validate(&data)
        .unwrap();
    let sig = &report.signatures[0];
    assert_eq!(sig.indication(), Indication::Passed);
    assert!(sig
        .conclusion
        .warnings
        .iter()
        .any(|w| w.tag == tags::BBB_FC_DSCNUOM_ANS && w.detail.as_deref() == Some("7 0 obj")));

    let fc = sig
        .basic_building_blocks
        .block(BlockKind::FormatChecking)
        .unwrap();
    assert!(fc.result().constraints.find("doc_mdp").is_none());
}

#[test]
fn structural_failure_carries_the_parser_messages() {
    let mut data = valid_signature_scenario();
    data.signatures[0].structurally_valid = false;
    data.signatures[0].structural_messages = vec!["missing ByteRange".to_string()];

    let report = DocumentValidator::new(ValidationPolicy::default())
        .validate(&data)
        .unwrap();
    let sig = &report.signatures[0];
    assert_eq!(sig.sub_indication(), Some(SubIndication::FormatFailure));
    assert_eq!(
        sig.conclusion.errors[0].detail.as_deref(),
        Some("missing ByteRange")
    );
}
