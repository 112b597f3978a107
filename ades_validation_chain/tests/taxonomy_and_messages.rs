// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation_chain::{
    tags, Conclusion, DefaultMessageCatalog, Indication, Message, MessageCatalog, MessageTag,
    SubIndication, TokenId, TokenKind,
};
use std::borrow::Cow;

#[test]
fn time_sensitive_reasons_are_indeterminate() {
    for sub in [
        SubIndication::OutOfBoundsNoPoe,
        SubIndication::OutOfBoundsNotRevoked,
        SubIndication::RevokedNoPoe,
        SubIndication::RevokedCaNoPoe,
        SubIndication::CryptoConstraintsFailureNoPoe,
        SubIndication::TryLater,
    ] {
        assert!(sub.is_time_sensitive(), "{sub}");
        assert_eq!(sub.indication(), Indication::Indeterminate, "{sub}");
    }
}

#[test]
fn certain_reasons_are_failed() {
    for sub in [
        SubIndication::FormatFailure,
        SubIndication::HashFailure,
        SubIndication::SigCryptoFailure,
        SubIndication::Revoked,
        SubIndication::NotYetValid,
    ] {
        assert!(!sub.is_time_sensitive(), "{sub}");
        assert_eq!(sub.indication(), Indication::Failed, "{sub}");
    }
}

#[test]
fn sub_indications_serialize_in_etsi_spelling() {
    let json = serde_json::to_string(&SubIndication::RevokedNoPoe).unwrap();
    assert_eq!(json, "\"REVOKED_NO_POE\"");
    assert_eq!(SubIndication::RevokedNoPoe.to_string(), "REVOKED_NO_POE");
}

#[test]
fn merge_notes_skips_duplicates() {
    let mut a = Conclusion::passed();
    a.warnings.push(Message::new(tags::ASCCM_ANS_3));

    let mut b = Conclusion::passed();
    b.warnings.push(Message::new(tags::ASCCM_ANS_3));
    b.infos.push(Message::new(tags::BBB_SAV_ISQPP_ANS));

    a.merge_notes(&b);
    assert_eq!(a.warnings.len(), 1);
    assert_eq!(a.infos.len(), 1);
}

#[test]
fn default_catalog_has_text_for_emitted_tags() {
    let catalog = DefaultMessageCatalog;
    for tag in [
        tags::BBB_FC_ISVADMDPD_ANS,
        tags::BBB_XCV_ISCR_ANS,
        tags::ASCCM_ANS_3,
        tags::PSV_IPSVC_ANS,
    ] {
        assert!(catalog.text(tag).is_some(), "{tag}");
        assert_ne!(catalog.render(tag), tag.as_str());
    }
}

struct Terse;

impl MessageCatalog for Terse {
    fn text(&self, tag: MessageTag) -> Option<Cow<'_, str>> {
        (tag == tags::BBB_CV_ISI).then(|| Cow::Borrowed("signature ok?"))
    }
}

#[test]
fn custom_catalog_falls_back_to_the_identifier() {
    assert_eq!(Terse.render(tags::BBB_CV_ISI), "signature ok?");
    assert_eq!(Terse.render(tags::BBB_CV_ISI_ANS), "BBB_CV_ISI_ANS");
}

#[test]
fn derived_token_ids_are_stable_and_kind_separated() {
    let a = TokenId::derived(TokenKind::Certificate, b"der bytes");
    let b = TokenId::derived(TokenKind::Certificate, b"der bytes");
    let c = TokenId::derived(TokenKind::Revocation, b"der bytes");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.as_str().starts_with("C-"));
    assert_eq!(a.as_str().len(), 2 + 64);
}
