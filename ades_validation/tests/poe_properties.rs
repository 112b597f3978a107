// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation::diagnostic::{DiagnosticData, TimestampKind};
use ades_validation::poe::{PoeRegistry, PoeSource};
use ades_validation::DocumentValidator;
use ades_validation_chain::{TokenId, TokenKind, ValidationPolicy};
use ades_validation_test_utils::*;
use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

fn base() -> DateTime<Utc> {
    utc(2020, 1, 1, 0)
}

proptest! {
    #[test]
    fn poe_queries_bound_recorded_times(
        offsets in prop::collection::vec(0i64..10_000, 0..20),
        bound in 0i64..10_000,
    ) {
        let poe = PoeRegistry::new(base() + Duration::hours(20_000));
        let object = TokenId::new("S-1");
        for (i, o) in offsets.iter().enumerate() {
            poe.record(
                &object,
                base() + Duration::hours(*o),
                PoeSource::Timestamp(TokenId::new(format!("T-{i}"))),
            );
        }

        let at = base() + Duration::hours(bound);
        let eligible: Vec<_> = offsets
            .iter()
            .filter(|o| **o <= bound)
            .map(|o| base() + Duration::hours(*o))
            .collect();

        prop_assert_eq!(poe.earliest(&object, at), eligible.iter().min().copied());
        prop_assert_eq!(poe.latest_at_or_before(&object, at), eligible.iter().max().copied());
        prop_assert_eq!(poe.has_poe(&object, at), !eligible.is_empty());

        let times = poe.poe_times(&object, at);
        prop_assert!(times.windows(2).all(|w| w[0] > w[1]));
        prop_assert_eq!(times.first().copied(), eligible.iter().max().copied());
    }

    #[test]
    fn validation_time_is_an_implicit_poe(offsets in prop::collection::vec(0i64..10_000, 0..5)) {
        let validation_time = base() + Duration::hours(20_000);
        let poe = PoeRegistry::new(validation_time);
        let object = TokenId::new("C-1");
        for o in &offsets {
            poe.record(&object, base() + Duration::hours(*o), PoeSource::ValidationTime);
        }

        prop_assert_eq!(poe.latest_at_or_before(&object, validation_time), Some(validation_time));
        prop_assert!(poe.has_poe(&TokenId::new("never-recorded"), validation_time));
        prop_assert_eq!(poe.earliest(&TokenId::new("never-recorded"), base()), None);
    }
}

#[test]
fn recording_the_same_entry_twice_is_a_no_op() {
    let poe = PoeRegistry::new(utc(2025, 1, 1, 0));
    let object = TokenId::new("S-1");
    let source = PoeSource::Timestamp(TokenId::new("T-1"));

    poe.record(&object, utc(2024, 1, 1, 0), source.clone());
    poe.record(&object, utc(2024, 1, 1, 0), source);
    assert_eq!(poe.records(&object).len(), 1);
}

/// Expired signer certificate with signature time-stamps at `hours` after mid-2020; each
/// time-stamp covers the signature, the signer certificate and an OCSP response produced one
/// hour before it.
fn timestamped_expired_signer(hours: &[i64]) -> DiagnosticData {
    let validation_time = utc(2025, 6, 1, 0);
    let start = utc(2020, 6, 1, 0);

    let mut data = DiagnosticData {
        validation_time,
        certificates: vec![
            root_certificate(ids::ROOT),
            signer_certificate(ids::SIGNER, ids::ROOT, signer_not_before(), signer_not_after()),
            tsa_certificate(ids::TSA, ids::ROOT, utc(2019, 1, 1, 0), utc(2030, 1, 1, 0)),
        ],
        revocations: vec![crl_good(ids::TSA_CRL, ids::TSA, validation_time - Duration::days(1))],
        ..DiagnosticData::default()
    };

    let mut sig = signature(ids::SIGNATURE, ids::SIGNER, start);
    for (i, h) in hours.iter().enumerate() {
        let at = start + Duration::hours(*h);
        let ts_id = format!("T-{i}");
        let ocsp_id = format!("R-OCSP-{i}");
        data.revocations
            .push(ocsp_good(&ocsp_id, ids::SIGNER, at - Duration::hours(1)));
        data.timestamps.push(timestamp(
            &ts_id,
            TimestampKind::Signature,
            ids::TSA,
            at,
            &[
                (ids::SIGNATURE, TokenKind::Signature),
                (ids::SIGNER, TokenKind::Certificate),
                (ocsp_id.as_str(), TokenKind::Revocation),
            ],
        ));
        sig.timestamps.push(token(&ts_id));
    }
    data.signatures.push(sig);
    data
}

fn signer_not_before() -> DateTime<Utc> {
    utc(2021, 1, 1, 0)
}

fn signer_not_after() -> DateTime<Utc> {
    utc(2023, 6, 1, 0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn control_time_is_non_increasing_and_the_latest_passing_candidate(
        hours in prop::collection::vec(0i64..35_000, 1..6),
    ) {
        let data = timestamped_expired_signer(&hours);
        let report = DocumentValidator::new(ValidationPolicy::default())
            .validate(&data)
            .unwrap();

        let sig = &report.signatures[0];
        let past = sig.past_validation.as_ref().expect("expired signer triggers past validation");

        let tried: Vec<_> = past.attempts.iter().map(|a| a.control_time).collect();
        prop_assert!(tried.windows(2).all(|w| w[0] > w[1]));
        prop_assert!(tried.iter().all(|t| *t < data.validation_time));
        prop_assert!(past
            .attempts
            .iter()
            .all(|a| a.blocks.iter().all(|b| b.control_time() == Some(a.control_time))));

        let start = utc(2020, 6, 1, 0);
        let expected = hours
            .iter()
            .map(|h| start + Duration::hours(*h))
            .filter(|t| *t >= signer_not_before() && *t <= signer_not_after())
            .max();

        prop_assert_eq!(past.control_time, expected);
        prop_assert_eq!(past.conclusion.is_passed(), expected.is_some());
        if let Some(t) = expected {
            prop_assert_eq!(tried.last().copied(), Some(t));
            prop_assert!(past.attempts[..past.attempts.len() - 1].iter().all(|a| !a.passed()));
        }
    }
}
