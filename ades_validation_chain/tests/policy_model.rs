// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation_chain::algorithm::{DigestAlgorithm, EncryptionAlgorithm, SignatureAlgorithm};
use ades_validation_chain::policy::{
    AlgorithmAcceptance, CryptographicConstraint, Level, TimeConstraint, TimeUnit,
};
use ades_validation_chain::{LevelConstraint, ValidationError, ValidationPolicy, ValidationPolicyBuilder};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

#[test]
fn default_policy_round_trips_through_json() {
    let policy = ValidationPolicy::default();
    let json = serde_json::to_string_pretty(&policy).unwrap();
    let back: ValidationPolicy = serde_json::from_str(&json).unwrap();
    assert_eq!(back, policy);
}

#[test]
fn partial_policy_documents_fill_in_defaults() {
    let json = r#"{
        "name": "strict-format",
        "signature": {
            "format": { "structural_validation": { "level": "FAIL" } }
        },
        "past_validation": { "certificate_poe": { "level": "WARN" } }
    }"#;

    let policy: ValidationPolicy = serde_json::from_str(json).unwrap();
    assert_eq!(policy.name, "strict-format");
    assert_eq!(
        policy.signature.format.structural_validation,
        Some(LevelConstraint::fail())
    );
    assert_eq!(policy.signature.format.doc_mdp, None);
    assert_eq!(
        policy.past_validation.certificate_poe,
        Some(LevelConstraint::warn())
    );
    assert_eq!(policy.past_validation.revocation_poe, None);
    assert!(policy.counter_signature.is_none());
    assert!(policy.validate().is_ok());
}

#[test]
fn time_constraints_convert_units() {
    let c = TimeConstraint::new(Level::Fail, TimeUnit::Hours, 36);
    assert_eq!(c.duration("delay").unwrap(), Duration::hours(36));
    assert_eq!(c.level_constraint(), LevelConstraint::fail());
}

#[test]
fn negative_time_constraint_is_a_configuration_error() {
    let err = ValidationPolicyBuilder::new()
        .with_signature(|s| {
            s.long_term.timestamp_delay = Some(TimeConstraint::new(Level::Fail, TimeUnit::Days, -1));
        })
        .build()
        .unwrap_err();

    match err {
        ValidationError::InvalidConstraint { name, .. } => {
            assert_eq!(name, "signature.long_term.timestamp_delay")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn builder_enables_counter_signatures_from_recommended_constraints() {
    let policy = ValidationPolicyBuilder::new()
        .name("with-counter-signatures")
        .with_counter_signature(|cs| cs.acceptance.signed_attributes.content_type = None)
        .build()
        .unwrap();

    let cs = policy.counter_signature.as_ref().unwrap();
    assert_eq!(cs.acceptance.signed_attributes.content_type, None);
    assert_eq!(
        cs.basic_signature.signature_intact,
        Some(LevelConstraint::fail())
    );
    assert_eq!(policy.name, "with-counter-signatures");
}

#[test]
fn default_crypto_accepts_current_algorithms() {
    let policy = ValidationPolicy::default();
    let alg = SignatureAlgorithm::new(DigestAlgorithm::Sha256, EncryptionAlgorithm::Rsa, 2048);
    assert_eq!(
        policy.cryptographic.evaluate(&alg, utc(2025, 1, 1)),
        AlgorithmAcceptance::Acceptable
    );
}

#[test]
fn expired_digest_reports_its_sunset() {
    let policy = ValidationPolicy::default();
    let alg = SignatureAlgorithm::new(DigestAlgorithm::Sha1, EncryptionAlgorithm::Rsa, 2048);

    assert!(policy.cryptographic.evaluate(&alg, utc(2008, 6, 1)).is_acceptable());
    assert_eq!(
        policy.cryptographic.evaluate(&alg, utc(2012, 1, 1)),
        AlgorithmAcceptance::Expired {
            since: utc(2009, 1, 1)
        }
    );
}

#[test]
fn small_keys_are_rejected_regardless_of_time() {
    let policy = ValidationPolicy::default();
    let alg = SignatureAlgorithm::new(DigestAlgorithm::Sha256, EncryptionAlgorithm::Rsa, 512);
    assert_eq!(
        policy.cryptographic.evaluate(&alg, utc(2000, 1, 1)),
        AlgorithmAcceptance::KeyTooSmall { minimum: 1024 }
    );
}

#[test]
fn largest_applicable_key_size_entry_governs_expiry() {
    let policy = ValidationPolicy::default();
    let short = SignatureAlgorithm::new(DigestAlgorithm::Sha256, EncryptionAlgorithm::Rsa, 1024);
    let long = SignatureAlgorithm::new(DigestAlgorithm::Sha256, EncryptionAlgorithm::Rsa, 3072);
    let at = utc(2020, 1, 1);

    assert!(matches!(
        policy.cryptographic.evaluate(&short, at),
        AlgorithmAcceptance::Expired { .. }
    ));
    assert!(policy.cryptographic.evaluate(&long, at).is_acceptable());
}

#[test]
fn empty_algorithm_lists_accept_everything() {
    let crypto = CryptographicConstraint::default();
    let alg = SignatureAlgorithm::new(DigestAlgorithm::Md5, EncryptionAlgorithm::Dsa, 512);
    assert!(crypto.evaluate(&alg, utc(2030, 1, 1)).is_acceptable());
}

#[test]
fn unlisted_algorithm_is_not_acceptable() {
    let crypto = CryptographicConstraint {
        acceptable_digest_algorithms: vec![DigestAlgorithm::Sha256],
        ..CryptographicConstraint::default()
    };
    let alg = SignatureAlgorithm::new(DigestAlgorithm::Md5, EncryptionAlgorithm::Rsa, 2048);
    assert_eq!(
        crypto.evaluate(&alg, utc(2020, 1, 1)),
        AlgorithmAcceptance::NotAcceptable
    );
}
