// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test-only fixture builders for composing validation scenarios.
//!
//! Every scenario uses the same small PKI: a root trust anchor issuing a signer certificate and
//! one or two time-stamping unit certificates. Builders return plain fact structs so tests can
//! tweak any field before validating.

use ades_validation::diagnostic::{
    CertificateCandidate, CertificateFacts, CoveredObject, DiagnosticData, DigestMatcher,
    RevocationFacts, RevocationKind, RevocationReason, RevocationStatus, SignatureFacts,
    SignedAttribute, TimestampFacts, TimestampKind,
};
use ades_validation_chain::algorithm::{
    DigestAlgorithm, EncryptionAlgorithm, ExtendedKeyUsage, KeyUsage, SignatureAlgorithm,
};
use ades_validation_chain::policy::Level;
use ades_validation_chain::{TokenId, TokenKind, ValidationPolicy};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeSet;

/// Identifiers used by the canned scenarios.
pub mod ids {
    pub const ROOT: &str = "C-ROOT";
    pub const SIGNER: &str = "C-SIGNER";
    pub const TSA: &str = "C-TSA";
    pub const TSA_ARCHIVE: &str = "C-TSA-ARCHIVE";
    pub const SIGNER_OCSP: &str = "R-OCSP-SIGNER";
    pub const TSA_CRL: &str = "R-CRL-TSA";
    pub const TSA_ARCHIVE_CRL: &str = "R-CRL-TSA-ARCHIVE";
    pub const SIGNATURE: &str = "S-1";
    pub const SIGNATURE_TIMESTAMP: &str = "T-SIG";
    pub const ARCHIVE_TIMESTAMP: &str = "T-ARC";
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid fixture date")
}

pub fn sha256_rsa(key_size: u32) -> SignatureAlgorithm {
    SignatureAlgorithm::new(DigestAlgorithm::Sha256, EncryptionAlgorithm::Rsa, key_size)
}

pub fn token(id: &str) -> TokenId {
    TokenId::new(id)
}

pub fn root_certificate(id: &str) -> CertificateFacts {
    CertificateFacts {
        id: token(id),
        subject: format!("CN={id}"),
        issuer_name: format!("CN={id}"),
        serial_number: "01".to_string(),
        not_before: utc(2015, 1, 1, 0),
        not_after: utc(2040, 1, 1, 0),
        key_usages: vec![KeyUsage::KeyCertSign, KeyUsage::CrlSign],
        ca: true,
        trust_anchor: true,
        self_signed: true,
        signature_algorithm: Some(sha256_rsa(4096)),
        signature_intact: true,
        ..CertificateFacts::default()
    }
}

/// An end-entity certificate issued by `issuer`, valid over `[not_before, not_after]`.
pub fn issued_certificate(
    id: &str,
    issuer: &str,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
) -> CertificateFacts {
    CertificateFacts {
        id: token(id),
        subject: format!("CN={id}"),
        issuer_name: format!("CN={issuer}"),
        serial_number: format!("{:x}", id.len() * 4099),
        not_before,
        not_after,
        issuer: Some(token(issuer)),
        signature_algorithm: Some(sha256_rsa(2048)),
        signature_intact: true,
        ..CertificateFacts::default()
    }
}

pub fn signer_certificate(
    id: &str,
    issuer: &str,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
) -> CertificateFacts {
    CertificateFacts {
        key_usages: vec![KeyUsage::NonRepudiation],
        ..issued_certificate(id, issuer, not_before, not_after)
    }
}

pub fn tsa_certificate(
    id: &str,
    issuer: &str,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
) -> CertificateFacts {
    CertificateFacts {
        key_usages: vec![KeyUsage::DigitalSignature],
        extended_key_usages: vec![ExtendedKeyUsage::TimeStamping],
        ..issued_certificate(id, issuer, not_before, not_after)
    }
}

/// A revocation record with a seven day update window.
pub fn revocation(
    id: &str,
    kind: RevocationKind,
    certificate: &str,
    produced: DateTime<Utc>,
    status: RevocationStatus,
) -> RevocationFacts {
    RevocationFacts {
        id: token(id),
        kind,
        certificate: token(certificate),
        issuer_certificate: Some(token(ids::ROOT)),
        production_time: produced,
        this_update: produced,
        next_update: Some(produced + Duration::days(7)),
        archive_cutoff: None,
        status,
        signature_algorithm: Some(sha256_rsa(2048)),
        signature_intact: true,
    }
}

pub fn ocsp_good(id: &str, certificate: &str, produced: DateTime<Utc>) -> RevocationFacts {
    revocation(id, RevocationKind::Ocsp, certificate, produced, RevocationStatus::Good)
}

pub fn crl_good(id: &str, certificate: &str, produced: DateTime<Utc>) -> RevocationFacts {
    revocation(id, RevocationKind::Crl, certificate, produced, RevocationStatus::Good)
}

pub fn ocsp_revoked(
    id: &str,
    certificate: &str,
    produced: DateTime<Utc>,
    revoked_at: DateTime<Utc>,
) -> RevocationFacts {
    revocation(
        id,
        RevocationKind::Ocsp,
        certificate,
        produced,
        RevocationStatus::Revoked {
            time: Some(revoked_at),
            reason: RevocationReason::KeyCompromise,
        },
    )
}

/// A well-formed PAdES signature by `signing_certificate`, with no time-stamps.
pub fn signature(id: &str, signing_certificate: &str, claimed: DateTime<Utc>) -> SignatureFacts {
    SignatureFacts {
        id: token(id),
        format: "PAdES-BASELINE-B".to_string(),
        counter_signature_of: None,
        signing_certificate_attribute_present: true,
        signing_certificate_candidates: vec![CertificateCandidate {
            certificate: token(signing_certificate),
            digest_match: true,
            issuer_serial_match: true,
        }],
        claimed_signing_time: Some(claimed),
        signature_algorithm: Some(sha256_rsa(2048)),
        signature_intact: true,
        digest_matchers: vec![DigestMatcher {
            name: "message-digest".to_string(),
            found: true,
            intact: true,
        }],
        signed_attributes: BTreeSet::from([
            SignedAttribute::SigningCertificate,
            SignedAttribute::SigningTime,
            SignedAttribute::ContentType,
        ]),
        structurally_valid: true,
        structural_messages: Vec::new(),
        pdf: None,
        timestamps: Vec::new(),
    }
}

/// A valid time-stamp produced at `at` by `tsa`, covering `covered`.
pub fn timestamp(
    id: &str,
    kind: TimestampKind,
    tsa: &str,
    at: DateTime<Utc>,
    covered: &[(&str, TokenKind)],
) -> TimestampFacts {
    TimestampFacts {
        id: token(id),
        kind,
        production_time: at,
        covered_objects: covered
            .iter()
            .map(|(id, kind)| CoveredObject::new(*id, *kind))
            .collect(),
        signing_certificate_attribute_present: true,
        signing_certificate_candidates: vec![CertificateCandidate {
            certificate: token(tsa),
            digest_match: true,
            issuer_serial_match: false,
        }],
        message_imprint_found: true,
        message_imprint_intact: true,
        signature_intact: true,
        signature_algorithm: Some(sha256_rsa(2048)),
    }
}

/// Signing time shared by the canned scenarios.
pub fn signing_time() -> DateTime<Utc> {
    utc(2024, 3, 1, 12)
}

/// A signature validated one day after signing, signer valid, OCSP good and fresh.
pub fn valid_signature_scenario() -> DiagnosticData {
    let t0 = signing_time();
    DiagnosticData {
        validation_time: t0 + Duration::days(1),
        signatures: vec![signature(ids::SIGNATURE, ids::SIGNER, t0)],
        certificates: vec![
            root_certificate(ids::ROOT),
            signer_certificate(ids::SIGNER, ids::ROOT, utc(2023, 1, 1, 0), utc(2026, 1, 1, 0)),
        ],
        revocations: vec![ocsp_good(ids::SIGNER_OCSP, ids::SIGNER, t0 - Duration::hours(1))],
        timestamps: Vec::new(),
    }
}

/// Signer certificate expired at the validation time; a signature time-stamp at signing time
/// covers the signature, the signer certificate and its OCSP response.
pub fn expired_signer_scenario() -> DiagnosticData {
    let t0 = signing_time();
    let validation_time = utc(2025, 6, 1, 0);

    let mut sig = signature(ids::SIGNATURE, ids::SIGNER, t0);
    sig.format = "PAdES-BASELINE-LT".to_string();
    sig.timestamps = vec![token(ids::SIGNATURE_TIMESTAMP)];

    DiagnosticData {
        validation_time,
        signatures: vec![sig],
        certificates: vec![
            root_certificate(ids::ROOT),
            signer_certificate(ids::SIGNER, ids::ROOT, utc(2023, 1, 1, 0), utc(2025, 1, 1, 0)),
            tsa_certificate(ids::TSA, ids::ROOT, utc(2020, 1, 1, 0), utc(2030, 1, 1, 0)),
        ],
        revocations: vec![
            ocsp_good(ids::SIGNER_OCSP, ids::SIGNER, t0 - Duration::hours(1)),
            crl_good(ids::TSA_CRL, ids::TSA, validation_time - Duration::days(1)),
        ],
        timestamps: vec![timestamp(
            ids::SIGNATURE_TIMESTAMP,
            TimestampKind::Signature,
            ids::TSA,
            t0,
            &[
                (ids::SIGNATURE, TokenKind::Signature),
                (ids::SIGNER, TokenKind::Certificate),
                (ids::SIGNER_OCSP, TokenKind::Revocation),
            ],
        )],
    }
}

/// Time of revocation in [`revoked_signer_scenario`].
pub fn revocation_time() -> DateTime<Utc> {
    utc(2024, 5, 1, 0)
}

/// Signer revoked at [`revocation_time`]; the only time-stamp comes later.
pub fn revoked_signer_scenario() -> DiagnosticData {
    let claimed = utc(2024, 4, 1, 0);
    let ocsp_produced = utc(2024, 6, 1, 0);
    let timestamped = utc(2024, 7, 1, 0);
    let validation_time = utc(2025, 6, 1, 0);

    let mut sig = signature(ids::SIGNATURE, ids::SIGNER, claimed);
    sig.timestamps = vec![token(ids::SIGNATURE_TIMESTAMP)];

    DiagnosticData {
        validation_time,
        signatures: vec![sig],
        certificates: vec![
            root_certificate(ids::ROOT),
            signer_certificate(ids::SIGNER, ids::ROOT, utc(2023, 1, 1, 0), utc(2026, 1, 1, 0)),
            tsa_certificate(ids::TSA, ids::ROOT, utc(2020, 1, 1, 0), utc(2030, 1, 1, 0)),
        ],
        revocations: vec![
            ocsp_revoked(ids::SIGNER_OCSP, ids::SIGNER, ocsp_produced, revocation_time()),
            crl_good(ids::TSA_CRL, ids::TSA, validation_time - Duration::days(1)),
        ],
        timestamps: vec![timestamp(
            ids::SIGNATURE_TIMESTAMP,
            TimestampKind::Signature,
            ids::TSA,
            timestamped,
            &[
                (ids::SIGNATURE, TokenKind::Signature),
                (ids::SIGNER, TokenKind::Certificate),
                (ids::SIGNER_OCSP, TokenKind::Revocation),
            ],
        )],
    }
}

/// Production time of the signature time-stamp in [`archive_timestamp_scenario`].
pub fn lta_signature_timestamp_time() -> DateTime<Utc> {
    utc(2022, 6, 1, 0)
}

/// Production time of the archive time-stamp in [`archive_timestamp_scenario`].
pub fn lta_archive_timestamp_time() -> DateTime<Utc> {
    utc(2022, 12, 1, 0)
}

/// Long-term archival: the signer and the first TSA certificate are both expired at the
/// validation time. An archive time-stamp produced before the first TSA certificate expired
/// covers the signature time-stamp, that TSA certificate and its CRL.
pub fn archive_timestamp_scenario() -> DiagnosticData {
    let t1 = lta_signature_timestamp_time();
    let t2 = lta_archive_timestamp_time();
    let validation_time = utc(2025, 6, 1, 0);

    let mut sig = signature(ids::SIGNATURE, ids::SIGNER, t1);
    sig.format = "PAdES-BASELINE-LTA".to_string();
    sig.timestamps = vec![token(ids::SIGNATURE_TIMESTAMP), token(ids::ARCHIVE_TIMESTAMP)];

    DiagnosticData {
        validation_time,
        signatures: vec![sig],
        certificates: vec![
            root_certificate(ids::ROOT),
            signer_certificate(ids::SIGNER, ids::ROOT, utc(2021, 1, 1, 0), utc(2023, 6, 1, 0)),
            tsa_certificate(ids::TSA, ids::ROOT, utc(2020, 1, 1, 0), utc(2023, 1, 1, 0)),
            tsa_certificate(ids::TSA_ARCHIVE, ids::ROOT, utc(2021, 1, 1, 0), utc(2030, 1, 1, 0)),
        ],
        revocations: vec![
            ocsp_good(ids::SIGNER_OCSP, ids::SIGNER, t1 - Duration::hours(1)),
            crl_good(ids::TSA_CRL, ids::TSA, t2 - Duration::days(1)),
            crl_good(
                ids::TSA_ARCHIVE_CRL,
                ids::TSA_ARCHIVE,
                validation_time - Duration::days(1),
            ),
        ],
        timestamps: vec![
            timestamp(
                ids::SIGNATURE_TIMESTAMP,
                TimestampKind::Signature,
                ids::TSA,
                t1,
                &[
                    (ids::SIGNATURE, TokenKind::Signature),
                    (ids::SIGNER, TokenKind::Certificate),
                    (ids::SIGNER_OCSP, TokenKind::Revocation),
                ],
            ),
            timestamp(
                ids::ARCHIVE_TIMESTAMP,
                TimestampKind::Archive,
                ids::TSA_ARCHIVE,
                t2,
                &[
                    (ids::SIGNATURE, TokenKind::Signature),
                    (ids::SIGNATURE_TIMESTAMP, TokenKind::Timestamp),
                    (ids::SIGNER, TokenKind::Certificate),
                    (ids::SIGNER_OCSP, TokenKind::Revocation),
                    (ids::TSA, TokenKind::Certificate),
                    (ids::TSA_CRL, TokenKind::Revocation),
                ],
            ),
        ],
    }
}

/// The default policy with every algorithm check lowered to `level`.
pub fn policy_with_crypto_level(level: Level) -> ValidationPolicy {
    let mut policy = ValidationPolicy::default();
    policy.name = format!("crypto-{level:?}").to_lowercase();
    policy.cryptographic.level = level;
    policy
}
