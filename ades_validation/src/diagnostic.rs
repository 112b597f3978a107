// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Read-only facts extracted from a signed document.
//!
//! Everything here is produced by a collaborator (container parser, certificate source,
//! revocation source) before validation starts; the validation core only reads it.

use ades_validation_chain::algorithm::{ExtendedKeyUsage, KeyUsage, SignatureAlgorithm};
use ades_validation_chain::{TokenId, TokenKind, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticData {
    /// The declared current time; the wall clock is never read.
    pub validation_time: DateTime<Utc>,
    pub signatures: Vec<SignatureFacts>,
    pub certificates: Vec<CertificateFacts>,
    pub revocations: Vec<RevocationFacts>,
    pub timestamps: Vec<TimestampFacts>,
}

impl DiagnosticData {
    pub fn signature(&self, id: &TokenId) -> Result<&SignatureFacts, ValidationError> {
        self.signatures
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| ValidationError::UnknownToken(id.clone()))
    }

    pub fn certificate(&self, id: &TokenId) -> Result<&CertificateFacts, ValidationError> {
        self.certificates
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| ValidationError::UnknownToken(id.clone()))
    }

    pub fn revocation(&self, id: &TokenId) -> Result<&RevocationFacts, ValidationError> {
        self.revocations
            .iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| ValidationError::UnknownToken(id.clone()))
    }

    pub fn timestamp(&self, id: &TokenId) -> Result<&TimestampFacts, ValidationError> {
        self.timestamps
            .iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| ValidationError::UnknownToken(id.clone()))
    }

    /// Revocation records about `certificate`.
    pub fn revocations_for<'a>(
        &'a self,
        certificate: &'a TokenId,
    ) -> impl Iterator<Item = &'a RevocationFacts> + 'a {
        self.revocations
            .iter()
            .filter(move |r| &r.certificate == certificate)
    }
}

/// Facts shared by every token that carries its own signature value.
pub trait SignedToken {
    fn id(&self) -> &TokenId;
    fn signing_certificate_attribute_present(&self) -> bool;
    fn signing_certificate_candidates(&self) -> &[CertificateCandidate];
    fn signature_algorithm(&self) -> Option<&SignatureAlgorithm>;
    fn signature_intact(&self) -> bool;
}

/// A certificate that may have produced a signature, with how well it matches the signed
/// signing-certificate reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateCandidate {
    pub certificate: TokenId,
    pub digest_match: bool,
    pub issuer_serial_match: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestMatcher {
    pub name: String,
    pub found: bool,
    pub intact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignedAttribute {
    SigningCertificate,
    SigningTime,
    ContentType,
    CommitmentTypeIndication,
    SignerLocation,
    ClaimedRoles,
    ContentTimestamp,
}

impl SignedAttribute {
    pub fn name(self) -> &'static str {
        match self {
            SignedAttribute::SigningCertificate => "signing-certificate",
            SignedAttribute::SigningTime => "signing-time",
            SignedAttribute::ContentType => "content-type",
            SignedAttribute::CommitmentTypeIndication => "commitment-type-indication",
            SignedAttribute::SignerLocation => "signer-location",
            SignedAttribute::ClaimedRoles => "claimed-roles",
            SignedAttribute::ContentTimestamp => "content-time-stamp",
        }
    }
}

/// DocMDP permission level of a certification signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationPermission {
    /// P=1
    NoChange,
    /// P=2
    Minimal,
    /// P=3
    ChangesPermitted,
}

impl CertificationPermission {
    pub fn from_code(code: u8) -> Result<Self, ValidationError> {
        match code {
            1 => Ok(Self::NoChange),
            2 => Ok(Self::Minimal),
            3 => Ok(Self::ChangesPermitted),
            other => Err(ValidationError::UnsupportedValue {
                name: "DocMDP permission".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Modifications detected between the signed revision and the final document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfRevisionFacts {
    /// Raw `/P` value of the DocMDP transform, if the document is certified.
    pub doc_mdp_permission: Option<u8>,
    pub form_fill_changes: Vec<String>,
    pub annotation_changes: Vec<String>,
    pub undefined_changes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureFacts {
    pub id: TokenId,
    /// Format label, e.g. `PAdES-BASELINE-T`.
    pub format: String,
    pub counter_signature_of: Option<TokenId>,
    pub signing_certificate_attribute_present: bool,
    pub signing_certificate_candidates: Vec<CertificateCandidate>,
    pub claimed_signing_time: Option<DateTime<Utc>>,
    pub signature_algorithm: Option<SignatureAlgorithm>,
    pub signature_intact: bool,
    pub digest_matchers: Vec<DigestMatcher>,
    pub signed_attributes: BTreeSet<SignedAttribute>,
    pub structurally_valid: bool,
    pub structural_messages: Vec<String>,
    pub pdf: Option<PdfRevisionFacts>,
    /// Time-stamps found in the signature, in any order.
    pub timestamps: Vec<TokenId>,
}

impl SignedToken for SignatureFacts {
    fn id(&self) -> &TokenId {
        &self.id
    }

    fn signing_certificate_attribute_present(&self) -> bool {
        self.signing_certificate_attribute_present
    }

    fn signing_certificate_candidates(&self) -> &[CertificateCandidate] {
        &self.signing_certificate_candidates
    }

    fn signature_algorithm(&self) -> Option<&SignatureAlgorithm> {
        self.signature_algorithm.as_ref()
    }

    fn signature_intact(&self) -> bool {
        self.signature_intact
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateFacts {
    pub id: TokenId,
    pub subject: String,
    pub issuer_name: String,
    pub serial_number: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub key_usages: Vec<KeyUsage>,
    pub extended_key_usages: Vec<ExtendedKeyUsage>,
    pub ca: bool,
    pub trust_anchor: bool,
    pub self_signed: bool,
    /// `id-pkix-ocsp-nocheck`: revocation checking is skipped.
    pub ocsp_no_check: bool,
    /// Issuer certificate; `None` for self-signed or when the issuer is not available.
    pub issuer: Option<TokenId>,
    pub signature_algorithm: Option<SignatureAlgorithm>,
    pub signature_intact: bool,
}

impl CertificateFacts {
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RevocationKind {
    #[default]
    Crl,
    Ocsp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevocationReason {
    #[default]
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RevocationStatus {
    Good,
    Revoked {
        time: Option<DateTime<Utc>>,
        reason: RevocationReason,
    },
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevocationFacts {
    pub id: TokenId,
    pub kind: RevocationKind,
    pub certificate: TokenId,
    pub issuer_certificate: Option<TokenId>,
    pub production_time: DateTime<Utc>,
    pub this_update: DateTime<Utc>,
    pub next_update: Option<DateTime<Utc>>,
    pub archive_cutoff: Option<DateTime<Utc>>,
    pub status: RevocationStatus,
    pub signature_algorithm: Option<SignatureAlgorithm>,
    pub signature_intact: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampKind {
    Content,
    #[default]
    Signature,
    ValidationData,
    Archive,
    Document,
}

impl TimestampKind {
    /// Position in the expected production order; `None` for document time-stamps.
    pub fn coherence_rank(self) -> Option<u8> {
        match self {
            TimestampKind::Content => Some(0),
            TimestampKind::Signature => Some(1),
            TimestampKind::ValidationData => Some(2),
            TimestampKind::Archive => Some(3),
            TimestampKind::Document => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveredObject {
    pub id: TokenId,
    pub category: TokenKind,
}

impl CoveredObject {
    pub fn new(id: impl Into<TokenId>, category: TokenKind) -> Self {
        Self {
            id: id.into(),
            category,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampFacts {
    pub id: TokenId,
    pub kind: TimestampKind,
    pub production_time: DateTime<Utc>,
    pub covered_objects: Vec<CoveredObject>,
    pub signing_certificate_attribute_present: bool,
    pub signing_certificate_candidates: Vec<CertificateCandidate>,
    pub message_imprint_found: bool,
    pub message_imprint_intact: bool,
    pub signature_intact: bool,
    pub signature_algorithm: Option<SignatureAlgorithm>,
}

impl TimestampFacts {
    pub fn covers(&self, id: &TokenId) -> bool {
        self.covered_objects.iter().any(|o| &o.id == id)
    }
}

impl SignedToken for TimestampFacts {
    fn id(&self) -> &TokenId {
        &self.id
    }

    fn signing_certificate_attribute_present(&self) -> bool {
        self.signing_certificate_attribute_present
    }

    fn signing_certificate_candidates(&self) -> &[CertificateCandidate] {
        &self.signing_certificate_candidates
    }

    fn signature_algorithm(&self) -> Option<&SignatureAlgorithm> {
        self.signature_algorithm.as_ref()
    }

    fn signature_intact(&self) -> bool {
        self.signature_intact
    }
}
