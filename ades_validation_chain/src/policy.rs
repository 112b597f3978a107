// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Constraint policy model.
//!
//! A [`ValidationPolicy`] is a tree of per-context constraint groups. Every optional constraint
//! that is absent (`None`) is not evaluated, exactly like a constraint at [`Level::Ignore`].
//! Policies are plain data: loaders materialize them through `serde`, tests and callers through
//! [`ValidationPolicyBuilder`].

use crate::algorithm::{
    DigestAlgorithm, EncryptionAlgorithm, ExtendedKeyUsage, KeyUsage, SignatureAlgorithm,
};
use crate::error::ValidationError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Severity of a constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// A false check stops its chain with the check's failure.
    #[default]
    Fail,
    /// A false check is recorded as a warning.
    Warn,
    /// A false check is recorded as an information.
    Inform,
    /// The check is not evaluated.
    Ignore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConstraint {
    pub level: Level,
}

impl LevelConstraint {
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    pub const fn fail() -> Self {
        Self::new(Level::Fail)
    }

    pub const fn warn() -> Self {
        Self::new(Level::Warn)
    }

    pub const fn inform() -> Self {
        Self::new(Level::Inform)
    }

    pub const fn ignore() -> Self {
        Self::new(Level::Ignore)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    #[default]
    Days,
}

/// A levelled duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeConstraint {
    pub level: Level,
    pub unit: TimeUnit,
    pub value: i64,
}

impl TimeConstraint {
    pub const fn new(level: Level, unit: TimeUnit, value: i64) -> Self {
        Self { level, unit, value }
    }

    pub fn level_constraint(&self) -> LevelConstraint {
        LevelConstraint::new(self.level)
    }

    /// The constraint as a duration; `name` identifies the constraint in the error.
    pub fn duration(&self, name: &str) -> Result<Duration, ValidationError> {
        if self.value < 0 {
            return Err(ValidationError::invalid_constraint(
                name,
                format!("negative time value {}", self.value),
            ));
        }

        let d = match self.unit {
            TimeUnit::Milliseconds => Duration::try_milliseconds(self.value),
            TimeUnit::Seconds => Duration::try_seconds(self.value),
            TimeUnit::Minutes => Duration::try_minutes(self.value),
            TimeUnit::Hours => Duration::try_hours(self.value),
            TimeUnit::Days => Duration::try_days(self.value),
        };

        d.ok_or_else(|| {
            ValidationError::invalid_constraint(name, format!("time value {} out of range", self.value))
        })
    }
}

/// A levelled set of accepted values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiValuesConstraint<T> {
    pub level: Level,
    pub accepted: Vec<T>,
}

impl<T: PartialEq> MultiValuesConstraint<T> {
    pub fn new(level: Level, accepted: Vec<T>) -> Self {
        Self { level, accepted }
    }

    pub fn level_constraint(&self) -> LevelConstraint {
        LevelConstraint::new(self.level)
    }

    /// True when any of `values` is accepted. An empty accepted list accepts everything.
    pub fn accepts_any<'a>(&self, values: impl IntoIterator<Item = &'a T>) -> bool
    where
        T: 'a,
    {
        if self.accepted.is_empty() {
            return true;
        }
        values.into_iter().any(|v| self.accepted.contains(v))
    }
}

impl MultiValuesConstraint<String> {
    /// Label match, `*` accepts any label.
    pub fn accepts_label(&self, value: &str) -> bool {
        self.accepted.is_empty() || self.accepted.iter().any(|a| a == "*" || a == value)
    }
}

/// Encryption algorithm sunset for keys of at least `key_size` bits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionExpiration {
    pub algorithm: EncryptionAlgorithm,
    pub key_size: u32,
    pub expires: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmAcceptance {
    Acceptable,
    NotAcceptable,
    KeyTooSmall { minimum: u32 },
    /// Acceptable until `since`; no longer at the evaluated time.
    Expired { since: DateTime<Utc> },
}

impl AlgorithmAcceptance {
    pub fn is_acceptable(&self) -> bool {
        matches!(self, AlgorithmAcceptance::Acceptable)
    }
}

/// Acceptable algorithms, key sizes and their sunset dates.
///
/// Empty algorithm lists accept every algorithm. An algorithm without an expiration entry never
/// expires. For encryption algorithms the entry with the largest `key_size` not above the actual
/// key length applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptographicConstraint {
    pub level: Level,
    pub acceptable_digest_algorithms: Vec<DigestAlgorithm>,
    pub acceptable_encryption_algorithms: Vec<EncryptionAlgorithm>,
    pub minimum_key_sizes: BTreeMap<EncryptionAlgorithm, u32>,
    pub digest_expirations: BTreeMap<DigestAlgorithm, DateTime<Utc>>,
    pub encryption_expirations: Vec<EncryptionExpiration>,
}

impl CryptographicConstraint {
    pub fn level_constraint(&self) -> LevelConstraint {
        LevelConstraint::new(self.level)
    }

    pub fn evaluate(&self, algorithm: &SignatureAlgorithm, at: DateTime<Utc>) -> AlgorithmAcceptance {
        if !self.acceptable_digest_algorithms.is_empty()
            && !self.acceptable_digest_algorithms.contains(&algorithm.digest)
        {
            return AlgorithmAcceptance::NotAcceptable;
        }
        if !self.acceptable_encryption_algorithms.is_empty()
            && !self.acceptable_encryption_algorithms.contains(&algorithm.encryption)
        {
            return AlgorithmAcceptance::NotAcceptable;
        }
        if let Some(&minimum) = self.minimum_key_sizes.get(&algorithm.encryption) {
            if algorithm.key_size < minimum {
                return AlgorithmAcceptance::KeyTooSmall { minimum };
            }
        }

        let digest_sunset = self.digest_expirations.get(&algorithm.digest).copied();
        let encryption_sunset = self
            .encryption_expirations
            .iter()
            .filter(|e| e.algorithm == algorithm.encryption && e.key_size <= algorithm.key_size)
            .max_by_key(|e| e.key_size)
            .map(|e| e.expires);

        let earliest = match (digest_sunset, encryption_sunset) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        match earliest {
            Some(since) if at > since => AlgorithmAcceptance::Expired { since },
            _ => AlgorithmAcceptance::Acceptable,
        }
    }

    fn validate(&self, name: &str) -> Result<(), ValidationError> {
        if let Some(e) = self.encryption_expirations.iter().find(|e| e.key_size == 0) {
            return Err(ValidationError::invalid_constraint(
                name,
                format!("expiration for {} has a zero key size", e.algorithm.name()),
            ));
        }
        Ok(())
    }
}

/// Checks applied to one certificate of a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConstraints {
    pub signature: Option<LevelConstraint>,
    /// Basic-constraints CA flag, only evaluated for issuing certificates.
    pub ca: Option<LevelConstraint>,
    pub key_usage: Option<MultiValuesConstraint<KeyUsage>>,
    pub extended_key_usage: Option<MultiValuesConstraint<ExtendedKeyUsage>>,
    pub revocation_data_available: Option<LevelConstraint>,
    pub revocation_status_known: Option<LevelConstraint>,
    /// Maximum revocation data age. A zero value derives the age from `nextUpdate`.
    pub revocation_freshness: Option<TimeConstraint>,
    pub not_revoked: Option<LevelConstraint>,
    pub not_on_hold: Option<LevelConstraint>,
    pub not_expired: Option<LevelConstraint>,
    /// Overrides the policy-wide cryptographic constraint.
    pub cryptographic: Option<CryptographicConstraint>,
}

impl CertificateConstraints {
    fn revocation_defaults() -> Self {
        Self {
            signature: Some(LevelConstraint::fail()),
            revocation_data_available: Some(LevelConstraint::fail()),
            revocation_status_known: Some(LevelConstraint::fail()),
            revocation_freshness: Some(TimeConstraint::new(Level::Fail, TimeUnit::Days, 0)),
            not_revoked: Some(LevelConstraint::fail()),
            not_on_hold: Some(LevelConstraint::fail()),
            not_expired: Some(LevelConstraint::fail()),
            ..Self::default()
        }
    }

    /// Defaults for the certificate that created a signature.
    pub fn signer() -> Self {
        Self {
            key_usage: Some(MultiValuesConstraint::new(
                Level::Warn,
                vec![KeyUsage::NonRepudiation, KeyUsage::DigitalSignature],
            )),
            ..Self::revocation_defaults()
        }
    }

    /// Defaults for issuing certificates.
    pub fn ca() -> Self {
        Self {
            ca: Some(LevelConstraint::fail()),
            ..Self::revocation_defaults()
        }
    }

    /// Defaults for the certificate of a time-stamping unit.
    pub fn tsa() -> Self {
        Self {
            extended_key_usage: Some(MultiValuesConstraint::new(
                Level::Fail,
                vec![ExtendedKeyUsage::TimeStamping],
            )),
            ..Self::revocation_defaults()
        }
    }
}

/// How the signing certificate reference is matched against candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningCertificateConstraints {
    pub attribute_present: Option<LevelConstraint>,
    pub digest_match: Option<LevelConstraint>,
    pub issuer_serial_match: Option<LevelConstraint>,
}

/// Constraints shared by every signed token (signature, counter-signature, time-stamp).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicSignatureConstraints {
    pub reference_data_existence: Option<LevelConstraint>,
    pub reference_data_intact: Option<LevelConstraint>,
    pub signature_intact: Option<LevelConstraint>,
    pub prospective_certificate_chain: Option<LevelConstraint>,
    pub identification: SigningCertificateConstraints,
    pub signing_certificate: CertificateConstraints,
    pub ca_certificate: CertificateConstraints,
    /// Applies to the token's own signature algorithm.
    pub cryptographic: Option<CryptographicConstraint>,
}

impl BasicSignatureConstraints {
    fn with_signing_certificate(signing_certificate: CertificateConstraints) -> Self {
        Self {
            reference_data_existence: Some(LevelConstraint::fail()),
            reference_data_intact: Some(LevelConstraint::fail()),
            signature_intact: Some(LevelConstraint::fail()),
            prospective_certificate_chain: Some(LevelConstraint::fail()),
            identification: SigningCertificateConstraints {
                attribute_present: Some(LevelConstraint::fail()),
                digest_match: Some(LevelConstraint::fail()),
                issuer_serial_match: Some(LevelConstraint::warn()),
            },
            signing_certificate,
            ca_certificate: CertificateConstraints::ca(),
            cryptographic: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConstraints {
    pub structural_validation: Option<LevelConstraint>,
    pub doc_mdp: Option<LevelConstraint>,
    pub undefined_changes: Option<LevelConstraint>,
}

/// Signed attributes a signature must carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignedAttributesConstraints {
    pub signing_time: Option<LevelConstraint>,
    pub content_type: Option<LevelConstraint>,
    pub commitment_type_indication: Option<LevelConstraint>,
    pub signer_location: Option<LevelConstraint>,
    pub claimed_roles: Option<LevelConstraint>,
    pub content_timestamp: Option<LevelConstraint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptanceConstraints {
    pub signing_time_plausible: Option<LevelConstraint>,
    pub accepted_formats: Option<MultiValuesConstraint<String>>,
    pub signed_attributes: SignedAttributesConstraints,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongTermConstraints {
    pub best_signature_time_before_issuance: Option<LevelConstraint>,
    /// Maximum delay between the claimed signing time and the first signature time-stamp.
    pub timestamp_delay: Option<TimeConstraint>,
    pub timestamp_coherence: Option<LevelConstraint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConstraints {
    pub format: FormatConstraints,
    pub basic_signature: BasicSignatureConstraints,
    pub acceptance: AcceptanceConstraints,
    pub long_term: LongTermConstraints,
}

impl SignatureConstraints {
    pub fn recommended() -> Self {
        Self {
            format: FormatConstraints {
                structural_validation: Some(LevelConstraint::fail()),
                doc_mdp: Some(LevelConstraint::fail()),
                undefined_changes: Some(LevelConstraint::warn()),
            },
            basic_signature: BasicSignatureConstraints::with_signing_certificate(
                CertificateConstraints::signer(),
            ),
            acceptance: AcceptanceConstraints {
                signing_time_plausible: Some(LevelConstraint::fail()),
                accepted_formats: None,
                signed_attributes: SignedAttributesConstraints {
                    signing_time: Some(LevelConstraint::inform()),
                    content_type: Some(LevelConstraint::fail()),
                    commitment_type_indication: None,
                    signer_location: None,
                    claimed_roles: None,
                    content_timestamp: None,
                },
            },
            long_term: LongTermConstraints {
                best_signature_time_before_issuance: Some(LevelConstraint::fail()),
                timestamp_delay: None,
                timestamp_coherence: Some(LevelConstraint::warn()),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampConstraints {
    pub basic_signature: BasicSignatureConstraints,
}

impl TimestampConstraints {
    pub fn recommended() -> Self {
        let mut basic_signature =
            BasicSignatureConstraints::with_signing_certificate(CertificateConstraints::tsa());
        // ESSCertIDv2 in time-stamp tokens commonly omits issuerSerial.
        basic_signature.identification.issuer_serial_match = None;
        Self { basic_signature }
    }
}

/// Constraints on revocation data tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevocationConstraints {
    /// A record whose algorithm is not acceptable at the evaluated time is not used.
    pub cryptographic: Option<CryptographicConstraint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PastValidationConstraints {
    pub certificate_poe: Option<LevelConstraint>,
    pub revocation_poe: Option<LevelConstraint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    pub name: String,
    pub description: Option<String>,
    pub signature: SignatureConstraints,
    /// Required as soon as a counter-signature is validated.
    pub counter_signature: Option<SignatureConstraints>,
    pub timestamp: TimestampConstraints,
    pub revocation: RevocationConstraints,
    /// Policy-wide cryptographic constraint, overridden per context.
    pub cryptographic: CryptographicConstraint,
    pub past_validation: PastValidationConstraints,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            description: Some("Baseline AdES validation policy".to_string()),
            signature: SignatureConstraints::recommended(),
            counter_signature: None,
            timestamp: TimestampConstraints::recommended(),
            revocation: RevocationConstraints::default(),
            cryptographic: default_cryptographic_constraint(),
            past_validation: PastValidationConstraints {
                certificate_poe: Some(LevelConstraint::fail()),
                revocation_poe: Some(LevelConstraint::fail()),
            },
        }
    }
}

impl ValidationPolicy {
    /// `local` if set, otherwise the policy-wide cryptographic constraint.
    pub fn cryptographic_for<'a>(
        &'a self,
        local: Option<&'a CryptographicConstraint>,
    ) -> &'a CryptographicConstraint {
        local.unwrap_or(&self.cryptographic)
    }

    /// Reject values no evaluation could honor.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cryptographic.validate("cryptographic")?;
        validate_signature(&self.signature, "signature")?;
        if let Some(cs) = &self.counter_signature {
            validate_signature(cs, "counter_signature")?;
        }
        validate_basic(&self.timestamp.basic_signature, "timestamp.basic_signature")?;
        if let Some(c) = &self.revocation.cryptographic {
            c.validate("revocation.cryptographic")?;
        }
        Ok(())
    }
}

fn validate_signature(c: &SignatureConstraints, name: &str) -> Result<(), ValidationError> {
    validate_basic(&c.basic_signature, &format!("{name}.basic_signature"))?;
    if let Some(delay) = &c.long_term.timestamp_delay {
        delay.duration(&format!("{name}.long_term.timestamp_delay"))?;
    }
    Ok(())
}

fn validate_basic(c: &BasicSignatureConstraints, name: &str) -> Result<(), ValidationError> {
    if let Some(crypto) = &c.cryptographic {
        crypto.validate(&format!("{name}.cryptographic"))?;
    }
    for (label, cert) in [
        ("signing_certificate", &c.signing_certificate),
        ("ca_certificate", &c.ca_certificate),
    ] {
        if let Some(f) = &cert.revocation_freshness {
            f.duration(&format!("{name}.{label}.revocation_freshness"))?;
        }
        if let Some(crypto) = &cert.cryptographic {
            crypto.validate(&format!("{name}.{label}.cryptographic"))?;
        }
    }
    Ok(())
}

fn default_cryptographic_constraint() -> CryptographicConstraint {
    let date = |y: i32| {
        DateTime::parse_from_rfc3339(&format!("{y}-01-01T00:00:00Z"))
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    };

    CryptographicConstraint {
        level: Level::Fail,
        acceptable_digest_algorithms: vec![
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha224,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
            DigestAlgorithm::Sha3_256,
            DigestAlgorithm::Sha3_384,
            DigestAlgorithm::Sha3_512,
            DigestAlgorithm::Ripemd160,
        ],
        acceptable_encryption_algorithms: vec![
            EncryptionAlgorithm::Rsa,
            EncryptionAlgorithm::RsaSsaPss,
            EncryptionAlgorithm::Dsa,
            EncryptionAlgorithm::Ecdsa,
            EncryptionAlgorithm::EdDsa,
        ],
        minimum_key_sizes: BTreeMap::from([
            (EncryptionAlgorithm::Rsa, 1024),
            (EncryptionAlgorithm::RsaSsaPss, 1024),
            (EncryptionAlgorithm::Dsa, 1024),
            (EncryptionAlgorithm::Ecdsa, 160),
        ]),
        digest_expirations: BTreeMap::from([
            (DigestAlgorithm::Sha1, date(2009)),
            (DigestAlgorithm::Sha224, date(2029)),
            (DigestAlgorithm::Ripemd160, date(2011)),
        ]),
        encryption_expirations: vec![
            EncryptionExpiration {
                algorithm: EncryptionAlgorithm::Rsa,
                key_size: 1024,
                expires: date(2014),
            },
            EncryptionExpiration {
                algorithm: EncryptionAlgorithm::Rsa,
                key_size: 1900,
                expires: date(2031),
            },
            EncryptionExpiration {
                algorithm: EncryptionAlgorithm::Dsa,
                key_size: 1024,
                expires: date(2014),
            },
        ],
    }
}

/// Fluent construction of a [`ValidationPolicy`], starting from the defaults.
#[derive(Default)]
pub struct ValidationPolicyBuilder {
    policy: ValidationPolicy,
}

impl ValidationPolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing policy instead of the defaults.
    pub fn from_policy(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.policy.name = name.into();
        self
    }

    pub fn with_signature(mut self, f: impl FnOnce(&mut SignatureConstraints)) -> Self {
        f(&mut self.policy.signature);
        self
    }

    /// Enable counter-signature validation, starting from the recommended constraints.
    pub fn with_counter_signature(mut self, f: impl FnOnce(&mut SignatureConstraints)) -> Self {
        let cs = self
            .policy
            .counter_signature
            .get_or_insert_with(SignatureConstraints::recommended);
        f(cs);
        self
    }

    pub fn with_timestamp(mut self, f: impl FnOnce(&mut TimestampConstraints)) -> Self {
        f(&mut self.policy.timestamp);
        self
    }

    pub fn with_revocation(mut self, f: impl FnOnce(&mut RevocationConstraints)) -> Self {
        f(&mut self.policy.revocation);
        self
    }

    pub fn with_cryptographic(mut self, f: impl FnOnce(&mut CryptographicConstraint)) -> Self {
        f(&mut self.policy.cryptographic);
        self
    }

    pub fn with_past_validation(mut self, f: impl FnOnce(&mut PastValidationConstraints)) -> Self {
        f(&mut self.policy.past_validation);
        self
    }

    /// Finish building; fails if any constraint value is invalid.
    pub fn build(self) -> Result<ValidationPolicy, ValidationError> {
        self.policy.validate()?;
        Ok(self.policy)
    }
}
