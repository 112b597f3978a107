// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Conclusion tree produced by a validation run.

use crate::diagnostic::TimestampKind;
use ades_validation_chain::message::MessageTag;
use ades_validation_chain::{
    ChainOutcome, Conclusion, ConstraintTrace, Indication, SubIndication, TokenId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Trace and conclusion of one building block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockResult {
    pub constraints: ConstraintTrace,
    pub conclusion: Conclusion,
}

impl From<ChainOutcome> for BlockResult {
    fn from(outcome: ChainOutcome) -> Self {
        Self {
            constraints: outcome.trace,
            conclusion: outcome.conclusion,
        }
    }
}

/// A block evaluated at a control time instead of the validation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlTimeResult {
    pub result: BlockResult,
    pub control_time: DateTime<Utc>,
}

/// Validation of one certificate of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubXcv {
    pub certificate: TokenId,
    pub result: BlockResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BlockKind {
    FormatChecking,
    IdentificationOfSigningCertificate,
    X509CertificateValidation,
    CryptographicVerification,
    SignatureAcceptanceValidation,
    ValidationTimeSliding,
    PastCertificateValidation,
    PastSignatureValidation,
    LongTermValidation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "block")]
pub enum Block {
    FormatChecking(BlockResult),
    IdentificationOfSigningCertificate(BlockResult),
    X509CertificateValidation {
        result: BlockResult,
        certificates: Vec<SubXcv>,
    },
    CryptographicVerification(BlockResult),
    SignatureAcceptanceValidation(BlockResult),
    ValidationTimeSliding(ControlTimeResult),
    PastCertificateValidation {
        control: ControlTimeResult,
        certificates: Vec<SubXcv>,
    },
    PastSignatureValidation(ControlTimeResult),
    LongTermValidation(BlockResult),
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::FormatChecking(_) => BlockKind::FormatChecking,
            Block::IdentificationOfSigningCertificate(_) => {
                BlockKind::IdentificationOfSigningCertificate
            }
            Block::X509CertificateValidation { .. } => BlockKind::X509CertificateValidation,
            Block::CryptographicVerification(_) => BlockKind::CryptographicVerification,
            Block::SignatureAcceptanceValidation(_) => BlockKind::SignatureAcceptanceValidation,
            Block::ValidationTimeSliding(_) => BlockKind::ValidationTimeSliding,
            Block::PastCertificateValidation { .. } => BlockKind::PastCertificateValidation,
            Block::PastSignatureValidation(_) => BlockKind::PastSignatureValidation,
            Block::LongTermValidation(_) => BlockKind::LongTermValidation,
        }
    }

    pub fn result(&self) -> &BlockResult {
        match self {
            Block::FormatChecking(r)
            | Block::IdentificationOfSigningCertificate(r)
            | Block::CryptographicVerification(r)
            | Block::SignatureAcceptanceValidation(r)
            | Block::LongTermValidation(r) => r,
            Block::X509CertificateValidation { result, .. } => result,
            Block::ValidationTimeSliding(c) | Block::PastSignatureValidation(c) => &c.result,
            Block::PastCertificateValidation { control, .. } => &control.result,
        }
    }

    pub fn conclusion(&self) -> &Conclusion {
        &self.result().conclusion
    }

    pub fn control_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Block::ValidationTimeSliding(c) | Block::PastSignatureValidation(c) => {
                Some(c.control_time)
            }
            Block::PastCertificateValidation { control, .. } => Some(control.control_time),
            _ => None,
        }
    }

    pub fn certificates(&self) -> &[SubXcv] {
        match self {
            Block::X509CertificateValidation { certificates, .. }
            | Block::PastCertificateValidation { certificates, .. } => certificates,
            _ => &[],
        }
    }
}

/// The ordered building blocks run for one token at one evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicBuildingBlocks {
    pub target: TokenId,
    pub evaluation_time: DateTime<Utc>,
    pub signing_certificate: Option<TokenId>,
    pub blocks: Vec<Block>,
    pub conclusion: Conclusion,
}

impl BasicBuildingBlocks {
    pub fn block(&self, kind: BlockKind) -> Option<&Block> {
        self.blocks.iter().find(|b| b.kind() == kind)
    }

    pub fn kinds(&self) -> Vec<BlockKind> {
        self.blocks.iter().map(Block::kind).collect()
    }

    /// Whether validation at an earlier control time could change the outcome.
    ///
    /// True when the conclusion is time-sensitive and no block failed for another reason.
    pub fn needs_past_validation(&self) -> bool {
        self.conclusion.is_time_sensitive()
            && self.blocks.iter().all(|b| {
                let c = b.conclusion();
                c.is_passed() || c.is_time_sensitive()
            })
    }
}

/// One candidate control time tried during past validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PastValidationAttempt {
    pub control_time: DateTime<Utc>,
    pub blocks: Vec<Block>,
}

impl PastValidationAttempt {
    pub fn passed(&self) -> bool {
        matches!(
            self.blocks.last(),
            Some(Block::PastSignatureValidation(c)) if c.result.conclusion.is_passed()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PastValidation {
    /// Sub-indication of the current-time result that triggered the search.
    pub trigger: SubIndication,
    /// Attempts in the order tried; control times never increase.
    pub attempts: Vec<PastValidationAttempt>,
    pub conclusion: Conclusion,
    pub control_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampReport {
    pub id: TokenId,
    pub kind: TimestampKind,
    pub production_time: DateTime<Utc>,
    pub basic_building_blocks: BasicBuildingBlocks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_validation: Option<PastValidation>,
    pub conclusion: Conclusion,
}

impl TimestampReport {
    pub fn is_valid(&self) -> bool {
        self.conclusion.is_passed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureReport {
    pub id: TokenId,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_signature_of: Option<TokenId>,
    pub basic_building_blocks: BasicBuildingBlocks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_validation: Option<PastValidation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_term: Option<Block>,
    pub best_signature_time: Option<DateTime<Utc>>,
    pub conclusion: Conclusion,
}

impl SignatureReport {
    pub fn indication(&self) -> Indication {
        self.conclusion.indication
    }

    pub fn sub_indication(&self) -> Option<SubIndication> {
        self.conclusion.sub_indication
    }

    pub fn control_time(&self) -> Option<DateTime<Utc>> {
        self.past_validation.as_ref().and_then(|p| p.control_time)
    }
}

/// Overall conclusion for a token from its parts.
///
/// A `FAILED` building-block result is final. A time-sensitive `INDETERMINATE` one is replaced by
/// the past validation result. A non-passed long-term result overrides a passed base, and a
/// `FAILED` long-term result overrides any base.
pub fn aggregate(
    bbb: &BasicBuildingBlocks,
    past: Option<&PastValidation>,
    long_term: Option<&Conclusion>,
) -> Conclusion {
    if bbb.conclusion.is_failed() {
        return bbb.conclusion.clone();
    }

    let base = match past {
        Some(p) if bbb.conclusion.is_time_sensitive() => {
            p.conclusion.clone().with_notes_from(&bbb.conclusion)
        }
        _ => bbb.conclusion.clone(),
    };

    match long_term {
        Some(lt) if lt.is_failed() || (base.is_passed() && !lt.is_passed()) => {
            lt.clone().with_notes_from(&base)
        }
        Some(lt) => base.with_notes_from(lt),
        None => base,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedReport {
    pub validation_time: DateTime<Utc>,
    pub policy_name: String,
    pub timestamps: Vec<TimestampReport>,
    pub signatures: Vec<SignatureReport>,
}

impl DetailedReport {
    pub fn signature(&self, id: &TokenId) -> Option<&SignatureReport> {
        self.signatures.iter().find(|s| &s.id == id)
    }

    pub fn timestamp(&self, id: &TokenId) -> Option<&TimestampReport> {
        self.timestamps.iter().find(|t| &t.id == id)
    }

    pub fn simple_report(&self) -> SimpleReport {
        let signatures: Vec<SimpleSignature> = self
            .signatures
            .iter()
            .map(|s| SimpleSignature {
                id: s.id.clone(),
                format: s.format.clone(),
                indication: s.conclusion.indication,
                sub_indication: s.conclusion.sub_indication,
                best_signature_time: s.best_signature_time,
                control_time: s.control_time(),
                errors: s.conclusion.errors.iter().map(|m| m.tag).collect(),
                warnings: s.conclusion.warnings.iter().map(|m| m.tag).collect(),
            })
            .collect();

        SimpleReport {
            validation_time: self.validation_time,
            policy_name: self.policy_name.clone(),
            valid_signatures: signatures
                .iter()
                .filter(|s| s.indication == Indication::Passed)
                .count(),
            signatures_count: signatures.len(),
            signatures,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleSignature {
    pub id: TokenId,
    pub format: String,
    pub indication: Indication,
    pub sub_indication: Option<SubIndication>,
    pub best_signature_time: Option<DateTime<Utc>>,
    pub control_time: Option<DateTime<Utc>>,
    pub errors: Vec<MessageTag>,
    pub warnings: Vec<MessageTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleReport {
    pub validation_time: DateTime<Utc>,
    pub policy_name: String,
    pub signatures: Vec<SimpleSignature>,
    pub valid_signatures: usize,
    pub signatures_count: usize,
}
