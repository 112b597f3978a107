// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Basic building blocks.
//!
//! Blocks run in a fixed order: format checking (signatures only), identification of the signing
//! certificate, X.509 certificate validation, cryptographic verification and signature
//! acceptance validation. The run stops at the first `FAILED` block; an `INDETERMINATE` block does
//! not stop it so that a later certain failure is still reported.

mod crypto;
mod cv;
mod fc;
mod isc;
mod sav;
mod xcv;

pub use xcv::{certificate_chain_validation, XcvOutcome};

pub(crate) use crypto::algorithm_item;

use crate::diagnostic::{DiagnosticData, SignatureFacts, SignedToken, TimestampFacts};
use crate::poe::PoeRegistry;
use crate::report::{BasicBuildingBlocks, Block};
use ades_validation_chain::policy::{BasicSignatureConstraints, SignatureConstraints};
use ades_validation_chain::{Conclusion, TokenId, ValidationError, ValidationPolicy};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Everything a check may read: the facts, the policy, the evaluation time and, when validating
/// in the past, the POE registry.
#[derive(Clone, Copy)]
pub struct EvaluationContext<'d> {
    pub data: &'d DiagnosticData,
    pub policy: &'d ValidationPolicy,
    pub at: DateTime<Utc>,
    pub poe: Option<&'d PoeRegistry>,
}

impl<'d> EvaluationContext<'d> {
    pub fn new(data: &'d DiagnosticData, policy: &'d ValidationPolicy, at: DateTime<Utc>) -> Self {
        Self {
            data,
            policy,
            at,
            poe: None,
        }
    }

    pub fn with_poe(mut self, poe: &'d PoeRegistry) -> Self {
        self.poe = Some(poe);
        self
    }

    /// The same context pinned to another evaluation time.
    pub fn at(self, at: DateTime<Utc>) -> Self {
        Self { at, ..self }
    }
}

/// The token a building-block run is about.
#[derive(Debug, Clone, Copy)]
pub enum ValidationTarget<'d> {
    Signature(&'d SignatureFacts),
    Timestamp(&'d TimestampFacts),
}

impl<'d> ValidationTarget<'d> {
    pub fn id(&self) -> &'d TokenId {
        self.token().id()
    }

    pub fn token(&self) -> &'d dyn SignedToken {
        match *self {
            ValidationTarget::Signature(s) => s,
            ValidationTarget::Timestamp(t) => t,
        }
    }

    /// Signature constraints for a signature or counter-signature; `None` for time-stamps.
    pub fn signature_constraints(
        &self,
        policy: &'d ValidationPolicy,
    ) -> Result<Option<&'d SignatureConstraints>, ValidationError> {
        match self {
            ValidationTarget::Signature(s) if s.counter_signature_of.is_some() => policy
                .counter_signature
                .as_ref()
                .map(Some)
                .ok_or_else(|| ValidationError::UndefinedConstraint("counter_signature".into())),
            ValidationTarget::Signature(_) => Ok(Some(&policy.signature)),
            ValidationTarget::Timestamp(_) => Ok(None),
        }
    }

    pub fn basic_constraints(
        &self,
        policy: &'d ValidationPolicy,
    ) -> Result<&'d BasicSignatureConstraints, ValidationError> {
        Ok(match self.signature_constraints(policy)? {
            Some(c) => &c.basic_signature,
            None => &policy.timestamp.basic_signature,
        })
    }
}

/// Run the building blocks for `target` at `ctx.at`.
///
/// A `FAILED` block outranks an earlier `INDETERMINATE` one in the returned conclusion.
pub fn basic_building_blocks<'d>(
    ctx: &EvaluationContext<'d>,
    target: ValidationTarget<'d>,
) -> Result<BasicBuildingBlocks, ValidationError> {
    let mut blocks = Vec::new();
    let mut signing_certificate = None;

    let conclude = |blocks: Vec<Block>, signing_certificate: Option<TokenId>| {
        let conclusion = overall_conclusion(&blocks);
        debug!(
            token = %target.id(),
            at = %ctx.at,
            indication = %conclusion.indication,
            "building blocks evaluated"
        );
        BasicBuildingBlocks {
            target: target.id().clone(),
            evaluation_time: ctx.at,
            signing_certificate,
            blocks,
            conclusion,
        }
    };

    if let ValidationTarget::Signature(signature) = target {
        let constraints = target
            .signature_constraints(ctx.policy)?
            .ok_or_else(|| ValidationError::UndefinedConstraint("signature".into()))?;
        let fc = fc::format_checking(ctx, signature, &constraints.format)?;
        let stop = fc.conclusion.is_failed();
        blocks.push(Block::FormatChecking(fc));
        if stop {
            return Ok(conclude(blocks, signing_certificate));
        }
    }

    let basic = target.basic_constraints(ctx.policy)?;

    let (isc, identified) = isc::identification(ctx, target.token(), &basic.identification)?;
    let isc_passed = isc.conclusion.is_passed();
    blocks.push(Block::IdentificationOfSigningCertificate(isc));

    if isc_passed {
        if let Some(cert) = identified {
            let xcv = certificate_chain_validation(ctx, basic, cert)?;
            let stop = xcv.result.conclusion.is_failed();
            blocks.push(Block::X509CertificateValidation {
                result: xcv.result,
                certificates: xcv.certificates,
            });
            signing_certificate = Some(cert.clone());
            if stop {
                return Ok(conclude(blocks, signing_certificate));
            }
        }
    }

    let cv = cv::cryptographic_verification(ctx, target, basic)?;
    let stop = cv.conclusion.is_failed();
    blocks.push(Block::CryptographicVerification(cv));
    if stop {
        return Ok(conclude(blocks, signing_certificate));
    }

    let sav = sav::signature_acceptance(ctx, target, basic)?;
    blocks.push(Block::SignatureAcceptanceValidation(sav));

    Ok(conclude(blocks, signing_certificate))
}

/// First `FAILED` block, else first `INDETERMINATE`, else `PASSED`; notes of every block merged.
fn overall_conclusion(blocks: &[Block]) -> Conclusion {
    let decisive = blocks
        .iter()
        .find(|b| b.conclusion().is_failed())
        .or_else(|| blocks.iter().find(|b| b.conclusion().is_indeterminate()));

    let mut conclusion = match decisive {
        Some(b) => {
            let c = b.conclusion();
            Conclusion {
                warnings: Vec::new(),
                infos: Vec::new(),
                ..c.clone()
            }
        }
        None => Conclusion::passed(),
    };

    for b in blocks {
        conclusion.merge_notes(b.conclusion());
    }
    conclusion
}
