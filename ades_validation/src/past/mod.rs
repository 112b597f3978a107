// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Validation in the past.
//!
//! When the building blocks end `INDETERMINATE` for a time-sensitive reason, the target's POE
//! times before the validation time are tried as control times, latest first. At each candidate
//! the chain objects must be proven to exist and be valid (validation time sliding), the chain
//! must validate at that time (past certificate validation) and the target's algorithm must
//! still be acceptable (past signature validation). The first candidate passing all three wins.

mod psv;
mod vts;

use crate::bbb::{certificate_chain_validation, EvaluationContext, ValidationTarget};
use crate::path::CertificatePath;
use crate::poe::PoeRegistry;
use crate::report::{
    BasicBuildingBlocks, Block, ControlTimeResult, PastValidation, PastValidationAttempt,
};
use ades_validation_chain::{tags, Conclusion, Message, ValidationError};
use tracing::debug;

/// Past validation of `target`, or `None` when `bbb` does not call for it.
pub fn past_validation<'d>(
    ctx: &EvaluationContext<'d>,
    poe: &'d PoeRegistry,
    target: ValidationTarget<'d>,
    bbb: &BasicBuildingBlocks,
) -> Result<Option<PastValidation>, ValidationError> {
    if !bbb.needs_past_validation() {
        return Ok(None);
    }
    let (Some(trigger), Some(signing_certificate)) =
        (bbb.conclusion.sub_indication, bbb.signing_certificate.as_ref())
    else {
        return Ok(None);
    };

    let path = CertificatePath::build(ctx.data, signing_certificate)?;
    let constraints = target.basic_constraints(ctx.policy)?;
    let target_id = target.id();

    let candidates: Vec<_> = poe
        .poe_times(target_id, ctx.at)
        .into_iter()
        .filter(|t| *t < ctx.at)
        .collect();
    debug!(
        token = %target_id,
        trigger = %trigger,
        candidates = candidates.len(),
        "validation in the past started"
    );

    let mut attempts = Vec::new();
    for control_time in candidates {
        let at = ctx.with_poe(poe).at(control_time);
        let mut blocks = Vec::new();

        let vts = vts::validation_time_sliding(&at, poe, target_id, &path, constraints)?;
        let vts_passed = vts.conclusion.is_passed();
        blocks.push(Block::ValidationTimeSliding(ControlTimeResult {
            result: vts,
            control_time,
        }));

        if vts_passed {
            let pcv = certificate_chain_validation(&at, constraints, signing_certificate)?;
            let pcv_passed = pcv.result.conclusion.is_passed();
            blocks.push(Block::PastCertificateValidation {
                control: ControlTimeResult {
                    result: pcv.result,
                    control_time,
                },
                certificates: pcv.certificates,
            });

            if pcv_passed {
                let psv = psv::past_signature_validation(&at, target, constraints)?;
                blocks.push(Block::PastSignatureValidation(ControlTimeResult {
                    result: psv,
                    control_time,
                }));
            }
        }

        let attempt = PastValidationAttempt {
            control_time,
            blocks,
        };
        let passed = attempt.passed();
        debug!(token = %target_id, %control_time, passed, "control time tried");

        if passed {
            let mut conclusion = Conclusion::passed();
            for b in &attempt.blocks {
                conclusion.merge_notes(b.conclusion());
            }
            attempts.push(attempt);
            return Ok(Some(PastValidation {
                trigger,
                attempts,
                conclusion,
                control_time: Some(control_time),
            }));
        }
        attempts.push(attempt);
    }

    Ok(Some(PastValidation {
        trigger,
        attempts,
        conclusion: Conclusion::failed(trigger, Message::new(tags::PSV_IPSVC_ANS)),
        control_time: None,
    }))
}
