// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Checks that need the POE gathered from time-stamps: best-signature-time against the signing
//! certificate, time-stamp delay and time-stamp coherence.

use crate::bbb::EvaluationContext;
use crate::diagnostic::{CertificateFacts, SignatureFacts, TimestampFacts, TimestampKind};
use crate::poe::PoeRegistry;
use crate::report::BlockResult;
use ades_validation_chain::policy::LongTermConstraints;
use ades_validation_chain::{tags, Chain, ChainItem, SubIndication, ValidationError};
use chrono::{DateTime, Utc};

/// Best-signature-time: the earliest POE of the signature, the validation time at the latest.
pub fn best_signature_time(
    poe: &PoeRegistry,
    signature: &SignatureFacts,
) -> DateTime<Utc> {
    poe.earliest(&signature.id, poe.validation_time())
        .unwrap_or_else(|| poe.validation_time())
}

/// Content ≤ signature ≤ validation-data ≤ archive, by production time.
pub(crate) fn coherent_order(timestamps: &[&TimestampFacts]) -> bool {
    timestamps.iter().all(|a| {
        timestamps.iter().all(|b| match (a.kind.coherence_rank(), b.kind.coherence_rank()) {
            (Some(ra), Some(rb)) if ra < rb => a.production_time <= b.production_time,
            _ => true,
        })
    })
}

pub fn long_term_checks<'d>(
    ctx: &EvaluationContext<'d>,
    signature: &'d SignatureFacts,
    constraints: &'d LongTermConstraints,
    signing_certificate: Option<&'d CertificateFacts>,
    best_signature_time: DateTime<Utc>,
    valid_timestamps: Vec<&'d TimestampFacts>,
) -> Result<BlockResult, ValidationError> {
    let mut chain: Chain<'d, EvaluationContext<'d>> = Chain::new("LTV");

    if let Some(cert) = signing_certificate {
        chain.push(
            ChainItem::new(
                "best_signature_time_after_issuance",
                tags::ADEST_IBSTAIDOSC,
                tags::ADEST_IBSTAIDOSC_ANS,
                SubIndication::NotYetValid,
                move |_| Ok(best_signature_time >= cert.not_before),
            )
            .constraint(constraints.best_signature_time_before_issuance.as_ref())
            .detail(format!("{best_signature_time} < {}", cert.not_before)),
        );
    }

    if let Some(delay) = &constraints.timestamp_delay {
        let max_delay = delay.duration("timestamp_delay")?;
        let first_signature_timestamp = valid_timestamps
            .iter()
            .filter(|t| t.kind == TimestampKind::Signature)
            .map(|t| t.production_time)
            .min();
        chain.push(
            ChainItem::new(
                "timestamp_delay",
                tags::ADEST_ITDWL,
                tags::ADEST_ITDWL_ANS,
                SubIndication::SigConstraintsFailure,
                move |_| {
                    Ok(match (signature.claimed_signing_time, first_signature_timestamp) {
                        (Some(claimed), Some(ts)) => ts - claimed <= max_delay,
                        _ => true,
                    })
                },
            )
            .constraint(Some(&delay.level_constraint())),
        );
    }

    chain.push(
        ChainItem::new(
            "timestamp_coherence",
            tags::ADEST_ITCO,
            tags::ADEST_ITCO_ANS,
            SubIndication::TimestampOrderFailure,
            move |_| Ok(coherent_order(&valid_timestamps)),
        )
        .constraint(constraints.timestamp_coherence.as_ref()),
    );

    Ok(chain.execute(ctx)?.into())
}
