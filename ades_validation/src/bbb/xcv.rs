// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{algorithm_item, EvaluationContext};
use crate::diagnostic::{CertificateFacts, RevocationFacts};
use crate::path::CertificatePath;
use crate::report::{BlockResult, SubXcv};
use crate::revocation::{self, StatusAt};
use ades_validation_chain::policy::{BasicSignatureConstraints, CertificateConstraints};
use ades_validation_chain::{tags, Chain, ChainItem, SubIndication, TokenId, ValidationError};
use chrono::Duration;
use tracing::trace;

const SUB_XCV: &str = "certificate_validation";

/// Chain-level result plus the per-certificate results that were part of it.
#[derive(Debug, Clone)]
pub struct XcvOutcome {
    pub result: BlockResult,
    pub certificates: Vec<SubXcv>,
}

/// X.509 certificate validation of the chain of `signing_certificate` at `ctx.at`.
///
/// Every non-anchor certificate gets its own sub-validation, signing certificate first. Only the
/// sub-validations the chain actually looked at are returned.
pub fn certificate_chain_validation<'d>(
    ctx: &EvaluationContext<'d>,
    constraints: &'d BasicSignatureConstraints,
    signing_certificate: &TokenId,
) -> Result<XcvOutcome, ValidationError> {
    let path = CertificatePath::build(ctx.data, signing_certificate)?;

    let mut subs = Vec::new();
    for (position, cert) in path.non_anchor().enumerate() {
        let is_signer = position == 0;
        let cert_constraints = if is_signer {
            &constraints.signing_certificate
        } else {
            &constraints.ca_certificate
        };
        let result = sub_certificate_validation(ctx, cert, cert_constraints, is_signer)?;
        subs.push(SubXcv {
            certificate: cert.id.clone(),
            result,
        });
    }

    let mut chain: Chain<'d, EvaluationContext<'d>> = Chain::new("XCV");
    let trusted = path.is_trusted();
    chain.push(
        ChainItem::new(
            "prospective_chain",
            tags::BBB_XCV_CCCBB,
            tags::BBB_XCV_CCCBB_ANS,
            SubIndication::NoCertificateChainFound,
            move |_| Ok(trusted),
        )
        .constraint(constraints.prospective_certificate_chain.as_ref())
        .detail(format!("{:?}", path.termination)),
    );

    for sub in &subs {
        let conclusion = &sub.result.conclusion;
        let passed = conclusion.is_passed();
        let failure = conclusion
            .sub_indication
            .unwrap_or(SubIndication::CertificateChainGeneralFailure);
        chain.push(
            ChainItem::new(
                SUB_XCV,
                tags::BBB_XCV_SUB,
                tags::BBB_XCV_SUB_ANS,
                failure,
                move |_| Ok(passed),
            )
            .detail(sub.certificate.to_string()),
        );
    }

    let outcome = chain.execute(ctx)?;
    let evaluated = outcome.trace.names().filter(|n| *n == SUB_XCV).count();
    subs.truncate(evaluated);

    let mut result: BlockResult = outcome.into();
    for sub in &subs {
        result.conclusion.merge_notes(&sub.result.conclusion);
    }

    Ok(XcvOutcome {
        result,
        certificates: subs,
    })
}

fn sub_certificate_validation<'d>(
    ctx: &EvaluationContext<'d>,
    cert: &'d CertificateFacts,
    constraints: &'d CertificateConstraints,
    is_signer: bool,
) -> Result<BlockResult, ValidationError> {
    let at = ctx.at;
    let constraint_failure = if is_signer {
        SubIndication::SigConstraintsFailure
    } else {
        SubIndication::ChainConstraintsFailure
    };

    let revocation_crypto = ctx.policy.revocation.cryptographic.as_ref();
    let selected = revocation::select(ctx.data, cert, at, ctx.poe, revocation_crypto);
    let status = revocation::status_at_time(ctx.data, cert, at, selected, revocation_crypto);
    let max_age = match &constraints.revocation_freshness {
        Some(f) => Some(f.duration("revocation_freshness")?),
        None => None,
    };
    trace!(
        certificate = %cert.id,
        revocation = ?selected.map(|r| &r.id),
        status = ?status,
        "revocation data selected"
    );

    let mut chain: Chain<'d, EvaluationContext<'d>> = Chain::new("SubXCV");

    chain.push(
        ChainItem::new(
            "certificate_signature",
            tags::BBB_XCV_ICSI,
            tags::BBB_XCV_ICSI_ANS,
            SubIndication::CertificateChainGeneralFailure,
            move |_| Ok(cert.signature_intact),
        )
        .constraint(constraints.signature.as_ref()),
    );

    if !is_signer {
        chain.push(
            ChainItem::new(
                "ca_basic_constraint",
                tags::BBB_XCV_ICA,
                tags::BBB_XCV_ICA_ANS,
                SubIndication::ChainConstraintsFailure,
                move |_| Ok(cert.ca),
            )
            .constraint(constraints.ca.as_ref()),
        );
    }

    if let Some(ku) = &constraints.key_usage {
        chain.push(
            ChainItem::new(
                "key_usage",
                tags::BBB_XCV_ISCGKU,
                tags::BBB_XCV_ISCGKU_ANS,
                constraint_failure,
                move |_| Ok(ku.accepts_any(&cert.key_usages)),
            )
            .with_level(ku.level),
        );
    }

    if let Some(eku) = &constraints.extended_key_usage {
        chain.push(
            ChainItem::new(
                "extended_key_usage",
                tags::BBB_XCV_ISCGEKU,
                tags::BBB_XCV_ISCGEKU_ANS,
                constraint_failure,
                move |_| Ok(eku.accepts_any(&cert.extended_key_usages)),
            )
            .with_level(eku.level),
        );
    }

    let validity_failure = if at < cert.not_before {
        SubIndication::NotYetValid
    } else if status == Some(StatusAt::Good) {
        SubIndication::OutOfBoundsNotRevoked
    } else {
        SubIndication::OutOfBoundsNoPoe
    };
    chain.push(
        ChainItem::new(
            "validity_range",
            tags::BBB_XCV_ICTIVRSC,
            tags::BBB_XCV_ICTIVRSC_ANS,
            validity_failure,
            move |ctx: &EvaluationContext<'d>| Ok(cert.is_valid_at(ctx.at)),
        )
        .constraint(constraints.not_expired.as_ref())
        .detail(format!("{} .. {}", cert.not_before, cert.not_after)),
    );

    if !cert.ocsp_no_check {
        push_revocation_checks(&mut chain, cert, constraints, selected, status, max_age, is_signer);
    }

    let crypto = ctx.policy.cryptographic_for(constraints.cryptographic.as_ref());
    chain.push(algorithm_item(
        "cryptographic_constraints",
        ctx,
        crypto,
        cert.signature_algorithm.as_ref(),
        &cert.id,
    ));

    Ok(chain.execute(ctx)?.into())
}

fn push_revocation_checks<'d>(
    chain: &mut Chain<'d, EvaluationContext<'d>>,
    cert: &'d CertificateFacts,
    constraints: &'d CertificateConstraints,
    selected: Option<&'d RevocationFacts>,
    status: Option<StatusAt>,
    max_age: Option<Duration>,
    is_signer: bool,
) {
    let revocation_id = selected.map(|r| r.id.to_string());

    chain.push(
        ChainItem::new(
            "revocation_data_available",
            tags::BBB_XCV_IRDPFC,
            tags::BBB_XCV_IRDPFC_ANS,
            SubIndication::TryLater,
            move |_| Ok(selected.is_some()),
        )
        .constraint(constraints.revocation_data_available.as_ref())
        .detail(cert.id.to_string()),
    );

    chain.push(
        ChainItem::new(
            "revocation_status_known",
            tags::BBB_XCV_IRSK,
            tags::BBB_XCV_IRSK_ANS,
            SubIndication::TryLater,
            move |_| Ok(!matches!(status, None | Some(StatusAt::Unknown))),
        )
        .constraint(constraints.revocation_status_known.as_ref()),
    );

    let revoked_failure = match status {
        Some(StatusAt::RevokedUndated) => SubIndication::Revoked,
        _ if is_signer => SubIndication::RevokedNoPoe,
        _ => SubIndication::RevokedCaNoPoe,
    };
    let mut not_revoked = ChainItem::new(
        "not_revoked",
        tags::BBB_XCV_ISCR,
        tags::BBB_XCV_ISCR_ANS,
        revoked_failure,
        move |_| Ok(!status.map(StatusAt::is_revoked).unwrap_or(false)),
    )
    .constraint(constraints.not_revoked.as_ref());
    if let Some(StatusAt::Revoked { time, reason }) = status {
        not_revoked = not_revoked.detail(format!("{time} ({reason:?})"));
    }
    chain.push(not_revoked);

    chain.push(
        ChainItem::new(
            "not_on_hold",
            tags::BBB_XCV_ISCOH,
            tags::BBB_XCV_ISCOH_ANS,
            SubIndication::TryLater,
            move |_| Ok(status != Some(StatusAt::OnHold)),
        )
        .constraint(constraints.not_on_hold.as_ref()),
    );

    let mut freshness = ChainItem::new(
        "revocation_freshness",
        tags::BBB_XCV_IRIF,
        tags::BBB_XCV_IRIF_ANS,
        SubIndication::TryLater,
        move |ctx: &EvaluationContext<'d>| {
            Ok(selected
                .map(|r| revocation::is_fresh(r, ctx.at, max_age))
                .unwrap_or(false))
        },
    )
    .constraint(
        constraints
            .revocation_freshness
            .as_ref()
            .map(|f| f.level_constraint())
            .as_ref(),
    );
    if let Some(id) = &revocation_id {
        freshness = freshness.detail(id.clone());
    }
    chain.push(freshness);
}
