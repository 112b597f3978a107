// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::bbb::EvaluationContext;
use crate::path::CertificatePath;
use crate::poe::PoeRegistry;
use crate::report::BlockResult;
use crate::revocation::{self, StatusAt};
use ades_validation_chain::policy::BasicSignatureConstraints;
use ades_validation_chain::{tags, Chain, ChainItem, SubIndication, TokenId, ValidationError};

/// Whether every object of the chain is proven to exist, unrevoked and within its validity, at
/// the control time `ctx.at`.
pub(super) fn validation_time_sliding<'d>(
    ctx: &EvaluationContext<'d>,
    poe: &'d PoeRegistry,
    target: &'d TokenId,
    path: &CertificatePath<'d>,
    constraints: &'d BasicSignatureConstraints,
) -> Result<BlockResult, ValidationError> {
    let past = &ctx.policy.past_validation;
    let revocation_crypto = ctx.policy.revocation.cryptographic.as_ref();
    let mut chain: Chain<'d, EvaluationContext<'d>> = Chain::new("VTS");

    chain.push(
        ChainItem::new(
            "target_poe",
            tags::VTS_ITPOE,
            tags::VTS_ITPOE_ANS,
            SubIndication::NoPoe,
            move |ctx: &EvaluationContext<'d>| Ok(poe.has_poe(target, ctx.at)),
        )
        .detail(target.to_string()),
    );

    for (position, cert) in path.non_anchor().enumerate() {
        let is_signer = position == 0;
        let cert_constraints = if is_signer {
            &constraints.signing_certificate
        } else {
            &constraints.ca_certificate
        };

        chain.push(
            ChainItem::new(
                "certificate_poe",
                tags::VTS_ICPOE,
                tags::VTS_ICPOE_ANS,
                SubIndication::NoPoe,
                move |ctx: &EvaluationContext<'d>| Ok(poe.has_poe(&cert.id, ctx.at)),
            )
            .constraint(past.certificate_poe.as_ref())
            .detail(cert.id.to_string()),
        );

        if !cert.ocsp_no_check {
            let selected = revocation::select(ctx.data, cert, ctx.at, Some(poe), revocation_crypto);
            let status = revocation::status_at_time(
                ctx.data,
                cert,
                ctx.at,
                selected,
                revocation_crypto,
            );

            chain.push(
                ChainItem::new(
                    "revocation_available",
                    tags::VTS_IRDA,
                    tags::VTS_IRDA_ANS,
                    SubIndication::TryLater,
                    move |_| Ok(selected.is_some()),
                )
                .constraint(cert_constraints.revocation_data_available.as_ref())
                .detail(cert.id.to_string()),
            );
            chain.push(
                ChainItem::new(
                    "revocation_poe",
                    tags::VTS_IRPOE,
                    tags::VTS_IRPOE_ANS,
                    SubIndication::NoPoe,
                    move |ctx: &EvaluationContext<'d>| {
                        Ok(selected
                            .map(|r| poe.has_poe(&r.id, ctx.at))
                            .unwrap_or(false))
                    },
                )
                .constraint(past.revocation_poe.as_ref())
                .detail(
                    selected
                        .map(|r| r.id.to_string())
                        .unwrap_or_else(|| cert.id.to_string()),
                ),
            );

            let failure = match status {
                Some(StatusAt::RevokedUndated) => SubIndication::Revoked,
                _ if is_signer => SubIndication::RevokedNoPoe,
                _ => SubIndication::RevokedCaNoPoe,
            };
            chain.push(
                ChainItem::new(
                    "not_revoked_at_control_time",
                    tags::VTS_ICNR,
                    tags::VTS_ICNR_ANS,
                    failure,
                    move |_| Ok(!status.map(StatusAt::is_revoked).unwrap_or(false)),
                )
                .constraint(cert_constraints.not_revoked.as_ref())
                .detail(cert.id.to_string()),
            );
        }

        chain.push(
            ChainItem::new(
                "validity_at_control_time",
                tags::VTS_ICVCT,
                tags::VTS_ICVCT_ANS,
                SubIndication::OutOfBoundsNoPoe,
                move |ctx: &EvaluationContext<'d>| Ok(cert.is_valid_at(ctx.at)),
            )
            .constraint(cert_constraints.not_expired.as_ref())
            .detail(cert.id.to_string()),
        );
    }

    Ok(chain.execute(ctx)?.into())
}
