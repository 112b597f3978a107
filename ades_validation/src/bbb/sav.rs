// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{algorithm_item, EvaluationContext, ValidationTarget};
use crate::diagnostic::SignedAttribute;
use crate::report::BlockResult;
use ades_validation_chain::policy::{BasicSignatureConstraints, LevelConstraint};
use ades_validation_chain::{tags, Chain, ChainItem, SubIndication, ValidationError};

pub(super) fn signature_acceptance<'d>(
    ctx: &EvaluationContext<'d>,
    target: ValidationTarget<'d>,
    basic: &'d BasicSignatureConstraints,
) -> Result<BlockResult, ValidationError> {
    let mut chain: Chain<'d, EvaluationContext<'d>> = Chain::new("SAV");

    if let ValidationTarget::Signature(signature) = target {
        if let Some(constraints) = target.signature_constraints(ctx.policy)? {
            let acceptance = &constraints.acceptance;

            chain.push(
                ChainItem::new(
                    "signing_time_plausible",
                    tags::BBB_SAV_ISTP,
                    tags::BBB_SAV_ISTP_ANS,
                    SubIndication::SigConstraintsFailure,
                    move |ctx: &EvaluationContext<'d>| {
                        Ok(signature
                            .claimed_signing_time
                            .map(|t| t <= ctx.at)
                            .unwrap_or(true))
                    },
                )
                .constraint(acceptance.signing_time_plausible.as_ref()),
            );

            if let Some(formats) = &acceptance.accepted_formats {
                chain.push(
                    ChainItem::new(
                        "accepted_format",
                        tags::BBB_SAV_ISFA,
                        tags::BBB_SAV_ISFA_ANS,
                        SubIndication::SigConstraintsFailure,
                        move |_| Ok(formats.accepts_label(&signature.format)),
                    )
                    .with_level(formats.level)
                    .detail(signature.format.clone()),
                );
            }

            let attrs = &acceptance.signed_attributes;
            let mandated: [(&'static str, SignedAttribute, Option<&'d LevelConstraint>); 6] = [
                ("signing_time_present", SignedAttribute::SigningTime, attrs.signing_time.as_ref()),
                ("content_type_present", SignedAttribute::ContentType, attrs.content_type.as_ref()),
                (
                    "commitment_type_present",
                    SignedAttribute::CommitmentTypeIndication,
                    attrs.commitment_type_indication.as_ref(),
                ),
                (
                    "signer_location_present",
                    SignedAttribute::SignerLocation,
                    attrs.signer_location.as_ref(),
                ),
                ("claimed_roles_present", SignedAttribute::ClaimedRoles, attrs.claimed_roles.as_ref()),
                (
                    "content_timestamp_present",
                    SignedAttribute::ContentTimestamp,
                    attrs.content_timestamp.as_ref(),
                ),
            ];
            for (name, attribute, constraint) in mandated {
                chain.push(
                    ChainItem::new(
                        name,
                        tags::BBB_SAV_ISQPP,
                        tags::BBB_SAV_ISQPP_ANS,
                        SubIndication::SigConstraintsFailure,
                        move |_| Ok(signature.signed_attributes.contains(&attribute)),
                    )
                    .constraint(constraint)
                    .detail(attribute.name()),
                );
            }
        }
    }

    let token = target.token();
    let crypto = ctx.policy.cryptographic_for(basic.cryptographic.as_ref());
    chain.push(algorithm_item(
        "cryptographic_constraints",
        ctx,
        crypto,
        token.signature_algorithm(),
        token.id(),
    ));

    Ok(chain.execute(ctx)?.into())
}
