// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{EvaluationContext, ValidationTarget};
use crate::report::BlockResult;
use ades_validation_chain::policy::BasicSignatureConstraints;
use ades_validation_chain::{tags, Chain, ChainItem, SubIndication, ValidationError};

/// Reference data found and intact, then signature value intact.
///
/// For a time-stamp the message imprint plays the role of the reference data.
pub(super) fn cryptographic_verification<'d>(
    ctx: &EvaluationContext<'d>,
    target: ValidationTarget<'d>,
    constraints: &'d BasicSignatureConstraints,
) -> Result<BlockResult, ValidationError> {
    let mut chain: Chain<'d, EvaluationContext<'d>> = Chain::new("CV");

    match target {
        ValidationTarget::Signature(signature) => {
            let matchers = &signature.digest_matchers;
            let missing: Vec<&str> = matchers
                .iter()
                .filter(|m| !m.found)
                .map(|m| m.name.as_str())
                .collect();
            let broken: Vec<&str> = matchers
                .iter()
                .filter(|m| m.found && !m.intact)
                .map(|m| m.name.as_str())
                .collect();

            chain.push(
                ChainItem::new(
                    "reference_data_found",
                    tags::BBB_CV_IRDOF,
                    tags::BBB_CV_IRDOF_ANS,
                    SubIndication::SignedDataNotFound,
                    move |_| Ok(!matchers.is_empty() && matchers.iter().all(|m| m.found)),
                )
                .constraint(constraints.reference_data_existence.as_ref())
                .detail(missing.join(", ")),
            );
            chain.push(
                ChainItem::new(
                    "reference_data_intact",
                    tags::BBB_CV_IRDOI,
                    tags::BBB_CV_IRDOI_ANS,
                    SubIndication::HashFailure,
                    move |_| Ok(matchers.iter().filter(|m| m.found).all(|m| m.intact)),
                )
                .constraint(constraints.reference_data_intact.as_ref())
                .detail(broken.join(", ")),
            );
        }
        ValidationTarget::Timestamp(timestamp) => {
            chain.push(
                ChainItem::new(
                    "message_imprint_found",
                    tags::BBB_CV_TSP_IMIDF,
                    tags::BBB_CV_TSP_IMIDF_ANS,
                    SubIndication::SignedDataNotFound,
                    move |_| Ok(timestamp.message_imprint_found),
                )
                .constraint(constraints.reference_data_existence.as_ref()),
            );
            chain.push(
                ChainItem::new(
                    "message_imprint_intact",
                    tags::BBB_CV_TSP_IMIVC,
                    tags::BBB_CV_TSP_IMIVC_ANS,
                    SubIndication::HashFailure,
                    move |_| Ok(timestamp.message_imprint_intact),
                )
                .constraint(constraints.reference_data_intact.as_ref()),
            );
        }
    }

    let token = target.token();
    chain.push(
        ChainItem::new(
            "signature_intact",
            tags::BBB_CV_ISI,
            tags::BBB_CV_ISI_ANS,
            SubIndication::SigCryptoFailure,
            move |_| Ok(token.signature_intact()),
        )
        .constraint(constraints.signature_intact.as_ref())
        .detail(token.id().to_string()),
    );

    Ok(chain.execute(ctx)?.into())
}
