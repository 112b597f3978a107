// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::EvaluationContext;
use crate::diagnostic::{CertificateCandidate, SignedToken};
use crate::report::BlockResult;
use ades_validation_chain::policy::SigningCertificateConstraints;
use ades_validation_chain::{tags, Chain, ChainItem, SubIndication, TokenId, ValidationError};

/// The single candidate matching the signed reference: the only digest match, or the only
/// candidate when none matches by digest.
fn identify(candidates: &[CertificateCandidate]) -> Option<&CertificateCandidate> {
    let mut by_digest = candidates.iter().filter(|c| c.digest_match);
    match (by_digest.next(), by_digest.next()) {
        (Some(c), None) => Some(c),
        (Some(_), Some(_)) => None,
        (None, _) if candidates.len() == 1 => candidates.first(),
        (None, _) => None,
    }
}

pub(super) fn identification<'d>(
    ctx: &EvaluationContext<'d>,
    token: &'d dyn SignedToken,
    constraints: &'d SigningCertificateConstraints,
) -> Result<(BlockResult, Option<&'d TokenId>), ValidationError> {
    let candidates = token.signing_certificate_candidates();
    let identified = identify(candidates);

    let chain: Chain<'d, EvaluationContext<'d>> = Chain::new("ISC")
        .with(ChainItem::new(
            "signing_certificate_candidate",
            tags::BBB_ICS_ISCI,
            tags::BBB_ICS_ISCI_ANS,
            SubIndication::NoSigningCertificateFound,
            move |_| Ok(!candidates.is_empty()),
        ))
        .with(
            ChainItem::new(
                "signing_certificate_attribute",
                tags::BBB_ICS_ISASCP,
                tags::BBB_ICS_ISASCP_ANS,
                SubIndication::NoSigningCertificateFound,
                move |_| Ok(token.signing_certificate_attribute_present()),
            )
            .constraint(constraints.attribute_present.as_ref()),
        )
        .with(
            ChainItem::new(
                "signing_certificate_digest",
                tags::BBB_ICS_ICDVV,
                tags::BBB_ICS_ICDVV_ANS,
                SubIndication::NoSigningCertificateFound,
                move |_| Ok(candidates.iter().any(|c| c.digest_match)),
            )
            .constraint(constraints.digest_match.as_ref()),
        )
        .with(ChainItem::new(
            "signing_certificate_unambiguous",
            tags::BBB_ICS_ISCU,
            tags::BBB_ICS_ISCU_ANS,
            SubIndication::NoSigningCertificateFound,
            move |_| Ok(identified.is_some()),
        ))
        .with(
            ChainItem::new(
                "signing_certificate_issuer_serial",
                tags::BBB_ICS_AIDNASNE,
                tags::BBB_ICS_AIDNASNE_ANS,
                SubIndication::NoSigningCertificateFound,
                move |_| Ok(identified.map(|c| c.issuer_serial_match).unwrap_or(false)),
            )
            .constraint(constraints.issuer_serial_match.as_ref()),
        );

    let outcome = chain.execute(ctx)?;
    let certificate = identified.map(|c| &c.certificate);
    Ok((outcome.into(), certificate))
}
