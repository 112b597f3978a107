// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::EvaluationContext;
use ades_validation_chain::algorithm::SignatureAlgorithm;
use ades_validation_chain::policy::{AlgorithmAcceptance, CryptographicConstraint};
use ades_validation_chain::{tags, ChainItem, SubIndication, TokenId};

/// Algorithm acceptability of `algorithm` at the context time.
///
/// The failure is `CRYPTO_CONSTRAINTS_FAILURE_NO_POE` when the algorithm was acceptable until
/// some earlier date, `CRYPTO_CONSTRAINTS_FAILURE` otherwise. A missing algorithm is not
/// acceptable.
pub(crate) fn algorithm_item<'d>(
    name: &'static str,
    ctx: &EvaluationContext<'d>,
    crypto: &'d CryptographicConstraint,
    algorithm: Option<&'d SignatureAlgorithm>,
    subject: &TokenId,
) -> ChainItem<'d, EvaluationContext<'d>> {
    let acceptance = algorithm
        .map(|a| crypto.evaluate(a, ctx.at))
        .unwrap_or(AlgorithmAcceptance::NotAcceptable);

    let (answer, failure) = match acceptance {
        AlgorithmAcceptance::Expired { .. } => {
            (tags::ASCCM_ANS_3, SubIndication::CryptoConstraintsFailureNoPoe)
        }
        AlgorithmAcceptance::KeyTooSmall { .. } => {
            (tags::ASCCM_ANS_2, SubIndication::CryptoConstraintsFailure)
        }
        _ => (tags::ASCCM_ANS_1, SubIndication::CryptoConstraintsFailure),
    };

    let detail = match (algorithm, acceptance) {
        (Some(a), AlgorithmAcceptance::Expired { since }) => {
            format!("{subject}: {a} not acceptable after {since}")
        }
        (Some(a), _) => format!("{subject}: {a}"),
        (None, _) => format!("{subject}: unknown algorithm"),
    };

    ChainItem::new(name, tags::ASCCM, answer, failure, move |ctx: &EvaluationContext<'d>| {
        Ok(algorithm
            .map(|a| crypto.evaluate(a, ctx.at).is_acceptable())
            .unwrap_or(false))
    })
    .with_level(crypto.level)
    .detail(detail)
}
