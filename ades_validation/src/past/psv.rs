// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::bbb::{algorithm_item, EvaluationContext, ValidationTarget};
use crate::report::BlockResult;
use ades_validation_chain::policy::BasicSignatureConstraints;
use ades_validation_chain::{Chain, ValidationError};

/// The target's own signature algorithm must be acceptable at the control time.
pub(super) fn past_signature_validation<'d>(
    ctx: &EvaluationContext<'d>,
    target: ValidationTarget<'d>,
    constraints: &'d BasicSignatureConstraints,
) -> Result<BlockResult, ValidationError> {
    let token = target.token();
    let crypto = ctx.policy.cryptographic_for(constraints.cryptographic.as_ref());

    let chain: Chain<'d, EvaluationContext<'d>> = Chain::new("PSV").with(algorithm_item(
        "cryptographic_constraints_at_control_time",
        ctx,
        crypto,
        token.signature_algorithm(),
        token.id(),
    ));

    Ok(chain.execute(ctx)?.into())
}
