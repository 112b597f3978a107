// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::EvaluationContext;
use crate::diagnostic::{CertificationPermission, PdfRevisionFacts, SignatureFacts};
use crate::report::BlockResult;
use ades_validation_chain::policy::FormatConstraints;
use ades_validation_chain::{tags, Chain, ChainItem, SubIndication, ValidationError};

/// Whether the detected changes are allowed by the DocMDP permission.
///
/// No-change rejects form fill-in, annotation and undefined changes; minimal rejects annotation
/// and undefined changes; changes-permitted rejects undefined changes only.
pub(crate) fn doc_mdp_allows(permission: CertificationPermission, pdf: &PdfRevisionFacts) -> bool {
    match permission {
        CertificationPermission::NoChange => {
            pdf.form_fill_changes.is_empty()
                && pdf.annotation_changes.is_empty()
                && pdf.undefined_changes.is_empty()
        }
        CertificationPermission::Minimal => {
            pdf.annotation_changes.is_empty() && pdf.undefined_changes.is_empty()
        }
        CertificationPermission::ChangesPermitted => pdf.undefined_changes.is_empty(),
    }
}

pub(super) fn format_checking<'d>(
    ctx: &EvaluationContext<'d>,
    signature: &'d SignatureFacts,
    constraints: &'d FormatConstraints,
) -> Result<BlockResult, ValidationError> {
    let pdf = signature.pdf.as_ref();
    let permission = pdf
        .and_then(|p| p.doc_mdp_permission)
        .map(CertificationPermission::from_code)
        .transpose()?;

    let mut chain: Chain<'d, EvaluationContext<'d>> = Chain::new("FC");

    let mut structural = ChainItem::new(
        "structural_validation",
        tags::BBB_FC_ISSV,
        tags::BBB_FC_ISSV_ANS,
        SubIndication::FormatFailure,
        move |_| Ok(signature.structurally_valid),
    )
    .constraint(constraints.structural_validation.as_ref());
    if !signature.structural_messages.is_empty() {
        structural = structural.detail(signature.structural_messages.join("; "));
    }
    chain.push(structural);

    if let (Some(pdf), Some(permission)) = (pdf, permission) {
        chain.push(
            ChainItem::new(
                "doc_mdp",
                tags::BBB_FC_ISVADMDPD,
                tags::BBB_FC_ISVADMDPD_ANS,
                SubIndication::FormatFailure,
                move |_| Ok(doc_mdp_allows(permission, pdf)),
            )
            .constraint(constraints.doc_mdp.as_ref())
            .detail(format!("{permission:?}")),
        );
    }

    if let Some(pdf) = pdf {
        chain.push(
            ChainItem::new(
                "undefined_changes",
                tags::BBB_FC_DSCNUOM,
                tags::BBB_FC_DSCNUOM_ANS,
                SubIndication::FormatFailure,
                move |_| Ok(pdf.undefined_changes.is_empty()),
            )
            .constraint(constraints.undefined_changes.as_ref())
            .detail(pdf.undefined_changes.join(", ")),
        );
    }

    Ok(chain.execute(ctx)?.into())
}
