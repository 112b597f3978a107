// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Message identifiers and the catalog seam used to turn them into text.
//!
//! Evaluation only ever deals in [`MessageTag`]s. Text is produced after the report is final by
//! a [`MessageCatalog`] passed explicitly to the renderer.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Stable identifier of a check question or answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageTag(&'static str);

impl MessageTag {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for MessageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Maps message identifiers to display text.
pub trait MessageCatalog: Send + Sync {
    /// Text for `tag`, or `None` if the catalog has no entry.
    fn text(&self, tag: MessageTag) -> Option<Cow<'_, str>>;

    /// Text for `tag`, falling back to the identifier itself.
    fn render(&self, tag: MessageTag) -> String {
        self.text(tag)
            .map(|t| t.into_owned())
            .unwrap_or_else(|| tag.as_str().to_string())
    }
}

/// English texts for every tag in [`tags`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMessageCatalog;

impl MessageCatalog for DefaultMessageCatalog {
    fn text(&self, tag: MessageTag) -> Option<Cow<'_, str>> {
        DEFAULT_TEXTS.get(tag.as_str()).map(|t| Cow::Borrowed(*t))
    }
}

macro_rules! message_tags {
    ($($name:ident => $text:expr;)*) => {
        /// All message identifiers emitted by the validation blocks.
        pub mod tags {
            use super::MessageTag;
            $(pub const $name: MessageTag = MessageTag::new(stringify!($name));)*
        }

        static DEFAULT_TEXTS: Lazy<HashMap<&'static str, &'static str>> =
            Lazy::new(|| HashMap::from([$((stringify!($name), $text)),*]));
    };
}

message_tags! {
    // Format checking
    BBB_FC_ISSV => "Is the structural validation of the signature successful?";
    BBB_FC_ISSV_ANS => "The signature is not structurally valid!";
    BBB_FC_ISVADMDPD => "Is the signature valid according to the DocMDP restrictions?";
    BBB_FC_ISVADMDPD_ANS => "The document contains modifications not permitted by its DocMDP level!";
    BBB_FC_DSCNUOM => "Is the signed revision free of undefined object modifications?";
    BBB_FC_DSCNUOM_ANS => "The document contains undefined object modifications!";

    // Identification of the signing certificate
    BBB_ICS_ISCI => "Is there an identified candidate for the signing certificate?";
    BBB_ICS_ISCI_ANS => "There is no candidate for the signing certificate!";
    BBB_ICS_ISASCP => "Is the signed attribute: 'signing-certificate' present?";
    BBB_ICS_ISASCP_ANS => "The signed attribute: 'signing-certificate' is absent!";
    BBB_ICS_ICDVV => "Is the certificate's digest value valid?";
    BBB_ICS_ICDVV_ANS => "The signing certificate digest value does not match!";
    BBB_ICS_AIDNASNE => "Are the issuer distinguished name and the serial number equal?";
    BBB_ICS_AIDNASNE_ANS => "The issuer distinguished name and the serial number do not match!";
    BBB_ICS_ISCU => "Is the signing certificate unambiguously identified?";
    BBB_ICS_ISCU_ANS => "Several candidates match the signing certificate reference!";

    // X.509 certificate validation
    BBB_XCV_CCCBB => "Can the certificate chain be built till a trust anchor?";
    BBB_XCV_CCCBB_ANS => "The certificate chain is incomplete or does not end at a trust anchor!";
    BBB_XCV_SUB => "Is the certificate validation conclusive?";
    BBB_XCV_SUB_ANS => "The certificate validation is not conclusive!";
    BBB_XCV_ICSI => "Is the certificate signature intact?";
    BBB_XCV_ICSI_ANS => "The certificate signature is not intact!";
    BBB_XCV_ICA => "Is the certificate a CA certificate?";
    BBB_XCV_ICA_ANS => "The certificate is not a CA certificate!";
    BBB_XCV_ISCGKU => "Has the certificate the expected key-usage?";
    BBB_XCV_ISCGKU_ANS => "The certificate does not have the expected key-usage!";
    BBB_XCV_ISCGEKU => "Has the certificate the expected extended key-usage?";
    BBB_XCV_ISCGEKU_ANS => "The certificate does not have the expected extended key-usage!";
    BBB_XCV_IRDPFC => "Is the revocation data present for the certificate?";
    BBB_XCV_IRDPFC_ANS => "No revocation data is available for the certificate!";
    BBB_XCV_IRSK => "Is the revocation status of the certificate known?";
    BBB_XCV_IRSK_ANS => "The revocation status of the certificate is unknown!";
    BBB_XCV_IRIF => "Is the revocation information fresh for the certificate?";
    BBB_XCV_IRIF_ANS => "The revocation information is not fresh!";
    BBB_XCV_ISCR => "Is the certificate not revoked?";
    BBB_XCV_ISCR_ANS => "The certificate is revoked!";
    BBB_XCV_ISCOH => "Is the certificate not on hold?";
    BBB_XCV_ISCOH_ANS => "The certificate is on hold!";
    BBB_XCV_ICTIVRSC => "Is the validation time in the validity range of the certificate?";
    BBB_XCV_ICTIVRSC_ANS => "The validation time is not in the validity range of the certificate!";

    // Cryptographic constraints
    ASCCM => "Are the cryptographic constraints met?";
    ASCCM_ANS_1 => "The algorithm is not acceptable!";
    ASCCM_ANS_2 => "The public key size is below the accepted minimum!";
    ASCCM_ANS_3 => "The algorithm is no longer considered reliable at the validation time!";

    // Cryptographic verification
    BBB_CV_IRDOF => "Is the reference data object found?";
    BBB_CV_IRDOF_ANS => "The reference data object is not found!";
    BBB_CV_IRDOI => "Is the reference data object intact?";
    BBB_CV_IRDOI_ANS => "The reference data object is not intact!";
    BBB_CV_ISI => "Is the signature intact?";
    BBB_CV_ISI_ANS => "The signature is not intact!";
    BBB_CV_TSP_IMIDF => "Is the message imprint data found?";
    BBB_CV_TSP_IMIDF_ANS => "The message imprint data is not found!";
    BBB_CV_TSP_IMIVC => "Is the message imprint verification conclusive?";
    BBB_CV_TSP_IMIVC_ANS => "The message imprint does not match the time-stamped data!";

    // Signature acceptance validation
    BBB_SAV_ISTP => "Is the claimed signing time plausible?";
    BBB_SAV_ISTP_ANS => "The claimed signing time is after the validation time!";
    BBB_SAV_ISFA => "Is the signature format accepted?";
    BBB_SAV_ISFA_ANS => "The signature format is not accepted by the policy!";
    BBB_SAV_ISQPP => "Is the mandated signed attribute present?";
    BBB_SAV_ISQPP_ANS => "The mandated signed attribute is absent!";

    // Validation time sliding
    VTS_ITPOE => "Is there a proof of existence of the validated object at or before the control time?";
    VTS_ITPOE_ANS => "There is no proof of existence of the validated object at or before the control time!";
    VTS_ICPOE => "Is there a proof of existence of the certificate at or before the control time?";
    VTS_ICPOE_ANS => "There is no proof of existence of the certificate at or before the control time!";
    VTS_IRDA => "Is revocation data available for the certificate at the control time?";
    VTS_IRDA_ANS => "No revocation data is available for the certificate at the control time!";
    VTS_IRPOE => "Is there a proof of existence of the revocation data at or before the control time?";
    VTS_IRPOE_ANS => "There is no proof of existence of the revocation data at or before the control time!";
    VTS_ICNR => "Is the certificate not revoked at the control time?";
    VTS_ICNR_ANS => "The certificate is revoked at the control time!";
    VTS_ICVCT => "Is the control time in the validity range of the certificate?";
    VTS_ICVCT_ANS => "The control time is outside the validity range of the certificate!";

    // Past certificate / signature validation
    PCV_IXCVC => "Is the certificate chain validation at the control time conclusive?";
    PCV_IXCVC_ANS => "The certificate chain validation at the control time is not conclusive!";
    PSV_IPCVA => "Is the validation in the past successful at the candidate control time?";
    PSV_IPCVA_ANS => "The validation in the past failed at the candidate control time!";
    PSV_IPSVC => "Is the past signature validation conclusive?";
    PSV_IPSVC_ANS => "No proof of existence allows to defend the signature at an earlier time!";

    // Long-term checks
    ADEST_IBSTAIDOSC => "Is the best-signature-time not before the issuance date of the signing certificate?";
    ADEST_IBSTAIDOSC_ANS => "The best-signature-time is before the issuance date of the signing certificate!";
    ADEST_ITDWL => "Is the time-stamp delay within the limit?";
    ADEST_ITDWL_ANS => "The signature time-stamp was produced too late after the claimed signing time!";
    ADEST_ITCO => "Are the time-stamps in a coherent order?";
    ADEST_ITCO_ANS => "The time-stamps are not in a coherent order!";
}
