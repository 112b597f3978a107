// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Prospective certificate chain from a signing certificate to its trust anchor.
//!
//! Chains are not built here: every certificate already names its issuer in the diagnostic
//! data, this module only follows those references.

use crate::diagnostic::{CertificateFacts, DiagnosticData};
use ades_validation_chain::{TokenId, ValidationError};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainTermination {
    TrustAnchor,
    /// The last certificate has no known issuer.
    Incomplete,
    /// Ends at a self-signed certificate that is not a trust anchor.
    Untrusted,
    Cycle,
}

#[derive(Debug, Clone)]
pub struct CertificatePath<'d> {
    /// Signing certificate first; the trust anchor, if reached, last.
    pub certificates: Vec<&'d CertificateFacts>,
    pub termination: ChainTermination,
}

impl<'d> CertificatePath<'d> {
    pub fn build(data: &'d DiagnosticData, leaf: &TokenId) -> Result<Self, ValidationError> {
        let mut current = data.certificate(leaf)?;
        let mut certificates = vec![current];
        let mut seen: HashSet<&TokenId> = HashSet::from([&current.id]);

        let termination = loop {
            if current.trust_anchor {
                break ChainTermination::TrustAnchor;
            }

            let issuer_id = match &current.issuer {
                Some(id) if id != &current.id => id,
                Some(_) => break ChainTermination::Untrusted,
                None if current.self_signed => break ChainTermination::Untrusted,
                None => break ChainTermination::Incomplete,
            };

            if !seen.insert(issuer_id) {
                break ChainTermination::Cycle;
            }

            current = data.certificate(issuer_id)?;
            certificates.push(current);
        };

        Ok(Self {
            certificates,
            termination,
        })
    }

    pub fn is_trusted(&self) -> bool {
        self.termination == ChainTermination::TrustAnchor
    }

    pub fn signing_certificate(&self) -> &'d CertificateFacts {
        self.certificates[0]
    }

    /// Certificates that need validation: all but a reached trust anchor.
    pub fn non_anchor(&self) -> impl Iterator<Item = &'d CertificateFacts> + '_ {
        self.certificates
            .iter()
            .copied()
            .filter(|c| !c.trust_anchor)
    }
}
