// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Selection and interpretation of revocation records for one certificate at one time.

use crate::diagnostic::{
    CertificateFacts, DiagnosticData, RevocationFacts, RevocationReason, RevocationStatus,
};
use crate::poe::PoeRegistry;
use ades_validation_chain::policy::CryptographicConstraint;
use chrono::{DateTime, Duration, Utc};

/// Revocation status of a certificate as of a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAt {
    Good,
    Revoked {
        time: DateTime<Utc>,
        reason: RevocationReason,
    },
    /// Revoked, but the record does not say since when.
    RevokedUndated,
    OnHold,
    Unknown,
}

impl StatusAt {
    pub fn is_revoked(self) -> bool {
        matches!(self, StatusAt::Revoked { .. } | StatusAt::RevokedUndated)
    }
}

pub fn status_at(record: &RevocationFacts, at: DateTime<Utc>) -> StatusAt {
    match record.status {
        RevocationStatus::Good => StatusAt::Good,
        RevocationStatus::Unknown => StatusAt::Unknown,
        RevocationStatus::Revoked { time: None, reason } => {
            if reason == RevocationReason::CertificateHold {
                StatusAt::OnHold
            } else {
                StatusAt::RevokedUndated
            }
        }
        RevocationStatus::Revoked {
            time: Some(time),
            reason,
        } => {
            if time > at {
                StatusAt::Good
            } else if reason == RevocationReason::CertificateHold {
                StatusAt::OnHold
            } else {
                StatusAt::Revoked { time, reason }
            }
        }
    }
}

/// Whether `record` can vouch for `certificate` at `at`.
///
/// A record produced after the certificate expired only counts when its archive cut-off is at or
/// before the expiry.
pub fn is_usable(
    record: &RevocationFacts,
    certificate: &CertificateFacts,
    at: DateTime<Utc>,
    crypto: Option<&CryptographicConstraint>,
) -> bool {
    if !record.signature_intact {
        return false;
    }

    let within_validity = record.production_time <= certificate.not_after
        || record
            .archive_cutoff
            .map(|c| c <= certificate.not_after)
            .unwrap_or(false);
    if !within_validity {
        return false;
    }

    match (crypto, record.signature_algorithm.as_ref()) {
        (Some(c), Some(alg)) => c.evaluate(alg, at).is_acceptable(),
        _ => true,
    }
}

/// The record that applies to `certificate` at `at`.
///
/// Prefers the latest usable record produced at or before `at` (and, with a registry, having POE
/// at or before `at`); otherwise the earliest usable record produced afterwards.
pub fn select<'d>(
    data: &'d DiagnosticData,
    certificate: &'d CertificateFacts,
    at: DateTime<Utc>,
    poe: Option<&PoeRegistry>,
    crypto: Option<&CryptographicConstraint>,
) -> Option<&'d RevocationFacts> {
    let usable: Vec<&RevocationFacts> = data
        .revocations_for(&certificate.id)
        .filter(|r| is_usable(r, certificate, at, crypto))
        .collect();

    let prior = usable
        .iter()
        .copied()
        .filter(|r| r.production_time <= at)
        .filter(|r| poe.map(|p| p.has_poe(&r.id, at)).unwrap_or(true))
        .max_by(|a, b| {
            a.production_time
                .cmp(&b.production_time)
                .then_with(|| b.id.cmp(&a.id))
        });

    prior.or_else(|| {
        usable
            .iter()
            .copied()
            .filter(|r| r.production_time > at)
            .min_by(|a, b| {
                a.production_time
                    .cmp(&b.production_time)
                    .then_with(|| a.id.cmp(&b.id))
            })
    })
}

/// Status of `certificate` at `at`.
///
/// Starts from the `selected` record, but any usable record reporting a dated revocation at or
/// before `at` wins, whatever its production time: a later response can reveal an earlier
/// revocation. Holds are not treated as revocations here.
pub fn status_at_time(
    data: &DiagnosticData,
    certificate: &CertificateFacts,
    at: DateTime<Utc>,
    selected: Option<&RevocationFacts>,
    crypto: Option<&CryptographicConstraint>,
) -> Option<StatusAt> {
    let status = selected.map(|r| status_at(r, at));
    if status.map(StatusAt::is_revoked).unwrap_or(false) {
        return status;
    }

    let revealed = data
        .revocations_for(&certificate.id)
        .filter(|r| is_usable(r, certificate, at, crypto))
        .filter_map(|r| match r.status {
            RevocationStatus::Revoked {
                time: Some(time),
                reason,
            } if time <= at && reason != RevocationReason::CertificateHold => Some((time, reason)),
            _ => None,
        })
        .min_by_key(|(time, _)| *time);

    match revealed {
        Some((time, reason)) => Some(StatusAt::Revoked { time, reason }),
        None => status,
    }
}

/// Whether `record` is recent enough to be relied upon at `at`.
///
/// With no explicit maximum age, the record's own `nextUpdate - thisUpdate` window is used; a
/// record without `nextUpdate` is always fresh.
pub fn is_fresh(record: &RevocationFacts, at: DateTime<Utc>, max_age: Option<Duration>) -> bool {
    if record.production_time >= at {
        return true;
    }

    let max_age = match max_age {
        Some(d) if d > Duration::zero() => d,
        _ => match record.next_update {
            Some(next) => next - record.this_update,
            None => return true,
        },
    };

    at - record.production_time <= max_age
}
