// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Document-level validation pipeline.
//!
//! The validator runs in two phases:
//! 1) time-stamps, latest first: each one that validates (now, or in the past using POE from
//!    later time-stamps) adds POE for the objects it covers
//! 2) signatures, independently of each other: building blocks at the validation time, past
//!    validation when the result is time-sensitive, then long-term checks

use crate::bbb::{basic_building_blocks, EvaluationContext, ValidationTarget};
use crate::diagnostic::{DiagnosticData, SignatureFacts, TimestampFacts};
use crate::long_term::{best_signature_time, long_term_checks};
use crate::options::ValidationOptions;
use crate::past::past_validation;
use crate::poe::PoeRegistry;
use crate::report::{aggregate, Block, DetailedReport, SignatureReport, TimestampReport};
use ades_validation_chain::{TokenId, ValidationError, ValidationPolicy};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info};

pub struct DocumentValidator {
    policy: ValidationPolicy,
    options: ValidationOptions,
}

impl DocumentValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            policy,
            options: ValidationOptions::default(),
        }
    }

    /// Adjust the options with a closure.
    pub fn with_options(mut self, configure: impl FnOnce(&mut ValidationOptions)) -> Self {
        configure(&mut self.options);
        self
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate every time-stamp and signature of `data`.
    ///
    /// Findings, however negative, end up in the report. `Err` means the policy or the facts
    /// are unusable: an invalid constraint, an undefined policy context, an unknown token
    /// reference or missing required facts.
    pub fn validate(&self, data: &DiagnosticData) -> Result<DetailedReport, ValidationError> {
        self.policy.validate()?;

        let validation_time = self.options.validation_time.unwrap_or(data.validation_time);
        let poe = PoeRegistry::new(validation_time);

        let mut ordered: Vec<&TimestampFacts> = data.timestamps.iter().collect();
        ordered.sort_by(|a, b| {
            b.production_time
                .cmp(&a.production_time)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut timestamps = Vec::with_capacity(ordered.len());
        for ts in ordered {
            let report = self.validate_timestamp(data, &poe, validation_time, ts)?;
            if report.is_valid() {
                poe.record_timestamp(ts);
            }
            timestamps.push(report);
        }

        let valid_timestamps: HashSet<TokenId> = timestamps
            .iter()
            .filter(|t| t.is_valid())
            .map(|t| t.id.clone())
            .collect();

        let signatures = if self.options.parallel && data.signatures.len() > 1 {
            let poe = &poe;
            let valid_timestamps = &valid_timestamps;
            std::thread::scope(|scope| {
                let handles: Vec<_> = data
                    .signatures
                    .iter()
                    .map(|signature| {
                        scope.spawn(move || {
                            self.validate_signature(
                                data,
                                poe,
                                validation_time,
                                valid_timestamps,
                                signature,
                            )
                        })
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                    .collect::<Result<Vec<_>, _>>()
            })?
        } else {
            data.signatures
                .iter()
                .map(|signature| {
                    self.validate_signature(
                        data,
                        &poe,
                        validation_time,
                        &valid_timestamps,
                        signature,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        info!(
            policy = %self.policy.name,
            signatures = signatures.len(),
            timestamps = timestamps.len(),
            "validation completed"
        );

        Ok(DetailedReport {
            validation_time,
            policy_name: self.policy.name.clone(),
            timestamps,
            signatures,
        })
    }

    fn validate_timestamp(
        &self,
        data: &DiagnosticData,
        poe: &PoeRegistry,
        validation_time: DateTime<Utc>,
        timestamp: &TimestampFacts,
    ) -> Result<TimestampReport, ValidationError> {
        if timestamp.covered_objects.is_empty() {
            return Err(ValidationError::MissingFacts(format!(
                "time-stamp {} covers no object",
                timestamp.id
            )));
        }

        let ctx = EvaluationContext::new(data, &self.policy, validation_time);
        let target = ValidationTarget::Timestamp(timestamp);

        let bbb = basic_building_blocks(&ctx, target)?;
        let past = if self.options.skip_past_validation {
            None
        } else {
            past_validation(&ctx, poe, target, &bbb)?
        };
        let conclusion = aggregate(&bbb, past.as_ref(), None);
        debug!(timestamp = %timestamp.id, indication = %conclusion.indication, "time-stamp validated");

        Ok(TimestampReport {
            id: timestamp.id.clone(),
            kind: timestamp.kind,
            production_time: timestamp.production_time,
            basic_building_blocks: bbb,
            past_validation: past,
            conclusion,
        })
    }

    fn validate_signature(
        &self,
        data: &DiagnosticData,
        poe: &PoeRegistry,
        validation_time: DateTime<Utc>,
        valid_timestamps: &HashSet<TokenId>,
        signature: &SignatureFacts,
    ) -> Result<SignatureReport, ValidationError> {
        let ctx = EvaluationContext::new(data, &self.policy, validation_time);
        let target = ValidationTarget::Signature(signature);
        let constraints = target
            .signature_constraints(&self.policy)?
            .ok_or_else(|| ValidationError::UndefinedConstraint("signature".into()))?;

        let bbb = basic_building_blocks(&ctx, target)?;
        let past = if self.options.skip_past_validation {
            None
        } else {
            past_validation(&ctx, poe, target, &bbb)?
        };

        let best_signature_time = best_signature_time(poe, signature);

        let long_term = if bbb.conclusion.is_failed() {
            None
        } else {
            let mut timestamps = Vec::new();
            for id in &signature.timestamps {
                let ts = data.timestamp(id)?;
                if valid_timestamps.contains(id) {
                    timestamps.push(ts);
                }
            }
            let signing_certificate = bbb
                .signing_certificate
                .as_ref()
                .map(|id| data.certificate(id))
                .transpose()?;
            Some(long_term_checks(
                &ctx.with_poe(poe),
                signature,
                &constraints.long_term,
                signing_certificate,
                best_signature_time,
                timestamps,
            )?)
        };

        let conclusion = aggregate(
            &bbb,
            past.as_ref(),
            long_term.as_ref().map(|r| &r.conclusion),
        );
        debug!(
            signature = %signature.id,
            indication = %conclusion.indication,
            sub_indication = ?conclusion.sub_indication,
            "signature validated"
        );

        Ok(SignatureReport {
            id: signature.id.clone(),
            format: signature.format.clone(),
            counter_signature_of: signature.counter_signature_of.clone(),
            basic_building_blocks: bbb,
            past_validation: past,
            long_term: long_term.map(Block::LongTermValidation),
            best_signature_time: Some(best_signature_time),
            conclusion,
        })
    }
}
