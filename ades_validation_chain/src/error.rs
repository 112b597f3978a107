// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ids::TokenId;
use thiserror::Error;

/// Configuration or programming errors.
///
/// These are never validation findings: they abort the report for the affected object and are
/// surfaced to the caller instead of being folded into an `INDETERMINATE` conclusion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown token reference: {0}")]
    UnknownToken(TokenId),

    #[error("missing required facts: {0}")]
    MissingFacts(String),

    #[error("policy does not define constraint: {0}")]
    UndefinedConstraint(String),

    #[error("invalid constraint {name}: {reason}")]
    InvalidConstraint { name: String, reason: String },

    #[error("unsupported {name} value: {value}")]
    UnsupportedValue { name: String, value: String },
}

impl ValidationError {
    pub(crate) fn invalid_constraint(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
