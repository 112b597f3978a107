// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::message::MessageTag;
use serde::Serialize;

/// Result of a single evaluated check as it appears in the report trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintStatus {
    Ok,
    NotOk,
    Warning,
    Information,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintRecord {
    pub name: &'static str,
    pub question: MessageTag,
    pub status: ConstraintStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<MessageTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ConstraintRecord {
    pub fn is_ok(&self) -> bool {
        self.status == ConstraintStatus::Ok
    }
}

/// Ordered trace of evaluated checks.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConstraintTrace {
    records: Vec<ConstraintRecord>,
}

impl ConstraintTrace {
    pub fn records(&self) -> &[ConstraintRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record for `name`, if that check was evaluated.
    pub fn find(&self, name: &str) -> Option<&ConstraintRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.records.iter().map(|r| r.name)
    }
}

#[derive(Debug, Default)]
pub struct ConstraintTraceBuilder {
    trace: ConstraintTrace,
}

impl ConstraintTraceBuilder {
    pub fn push(&mut self, record: ConstraintRecord) {
        self.trace.records.push(record);
    }

    pub fn build(self) -> ConstraintTrace {
        self.trace
    }
}
