// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Proof-of-existence registry.
//!
//! Entries are only ever added. The validation time is an implicit POE for every object.

use crate::diagnostic::TimestampFacts;
use ades_validation_chain::TokenId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoeSource {
    ValidationTime,
    Timestamp(TokenId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PoeRecord {
    pub time: DateTime<Utc>,
    pub source: PoeSource,
}

#[derive(Debug)]
pub struct PoeRegistry {
    validation_time: DateTime<Utc>,
    entries: RwLock<HashMap<TokenId, Vec<PoeRecord>>>,
}

impl PoeRegistry {
    pub fn new(validation_time: DateTime<Utc>) -> Self {
        Self {
            validation_time,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn validation_time(&self) -> DateTime<Utc> {
        self.validation_time
    }

    /// Add a POE entry. Recording the same entry twice has no effect.
    pub fn record(&self, object: &TokenId, time: DateTime<Utc>, source: PoeSource) {
        let record = PoeRecord { time, source };
        let mut entries = self.entries.write();
        let list = entries.entry(object.clone()).or_default();
        if !list.contains(&record) {
            list.push(record);
        }
    }

    /// Record POE at the time-stamp's production time for every object it covers.
    ///
    /// Only call this for a time-stamp that passed validation.
    pub fn record_timestamp(&self, timestamp: &TimestampFacts) {
        for covered in &timestamp.covered_objects {
            self.record(
                &covered.id,
                timestamp.production_time,
                PoeSource::Timestamp(timestamp.id.clone()),
            );
        }
        debug!(
            timestamp = %timestamp.id,
            time = %timestamp.production_time,
            objects = timestamp.covered_objects.len(),
            "POE recorded"
        );
    }

    /// Minimum recorded time for `object` that is not after `not_after`.
    pub fn earliest(&self, object: &TokenId, not_after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.times(object).into_iter().filter(|t| *t <= not_after).min()
    }

    /// Maximum recorded time for `object` that is not after `bound`.
    pub fn latest_at_or_before(
        &self,
        object: &TokenId,
        bound: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        self.times(object).into_iter().filter(|t| *t <= bound).max()
    }

    pub fn has_poe(&self, object: &TokenId, at: DateTime<Utc>) -> bool {
        self.earliest(object, at).is_some()
    }

    /// Distinct POE times of `object` not after `bound`, latest first.
    pub fn poe_times(&self, object: &TokenId, bound: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut times: Vec<_> = self
            .times(object)
            .into_iter()
            .filter(|t| *t <= bound)
            .collect();
        times.sort_unstable_by(|a, b| b.cmp(a));
        times.dedup();
        times
    }

    /// Explicit entries for `object`, in insertion order.
    pub fn records(&self, object: &TokenId) -> Vec<PoeRecord> {
        self.entries.read().get(object).cloned().unwrap_or_default()
    }

    fn times(&self, object: &TokenId) -> Vec<DateTime<Utc>> {
        let entries = self.entries.read();
        let mut times: Vec<_> = entries
            .get(object)
            .map(|list| list.iter().map(|r| r.time).collect())
            .unwrap_or_default();
        times.push(self.validation_time);
        times
    }
}
