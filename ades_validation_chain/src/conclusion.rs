// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::indication::{Indication, SubIndication};
use crate::message::MessageTag;
use serde::Serialize;

/// A message identifier with optional non-localized detail (token ids, times).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub tag: MessageTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Message {
    pub fn new(tag: MessageTag) -> Self {
        Self { tag, detail: None }
    }

    pub fn with_detail(tag: MessageTag, detail: Option<String>) -> Self {
        Self { tag, detail }
    }
}

/// Outcome of a chain or block.
///
/// `errors` explains a non-passed indication; `warnings` and `infos` come from non-fatal checks
/// and are kept even when the indication is `PASSED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conclusion {
    pub indication: Indication,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_indication: Option<SubIndication>,
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
    pub infos: Vec<Message>,
}

impl Conclusion {
    /// Passed with no messages.
    pub fn passed() -> Self {
        Self {
            indication: Indication::Passed,
            sub_indication: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            infos: Vec::new(),
        }
    }

    /// Not passed; the indication is the one governing `sub_indication`.
    pub fn failed(sub_indication: SubIndication, error: Message) -> Self {
        Self {
            indication: sub_indication.indication(),
            sub_indication: Some(sub_indication),
            errors: vec![error],
            warnings: Vec::new(),
            infos: Vec::new(),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.indication == Indication::Passed
    }

    pub fn is_failed(&self) -> bool {
        self.indication == Indication::Failed
    }

    pub fn is_indeterminate(&self) -> bool {
        self.indication == Indication::Indeterminate
    }

    /// True for an `INDETERMINATE` result whose reason may resolve at an earlier time.
    pub fn is_time_sensitive(&self) -> bool {
        self.is_indeterminate()
            && self
                .sub_indication
                .map(SubIndication::is_time_sensitive)
                .unwrap_or(false)
    }

    /// Append the non-fatal messages of `other`, skipping exact duplicates.
    pub fn merge_notes(&mut self, other: &Conclusion) {
        for w in &other.warnings {
            if !self.warnings.contains(w) {
                self.warnings.push(w.clone());
            }
        }
        for i in &other.infos {
            if !self.infos.contains(i) {
                self.infos.push(i.clone());
            }
        }
    }

    /// Copy of this conclusion with the notes of `other` merged in.
    pub fn with_notes_from(mut self, other: &Conclusion) -> Self {
        self.merge_notes(other);
        self
    }
}
