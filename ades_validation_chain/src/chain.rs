// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Ordered, levelled checks.
//!
//! A [`Chain`] evaluates its items in declaration order against a context. The first false item
//! at [`Level::Fail`] stops the chain and its failure becomes the chain conclusion; false items at
//! `Warn` / `Inform` are recorded and evaluation continues; `Ignore` items are never evaluated and
//! do not appear in the trace.

use crate::audit::{ConstraintRecord, ConstraintStatus, ConstraintTrace, ConstraintTraceBuilder};
use crate::conclusion::{Conclusion, Message};
use crate::error::ValidationError;
use crate::indication::SubIndication;
use crate::message::MessageTag;
use crate::policy::{Level, LevelConstraint};
use tracing::{debug, trace};

/// A yes/no question about a context.
///
/// `Err` is reserved for configuration or programming errors and aborts the chain.
pub trait Check<C: ?Sized> {
    fn evaluate(&self, ctx: &C) -> Result<bool, ValidationError>;
}

/// Adapts a closure to [`Check`].
pub struct FnCheck<F> {
    f: F,
}

impl<F> FnCheck<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<C: ?Sized, F> Check<C> for FnCheck<F>
where
    F: Fn(&C) -> Result<bool, ValidationError>,
{
    fn evaluate(&self, ctx: &C) -> Result<bool, ValidationError> {
        (self.f)(ctx)
    }
}

/// A check plus the metadata describing how its result is reported.
pub struct ChainItem<'a, C: ?Sized> {
    name: &'static str,
    level: Level,
    question: MessageTag,
    answer: MessageTag,
    failure: SubIndication,
    detail: Option<String>,
    check: Box<dyn Check<C> + 'a>,
}

impl<'a, C: ?Sized> ChainItem<'a, C> {
    /// Item backed by a closure, at [`Level::Fail`].
    pub fn new<F>(
        name: &'static str,
        question: MessageTag,
        answer: MessageTag,
        failure: SubIndication,
        f: F,
    ) -> Self
    where
        F: Fn(&C) -> Result<bool, ValidationError> + 'a,
    {
        Self::with_check(name, question, answer, failure, FnCheck::new(f))
    }

    pub fn with_check(
        name: &'static str,
        question: MessageTag,
        answer: MessageTag,
        failure: SubIndication,
        check: impl Check<C> + 'a,
    ) -> Self {
        Self {
            name,
            level: Level::Fail,
            question,
            answer,
            failure,
            detail: None,
            check: Box::new(check),
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Take the level from a policy constraint; an absent constraint means [`Level::Ignore`].
    pub fn constraint(self, constraint: Option<&LevelConstraint>) -> Self {
        let level = constraint.map(|c| c.level).unwrap_or(Level::Ignore);
        self.with_level(level)
    }

    /// Non-localized context reported with a false result.
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn failure(&self) -> SubIndication {
        self.failure
    }
}

/// Trace plus conclusion of one chain execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutcome {
    pub trace: ConstraintTrace,
    pub conclusion: Conclusion,
}

impl ChainOutcome {
    /// Whether the item named `name` was evaluated.
    pub fn evaluated(&self, name: &str) -> bool {
        self.trace.find(name).is_some()
    }
}

pub struct Chain<'a, C: ?Sized> {
    block: &'static str,
    items: Vec<ChainItem<'a, C>>,
}

impl<'a, C: ?Sized> Chain<'a, C> {
    pub fn new(block: &'static str) -> Self {
        Self {
            block,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: ChainItem<'a, C>) {
        self.items.push(item);
    }

    pub fn with(mut self, item: ChainItem<'a, C>) -> Self {
        self.items.push(item);
        self
    }

    pub fn block(&self) -> &'static str {
        self.block
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn execute(&self, ctx: &C) -> Result<ChainOutcome, ValidationError> {
        let mut trace_builder = ConstraintTraceBuilder::default();
        let mut warnings = Vec::new();
        let mut infos = Vec::new();

        for item in &self.items {
            if item.level == Level::Ignore {
                trace!(block = self.block, check = item.name, "chain item ignored");
                continue;
            }

            let ok = item.check.evaluate(ctx)?;
            trace!(block = self.block, check = item.name, ok, "chain item evaluated");

            if ok {
                trace_builder.push(ConstraintRecord {
                    name: item.name,
                    question: item.question,
                    status: ConstraintStatus::Ok,
                    answer: None,
                    detail: None,
                });
                continue;
            }

            let message = Message::with_detail(item.answer, item.detail.clone());
            let status = match item.level {
                Level::Fail => ConstraintStatus::NotOk,
                Level::Warn => ConstraintStatus::Warning,
                _ => ConstraintStatus::Information,
            };
            trace_builder.push(ConstraintRecord {
                name: item.name,
                question: item.question,
                status,
                answer: Some(item.answer),
                detail: item.detail.clone(),
            });

            match item.level {
                Level::Fail => {
                    debug!(
                        block = self.block,
                        check = item.name,
                        sub_indication = %item.failure,
                        "chain stopped"
                    );
                    let mut conclusion = Conclusion::failed(item.failure, message);
                    conclusion.warnings = warnings;
                    conclusion.infos = infos;
                    return Ok(ChainOutcome {
                        trace: trace_builder.build(),
                        conclusion,
                    });
                }
                Level::Warn => warnings.push(message),
                _ => infos.push(message),
            }
        }

        let mut conclusion = Conclusion::passed();
        conclusion.warnings = warnings;
        conclusion.infos = infos;
        Ok(ChainOutcome {
            trace: trace_builder.build(),
            conclusion,
        })
    }
}
