// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Human-readable rendering of a [`DetailedReport`].
//!
//! Reports only carry message identifiers; the catalog is supplied here.

use crate::report::{BasicBuildingBlocks, Block, DetailedReport, PastValidation};
use ades_validation_chain::{Conclusion, ConstraintStatus, MessageCatalog};
use std::fmt;

/// Displays a report, resolving messages through `catalog`.
pub struct TextReport<'a> {
    report: &'a DetailedReport,
    catalog: &'a dyn MessageCatalog,
}

impl<'a> TextReport<'a> {
    pub fn new(report: &'a DetailedReport, catalog: &'a dyn MessageCatalog) -> Self {
        Self { report, catalog }
    }

    fn conclusion(&self, f: &mut fmt::Formatter<'_>, indent: &str, c: &Conclusion) -> fmt::Result {
        match c.sub_indication {
            Some(sub) => writeln!(f, "{indent}=> {} / {sub}", c.indication)?,
            None => writeln!(f, "{indent}=> {}", c.indication)?,
        }
        for (label, messages) in [("error", &c.errors), ("warning", &c.warnings), ("info", &c.infos)]
        {
            for m in messages {
                write!(f, "{indent}   {label}: {}", self.catalog.render(m.tag))?;
                if let Some(detail) = &m.detail {
                    write!(f, " ({detail})")?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }

    fn block(&self, f: &mut fmt::Formatter<'_>, indent: &str, block: &Block) -> fmt::Result {
        match block.control_time() {
            Some(t) => writeln!(f, "{indent}{:?} @ {t}", block.kind())?,
            None => writeln!(f, "{indent}{:?}", block.kind())?,
        }
        for record in block.result().constraints.records() {
            let status = match record.status {
                ConstraintStatus::Ok => "OK",
                ConstraintStatus::NotOk => "NOT OK",
                ConstraintStatus::Warning => "WARNING",
                ConstraintStatus::Information => "INFO",
            };
            writeln!(
                f,
                "{indent}  [{status}] {}",
                self.catalog.render(record.question)
            )?;
        }
        for sub in block.certificates() {
            writeln!(f, "{indent}  certificate {}", sub.certificate)?;
            for record in sub.result.constraints.records() {
                if !record.is_ok() {
                    let answer = record
                        .answer
                        .map(|a| self.catalog.render(a))
                        .unwrap_or_default();
                    writeln!(f, "{indent}    {}: {answer}", record.name)?;
                }
            }
        }
        self.conclusion(f, &format!("{indent}  "), block.conclusion())
    }

    fn building_blocks(&self, f: &mut fmt::Formatter<'_>, bbb: &BasicBuildingBlocks) -> fmt::Result {
        for block in &bbb.blocks {
            self.block(f, "  ", block)?;
        }
        Ok(())
    }

    fn past(&self, f: &mut fmt::Formatter<'_>, past: &PastValidation) -> fmt::Result {
        writeln!(f, "  past validation (trigger {})", past.trigger)?;
        for attempt in &past.attempts {
            for block in &attempt.blocks {
                self.block(f, "    ", block)?;
            }
        }
        self.conclusion(f, "  ", &past.conclusion)
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(
            f,
            "Validation at {} with policy '{}'",
            report.validation_time, report.policy_name
        )?;

        for ts in &report.timestamps {
            writeln!(f, "Timestamp {} ({:?}, {})", ts.id, ts.kind, ts.production_time)?;
            self.building_blocks(f, &ts.basic_building_blocks)?;
            if let Some(past) = &ts.past_validation {
                self.past(f, past)?;
            }
            self.conclusion(f, "", &ts.conclusion)?;
        }

        for sig in &report.signatures {
            writeln!(f, "Signature {} ({})", sig.id, sig.format)?;
            self.building_blocks(f, &sig.basic_building_blocks)?;
            if let Some(past) = &sig.past_validation {
                self.past(f, past)?;
            }
            if let Some(lt) = &sig.long_term {
                self.block(f, "  ", lt)?;
            }
            if let Some(bst) = sig.best_signature_time {
                writeln!(f, "  best-signature-time: {bst}")?;
            }
            self.conclusion(f, "", &sig.conclusion)?;
        }
        Ok(())
    }
}

pub fn render_text(report: &DetailedReport, catalog: &dyn MessageCatalog) -> String {
    TextReport::new(report, catalog).to_string()
}
