// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! AdES signature validation.
//!
//! Input is a [`DiagnosticData`] snapshot of facts already extracted from signed documents. The
//! [`DocumentValidator`] runs the basic building blocks for every time-stamp and signature,
//! falls back to validation in the past when a result is time-sensitive, and produces a
//! [`DetailedReport`] that can be summarised with [`DetailedReport::simple_report`] or rendered
//! with [`render::render_text`].
//!
//! Constraint levels come from an [`ades_validation_chain::ValidationPolicy`].

pub mod bbb;
pub mod diagnostic;
pub mod long_term;
pub mod options;
pub mod past;
pub mod path;
pub mod poe;
pub mod render;
pub mod report;
pub mod revocation;
pub mod validator;

pub use diagnostic::DiagnosticData;
pub use options::ValidationOptions;
pub use poe::PoeRegistry;
pub use report::{DetailedReport, SignatureReport, SimpleReport, TimestampReport};
pub use validator::DocumentValidator;
