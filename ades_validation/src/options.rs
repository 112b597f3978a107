// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use chrono::{DateTime, Utc};

/// Options controlling a validation run.
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Overrides the validation time declared in the diagnostic data.
    pub validation_time: Option<DateTime<Utc>>,

    /// Validate independent signatures on scoped threads.
    pub parallel: bool,

    /// When true, time-sensitive `INDETERMINATE` results are reported as-is, without searching
    /// for an earlier control time.
    pub skip_past_validation: bool,
}
