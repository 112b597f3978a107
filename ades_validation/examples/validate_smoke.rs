// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation::render::render_text;
use ades_validation::DocumentValidator;
use ades_validation_chain::policy::Level;
use ades_validation_chain::{DefaultMessageCatalog, ValidationPolicyBuilder};
use ades_validation_test_utils::archive_timestamp_scenario;

fn main() {
    // Signer and signature TSA have both expired; the archive time-stamp keeps them provable.
    let data = archive_timestamp_scenario();

    let policy = ValidationPolicyBuilder::new()
        .name("smoke")
        .with_cryptographic(|c| c.level = Level::Warn)
        .build()
        .unwrap();

    let report = DocumentValidator::new(policy)
        .with_options(|o| o.parallel = true)
        .validate(&data)
        .unwrap();

    print!("{}", render_text(&report, &DefaultMessageCatalog));

    let simple = serde_json::to_string_pretty(&report.simple_report()).unwrap();
    println!("{simple}");
}
