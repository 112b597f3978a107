// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation_chain::policy::Level;
use ades_validation_chain::{tags, Chain, ChainItem, DefaultMessageCatalog, MessageCatalog, SubIndication};

struct Token {
    signature_intact: bool,
    digest_found: bool,
}

fn main() {
    let token = Token {
        signature_intact: true,
        digest_found: false,
    };

    let chain = Chain::new("CV")
        .with(
            ChainItem::new(
                "reference_data_found",
                tags::BBB_CV_IRDOF,
                tags::BBB_CV_IRDOF_ANS,
                SubIndication::SignedDataNotFound,
                |t: &Token| Ok(t.digest_found),
            )
            // Downgrade to a warning so the chain keeps going.
            .with_level(Level::Warn),
        )
        .with(ChainItem::new(
            "signature_intact",
            tags::BBB_CV_ISI,
            tags::BBB_CV_ISI_ANS,
            SubIndication::SigCryptoFailure,
            |t: &Token| Ok(t.signature_intact),
        ));

    let outcome = chain.execute(&token).unwrap();

    for record in outcome.trace.records() {
        println!("{:<24} {:?}", record.name, record.status);
    }
    println!("{}", outcome.conclusion.indication);
    for warning in &outcome.conclusion.warnings {
        println!("warning: {}", DefaultMessageCatalog.render(warning.tag));
    }
}
