// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation_chain::policy::Level;
use ades_validation_chain::{
    tags, Chain, ChainItem, Check, ConstraintStatus, Indication, LevelConstraint, SubIndication,
    ValidationError,
};
use std::sync::atomic::{AtomicUsize, Ordering};

struct Ctx {
    value: u32,
}

fn item<'a>(
    name: &'static str,
    level: Level,
    failure: SubIndication,
    result: bool,
    calls: &'a AtomicUsize,
) -> ChainItem<'a, Ctx> {
    ChainItem::new(name, tags::BBB_CV_ISI, tags::BBB_CV_ISI_ANS, failure, move |_c: &Ctx| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(result)
    })
    .with_level(level)
}

#[test]
fn first_failing_fail_item_short_circuits() {
    let calls = AtomicUsize::new(0);
    let chain = Chain::new("test")
        .with(item("c1", Level::Fail, SubIndication::HashFailure, true, &calls))
        .with(item("c2", Level::Fail, SubIndication::SigCryptoFailure, false, &calls))
        .with(item("c3", Level::Fail, SubIndication::FormatFailure, false, &calls))
        .with(item("c4", Level::Warn, SubIndication::FormatFailure, false, &calls));

    let outcome = chain.execute(&Ctx { value: 1 }).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(outcome.trace.names().collect::<Vec<_>>(), vec!["c1", "c2"]);
    assert!(!outcome.evaluated("c3"));
    assert!(!outcome.evaluated("c4"));

    assert_eq!(outcome.conclusion.indication, Indication::Failed);
    assert_eq!(outcome.conclusion.sub_indication, Some(SubIndication::SigCryptoFailure));
    assert_eq!(outcome.conclusion.errors.len(), 1);
    assert_eq!(outcome.conclusion.errors[0].tag, tags::BBB_CV_ISI_ANS);
}

#[test]
fn ignored_items_are_neither_evaluated_nor_traced() {
    let calls = AtomicUsize::new(0);
    let chain = Chain::new("test")
        .with(item("ignored", Level::Ignore, SubIndication::HashFailure, false, &calls))
        .with(
            item("absent", Level::Fail, SubIndication::HashFailure, false, &calls)
                .constraint(None),
        )
        .with(item("kept", Level::Fail, SubIndication::HashFailure, true, &calls));

    let outcome = chain.execute(&Ctx { value: 0 }).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.trace.len(), 1);
    assert!(outcome.trace.find("ignored").is_none());
    assert!(outcome.trace.find("absent").is_none());
    assert!(outcome.conclusion.is_passed());
}

#[test]
fn warnings_and_infos_do_not_change_the_indication() {
    let calls = AtomicUsize::new(0);
    let chain = Chain::new("test")
        .with(item("warned", Level::Warn, SubIndication::CryptoConstraintsFailure, false, &calls))
        .with(item("informed", Level::Inform, SubIndication::SigConstraintsFailure, false, &calls))
        .with(item("last", Level::Fail, SubIndication::HashFailure, true, &calls));

    let outcome = chain.execute(&Ctx { value: 0 }).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(outcome.conclusion.is_passed());
    assert_eq!(outcome.conclusion.sub_indication, None);
    assert_eq!(outcome.conclusion.warnings.len(), 1);
    assert_eq!(outcome.conclusion.infos.len(), 1);

    let statuses: Vec<_> = outcome.trace.records().iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            ConstraintStatus::Warning,
            ConstraintStatus::Information,
            ConstraintStatus::Ok
        ]
    );
}

#[test]
fn warnings_before_a_failure_are_kept_on_the_failed_conclusion() {
    let calls = AtomicUsize::new(0);
    let chain = Chain::new("test")
        .with(item("warned", Level::Warn, SubIndication::CryptoConstraintsFailure, false, &calls))
        .with(item("failed", Level::Fail, SubIndication::SigCryptoFailure, false, &calls));

    let outcome = chain.execute(&Ctx { value: 0 }).unwrap();

    assert_eq!(outcome.conclusion.indication, Indication::Failed);
    assert_eq!(outcome.conclusion.sub_indication, Some(SubIndication::SigCryptoFailure));
    assert_eq!(outcome.conclusion.warnings.len(), 1);
}

#[test]
fn failure_indication_follows_the_sub_indication() {
    let calls = AtomicUsize::new(0);
    let chain = Chain::new("test").with(item(
        "stale",
        Level::Fail,
        SubIndication::TryLater,
        false,
        &calls,
    ));

    let outcome = chain.execute(&Ctx { value: 0 }).unwrap();
    assert_eq!(outcome.conclusion.indication, Indication::Indeterminate);
    assert!(outcome.conclusion.is_time_sensitive());
}

#[test]
fn check_errors_abort_the_chain() {
    let chain: Chain<'_, Ctx> = Chain::new("test").with(ChainItem::new(
        "broken",
        tags::BBB_CV_ISI,
        tags::BBB_CV_ISI_ANS,
        SubIndication::SigCryptoFailure,
        |_c: &Ctx| Err(ValidationError::MissingFacts("signature value".into())),
    ));

    let err = chain.execute(&Ctx { value: 0 }).unwrap_err();
    assert!(matches!(err, ValidationError::MissingFacts(_)));
}

struct AtLeast(u32);

impl Check<Ctx> for AtLeast {
    fn evaluate(&self, ctx: &Ctx) -> Result<bool, ValidationError> {
        Ok(ctx.value >= self.0)
    }
}

#[test]
fn custom_checks_plug_in_through_the_trait() {
    let chain = Chain::new("test").with(
        ChainItem::with_check(
            "threshold",
            tags::BBB_SAV_ISQPP,
            tags::BBB_SAV_ISQPP_ANS,
            SubIndication::SigConstraintsFailure,
            AtLeast(3),
        )
        .constraint(Some(&LevelConstraint::fail()))
        .detail("value below 3"),
    );

    assert!(chain.execute(&Ctx { value: 5 }).unwrap().conclusion.is_passed());

    let outcome = chain.execute(&Ctx { value: 1 }).unwrap();
    assert_eq!(outcome.conclusion.indication, Indication::Indeterminate);
    assert_eq!(
        outcome.conclusion.errors[0].detail.as_deref(),
        Some("value below 3")
    );
    assert_eq!(
        outcome.trace.find("threshold").map(|r| r.status),
        Some(ConstraintStatus::NotOk)
    );
}

#[test]
fn empty_chain_passes() {
    let chain: Chain<'_, Ctx> = Chain::new("empty");
    assert!(chain.is_empty());
    let outcome = chain.execute(&Ctx { value: 0 }).unwrap();
    assert!(outcome.conclusion.is_passed());
    assert!(outcome.trace.is_empty());
}

#[test]
fn item_level_comes_from_the_builder_or_the_constraint() {
    let calls = AtomicUsize::new(0);
    let fresh = item("fresh", Level::Fail, SubIndication::HashFailure, true, &calls);
    assert_eq!(fresh.level(), Level::Fail);
    assert_eq!(fresh.name(), "fresh");
    assert_eq!(fresh.failure(), SubIndication::HashFailure);

    let warned = fresh.with_level(Level::Warn);
    assert_eq!(warned.level(), Level::Warn);

    let informed = warned.constraint(Some(&LevelConstraint::inform()));
    assert_eq!(informed.level(), Level::Inform);

    let absent = informed.constraint(None);
    assert_eq!(absent.level(), Level::Ignore);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
