//! Deferred postcondition finalization

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};

use clause_core::{Behavior, ContractViolation, Evaluation};

use crate::common::recorded;

#[test]
fn run_once_in_registration_order_on_drop() {
    let order = RefCell::new(Vec::new());
    {
        let (mut contract, _reporter) = recorded("ordered", Behavior::Log, Evaluation::Always);
        for index in 0..4 {
            let order = &order;
            contract.postcondition(
                move || {
                    order.borrow_mut().push(index);
                    true
                },
                format!("step {index}"),
            );
        }
        assert!(order.borrow().is_empty());
        assert_eq!(contract.pending_postconditions(), 4);
    }
    assert_eq!(*order.borrow(), [0, 1, 2, 3]);
}

#[test]
fn failures_reported_in_registration_order() {
    let (mut contract, reporter) = recorded("ordered", Behavior::Log, Evaluation::Always);
    contract
        .postcondition(|| false, "first")
        .postcondition(|| true, "skipped")
        .postcondition(|| false, "second");
    drop(contract);

    assert_eq!(
        reporter.lines(),
        [
            "postcondition failed in ordered: first",
            "postcondition failed in ordered: second"
        ]
    );
}

#[test]
fn finish_consumes_pending_checks() {
    let calls = Cell::new(0);
    let (mut contract, _reporter) = recorded("finish", Behavior::Throw, Evaluation::Always);
    contract.postcondition(
        || {
            calls.set(calls.get() + 1);
            true
        },
        "",
    );
    contract.finish().unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn drop_raises_first_violation_after_running_all() {
    let later_ran = Cell::new(false);
    let reporter = RefCell::new(None);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let (mut contract, recorder) =
            recorded("dropped", Behavior::LogAndThrow, Evaluation::Always);
        *reporter.borrow_mut() = Some(recorder);
        contract.postcondition(|| false, "vec must be empty").postcondition(
            || {
                later_ran.set(true);
                false
            },
            "len must be zero",
        );
    }));

    let payload = result.expect_err("drop should raise the violation");
    let violation = payload
        .downcast_ref::<ContractViolation>()
        .expect("payload is a ContractViolation");
    assert_eq!(violation.message(), "vec must be empty");
    assert!(later_ran.get());

    let recorder = reporter.borrow_mut().take().unwrap();
    assert_eq!(
        recorder.lines(),
        [
            "postcondition failed in dropped: vec must be empty",
            "postcondition failed in dropped: len must be zero"
        ]
    );
}

#[test]
fn drop_after_raised_violation_reports_without_raising() {
    let (mut contract, reporter) = recorded("raised", Behavior::LogAndThrow, Evaluation::Always);
    contract.postcondition(|| false, "post");
    let err = contract.precondition(|| false, "pre").unwrap_err();
    assert_eq!(err.message(), "pre");

    // Must not panic: the precondition violation is the one in flight.
    drop(contract);

    assert_eq!(
        reporter.lines(),
        [
            "precondition failed in raised: pre",
            "postcondition failed in raised: post"
        ]
    );
}

#[test]
fn explicit_finish_still_returns_violation_after_raised() {
    let (mut contract, _reporter) = recorded("raised", Behavior::Throw, Evaluation::Always);
    contract.postcondition(|| false, "post");
    assert!(contract.condition(|| false, "cond").is_err());
    assert_eq!(contract.finish().unwrap_err().message(), "post");
}

#[test]
fn postcondition_after_handled_violation_still_raises() {
    let (mut contract, reporter) = recorded("handled", Behavior::Throw, Evaluation::Always);
    let handled = contract.condition(|| false, "handled").is_err();
    assert!(handled);

    let result = panic::catch_unwind(AssertUnwindSafe(move || {
        contract.postcondition(|| false, "post must raise");
    }));

    let payload = result.expect_err("later postcondition raises on drop");
    let violation = payload
        .downcast_ref::<ContractViolation>()
        .expect("payload is a ContractViolation");
    assert_eq!(violation.message(), "post must raise");
    assert!(reporter.is_empty());
}

#[test]
fn only_postconditions_queued_before_raise_are_suppressed() {
    let (mut contract, reporter) = recorded("mixed", Behavior::LogAndThrow, Evaluation::Always);
    contract.postcondition(|| false, "queued before");
    assert!(contract.precondition(|| false, "pre").is_err());

    let result = panic::catch_unwind(AssertUnwindSafe(move || {
        contract.postcondition(|| false, "queued after");
    }));

    let payload = result.expect_err("postcondition queued after the raise is raised");
    let violation = payload.downcast_ref::<ContractViolation>().unwrap();
    assert_eq!(violation.message(), "queued after");
    assert_eq!(
        reporter.lines(),
        [
            "precondition failed in mixed: pre",
            "postcondition failed in mixed: queued before",
            "postcondition failed in mixed: queued after"
        ]
    );
}

#[test]
fn messages_accept_owned_strings_on_every_kind() {
    let (mut contract, reporter) = recorded("owned", Behavior::Log, Evaluation::Always);
    let index = 3;
    contract
        .precondition(|| false, format!("index {index} in range"))
        .unwrap()
        .condition(|| false, String::from("cond"))
        .unwrap()
        .postcondition(|| false, format!("len is {index}"));
    contract.finish().unwrap();

    assert_eq!(
        reporter.lines(),
        [
            "precondition failed in owned: index 3 in range",
            "condition failed in owned: cond",
            "postcondition failed in owned: len is 3"
        ]
    );
}
