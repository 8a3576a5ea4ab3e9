//! Chained registration returns the same contract

use std::ptr;

use clause_core::{Behavior, Contract, ContractViolation, Evaluation, Policy};

#[test]
fn each_call_returns_the_same_contract() -> Result<(), ContractViolation> {
    let mut contract = Contract::new("chain", Behavior::Throw, Evaluation::Always);
    let origin: *const Contract<'_> = &raw const contract;

    let after_pre: *const Contract<'_> = contract.precondition(|| true, "")?;
    let after_cond: *const Contract<'_> = contract.condition(|| true, "")?;
    let after_post: *const Contract<'_> = contract.postcondition(|| true, "");

    assert!(ptr::eq(origin, after_pre));
    assert!(ptr::eq(origin, after_cond));
    assert!(ptr::eq(origin, after_post));
    contract.finish()
}

#[test]
fn full_chain_in_one_expression() -> Result<(), ContractViolation> {
    let mut contract = Contract::with_policy(
        "chain",
        Policy::new(Behavior::LogAndThrow, Evaluation::Always),
    );
    let origin: *const Contract<'_> = &raw const contract;
    let chained: *const Contract<'_> = contract
        .precondition(|| true, "f1")?
        .condition(|| true, "f2")?
        .postcondition(|| true, "f3");

    assert!(ptr::eq(origin, chained));
    assert_eq!(contract.pending_postconditions(), 1);
    contract.finish()
}

#[test]
fn chain_stops_at_first_raised_violation() {
    let mut contract = Contract::new("chain", Behavior::Throw, Evaluation::Always);
    let outcome = contract
        .precondition(|| false, "f1")
        .map(|c| c.postcondition(|| false, "never registered"));

    assert_eq!(outcome.unwrap_err().message(), "f1");
    assert_eq!(contract.pending_postconditions(), 0);
}
