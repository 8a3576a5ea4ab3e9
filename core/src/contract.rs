//! The contract scope guard.
//!
//! Immediate checks (`precondition`, `condition`) run inside the registering
//! call. Postconditions are queued and run once, in registration order, when
//! the contract is finalized by [`Contract::finish`] or by `Drop`.

use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::process;
use std::thread;

use clause_types::{Behavior, CheckKind, ContractViolation, Evaluation, Failure, Policy};

use crate::reporter::{Reporter, StderrReporter};

struct Postcheck<'a> {
    check: Box<dyn FnOnce() -> bool + 'a>,
    message: String,
}

/// A named set of runtime checks around one operation.
///
/// The [`Policy`] is fixed when the contract is built. Under a raising
/// behavior, immediate checks hand the violation back as `Err` so the caller
/// can propagate it with `?`. Postcondition violations surface from
/// [`finish`](Contract::finish) as `Err`, or, when the contract is simply
/// dropped, as a panic whose payload is the [`ContractViolation`].
///
/// A contract belongs to the thread that built it:
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<clause_core::Contract<'static>>();
/// ```
pub struct Contract<'a> {
    name: String,
    policy: Policy,
    pending: Vec<Postcheck<'a>>,
    reporter: Box<dyn Reporter>,
    /// Postchecks registered before the latest violation handed to the caller.
    in_flight: usize,
}

impl<'a> Contract<'a> {
    /// Build a contract with diagnostics going to standard error.
    #[must_use]
    pub fn new(name: impl Into<String>, behavior: Behavior, evaluation: Evaluation) -> Self {
        Self::with_policy(name, Policy::new(behavior, evaluation))
    }

    /// Build a contract with the default policy: checks are never evaluated.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::with_policy(name, Policy::default())
    }

    #[must_use]
    pub fn with_policy(name: impl Into<String>, policy: Policy) -> Self {
        Self {
            name: name.into(),
            policy,
            pending: Vec::new(),
            reporter: Box::new(StderrReporter),
            in_flight: 0,
        }
    }

    /// Replace the diagnostic sink.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    #[must_use]
    pub fn behavior(&self) -> Behavior {
        self.policy.behavior
    }

    #[must_use]
    pub fn evaluation(&self) -> Evaluation {
        self.policy.evaluation
    }

    /// Number of postconditions waiting for finalization.
    #[must_use]
    pub fn pending_postconditions(&self) -> usize {
        self.pending.len()
    }

    /// Check something that must hold on entry. Evaluated before this returns.
    pub fn precondition(
        &mut self,
        check: impl FnOnce() -> bool,
        message: impl AsRef<str>,
    ) -> Result<&mut Self, ContractViolation> {
        self.check_now(check, message.as_ref(), CheckKind::Precondition)?;
        Ok(self)
    }

    /// Check something that must hold mid-operation. Evaluated before this returns.
    pub fn condition(
        &mut self,
        check: impl FnOnce() -> bool,
        message: impl AsRef<str>,
    ) -> Result<&mut Self, ContractViolation> {
        self.check_now(check, message.as_ref(), CheckKind::Condition)?;
        Ok(self)
    }

    /// Queue a check for finalization. `check` is not called here.
    pub fn postcondition(
        &mut self,
        check: impl FnOnce() -> bool + 'a,
        message: impl AsRef<str>,
    ) -> &mut Self {
        self.pending.push(Postcheck {
            check: Box::new(check),
            message: message.as_ref().to_owned(),
        });
        self
    }

    /// Run every pending postcondition and report the first violation.
    ///
    /// All postconditions run even when an earlier one fails.
    pub fn finish(mut self) -> Result<(), ContractViolation> {
        self.run_postchecks(0)
    }

    fn check_now(
        &mut self,
        check: impl FnOnce() -> bool,
        message: &str,
        kind: CheckKind,
    ) -> Result<(), ContractViolation> {
        let outcome = self.evaluate(check, message, kind);
        if outcome.is_err() {
            self.in_flight = self.pending.len();
        }
        outcome
    }

    /// Run every pending postcheck in order and return the first violation.
    /// Violations from the first `in_flight` postchecks are only logged: they
    /// belong to an operation whose error was already handed to the caller.
    fn run_postchecks(&mut self, in_flight: usize) -> Result<(), ContractViolation> {
        let mut first = None;
        for (index, Postcheck { check, message }) in
            mem::take(&mut self.pending).into_iter().enumerate()
        {
            let Err(violation) = self.evaluate(check, &message, CheckKind::Postcondition) else {
                continue;
            };
            if index < in_flight {
                tracing::warn!(
                    contract = %self.name,
                    message = violation.message(),
                    "Postcondition violation not raised: contract already raised"
                );
            } else {
                first.get_or_insert(violation);
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Finalization while the thread is already panicking. A second panic
    /// escaping a destructor would abort, so check panics are contained and
    /// violations are only reported.
    fn run_postchecks_unwinding(&mut self) {
        for Postcheck { check, message } in mem::take(&mut self.pending) {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.evaluate(check, &message, CheckKind::Postcondition)
            }));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(violation)) => {
                    tracing::warn!(
                        contract = %self.name,
                        message = violation.message(),
                        "Postcondition violation not raised: scope is already unwinding"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        contract = %self.name,
                        message = %message,
                        "Postcondition check panicked during unwinding"
                    );
                }
            }
        }
    }

    fn evaluate(
        &self,
        check: impl FnOnce() -> bool,
        message: &str,
        kind: CheckKind,
    ) -> Result<(), ContractViolation> {
        if !self.policy.evaluation.is_active() || check() {
            return Ok(());
        }
        self.fail(&Failure::new(kind, &self.name, message))
    }

    fn fail(&self, failure: &Failure<'_>) -> Result<(), ContractViolation> {
        let behavior = self.policy.behavior;
        if behavior.logs() {
            self.reporter.report(failure);
        }
        if behavior.terminates() {
            terminate(failure);
        }
        if behavior.raises() {
            return Err(failure.violation());
        }
        Ok(())
    }
}

#[cold]
#[inline(never)]
fn terminate(failure: &Failure<'_>) -> ! {
    tracing::error!(
        kind = %failure.kind,
        contract = failure.name,
        message = failure.message,
        "Contract check failed; aborting process"
    );
    process::abort()
}

impl Default for Contract<'_> {
    fn default() -> Self {
        Self::named(String::new())
    }
}

impl fmt::Debug for Contract<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("pending", &self.pending.len())
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl Drop for Contract<'_> {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if thread::panicking() {
            self.run_postchecks_unwinding();
            return;
        }
        if let Err(violation) = self.run_postchecks(self.in_flight) {
            panic::panic_any(violation);
        }
    }
}
