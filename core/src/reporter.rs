//! Diagnostic sinks for failed checks.
//!
//! A [`Reporter`] receives one [`Failure`] per failed check whose behavior
//! includes logging. The line format lives on `Failure`'s `Display`, so every
//! sink prints the same text.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use clause_types::Failure;

pub trait Reporter {
    fn report(&self, failure: &Failure<'_>);
}

impl<F> Reporter for F
where
    F: Fn(&Failure<'_>),
{
    fn report(&self, failure: &Failure<'_>) {
        self(failure);
    }
}

/// Writes `<line>\n` to the process's standard error.
///
/// Goes through the raw stderr handle rather than `eprintln!`, so the line is
/// on the file descriptor before a terminating behavior aborts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&self, failure: &Failure<'_>) {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{failure}");
        let _ = stderr.flush();
    }
}

/// Emits each failure as an `ERROR` event with `kind`, `contract` and `message` fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, failure: &Failure<'_>) {
        tracing::error!(
            kind = %failure.kind,
            contract = failure.name,
            message = failure.message,
            "{failure}"
        );
    }
}

/// Keeps diagnostic lines in memory. Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    lines: Rc<RefCell<Vec<String>>>,
}

impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines recorded so far, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Drain the recorded lines.
    #[must_use]
    pub fn take(&self) -> Vec<String> {
        self.lines.take()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, failure: &Failure<'_>) {
        self.lines.borrow_mut().push(failure.to_string());
    }
}
