//! Check kinds, failed-check diagnostics, and the violation error.

use std::fmt;

use thiserror::Error;

/// Which registration call produced a check. Only changes diagnostic wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    Precondition,
    Condition,
    Postcondition,
}

impl CheckKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::Precondition => "precondition",
            CheckKind::Condition => "condition",
            CheckKind::Postcondition => "postcondition",
        }
    }

    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            CheckKind::Precondition => "precondition failed",
            CheckKind::Condition => "condition failed",
            CheckKind::Postcondition => "postcondition failed",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A check that was evaluated and returned `false`.
///
/// `Display` renders the diagnostic line without its trailing newline:
/// `<kind> failed[ in <name>][: <message>]`. The ` in` clause is dropped when
/// `name` is empty, the `:` clause when `message` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure<'a> {
    pub kind: CheckKind,
    pub name: &'a str,
    pub message: &'a str,
}

impl<'a> Failure<'a> {
    #[must_use]
    pub fn new(kind: CheckKind, name: &'a str, message: &'a str) -> Self {
        Self {
            kind,
            name,
            message,
        }
    }

    /// The violation a raising behavior hands back for this failure.
    #[must_use]
    pub fn violation(&self) -> ContractViolation {
        ContractViolation::new(self.message)
    }
}

impl fmt::Display for Failure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.verb())?;
        if !self.name.is_empty() {
            write!(f, " in {}", self.name)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

/// Raised when a check fails under a throwing behavior.
///
/// Carries only the message supplied with the failing check, which may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ContractViolation {
    message: String,
}

impl ContractViolation {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn into_message(self) -> String {
        self.message
    }
}
