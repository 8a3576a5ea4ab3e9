//! Core domain types for Clause.
//!
//! This crate contains the pure policy and diagnostic types shared by the
//! contract engine and the config loader. No IO, no global state.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod failure;
pub use failure::{CheckKind, ContractViolation, Failure};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Failure Behavior
// ============================================================================

/// What a contract does when an evaluated check returns `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// The failed result is discarded.
    #[default]
    Ignore,
    /// Writes one diagnostic line.
    Log,
    /// Raises a [`ContractViolation`] carrying the check's message.
    #[serde(alias = "exception", alias = "throw_error")]
    Throw,
    /// Aborts the process. No unwinding.
    #[serde(alias = "terminate_process", alias = "abort")]
    Terminate,
    /// Writes the diagnostic line, then raises.
    #[serde(alias = "log_and_exception")]
    LogAndThrow,
    /// Writes the diagnostic line, then aborts.
    LogAndTerminate,
}

impl Behavior {
    pub const ALL: [Behavior; 6] = [
        Behavior::Ignore,
        Behavior::Log,
        Behavior::Throw,
        Behavior::Terminate,
        Behavior::LogAndThrow,
        Behavior::LogAndTerminate,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Behavior::Ignore => "ignore",
            Behavior::Log => "log",
            Behavior::Throw => "throw",
            Behavior::Terminate => "terminate",
            Behavior::LogAndThrow => "log_and_throw",
            Behavior::LogAndTerminate => "log_and_terminate",
        }
    }

    /// Whether a failure writes a diagnostic line.
    #[must_use]
    pub fn logs(self) -> bool {
        matches!(
            self,
            Behavior::Log | Behavior::LogAndThrow | Behavior::LogAndTerminate
        )
    }

    /// Whether a failure raises a [`ContractViolation`].
    #[must_use]
    pub fn raises(self) -> bool {
        matches!(self, Behavior::Throw | Behavior::LogAndThrow)
    }

    /// Whether a failure aborts the process.
    #[must_use]
    pub fn terminates(self) -> bool {
        matches!(self, Behavior::Terminate | Behavior::LogAndTerminate)
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Behavior {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "ignore" => Ok(Behavior::Ignore),
            "log" => Ok(Behavior::Log),
            "throw" | "throw_error" | "exception" => Ok(Behavior::Throw),
            "terminate" | "terminate_process" | "abort" => Ok(Behavior::Terminate),
            "log_and_throw" | "log_and_exception" => Ok(Behavior::LogAndThrow),
            "log_and_terminate" => Ok(Behavior::LogAndTerminate),
            _ => Err(PolicyParseError::UnknownBehavior(s.trim().to_string())),
        }
    }
}

// ============================================================================
// Evaluation Policy
// ============================================================================

/// Whether check closures are invoked at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    /// Check closures are never called.
    #[default]
    #[serde(alias = "unevaluated")]
    Never,
    Always,
    /// Same as `Always` with `debug_assertions` on, same as `Never` otherwise.
    #[serde(alias = "debug")]
    DebugOnly,
}

impl Evaluation {
    pub const ALL: [Evaluation; 3] = [Evaluation::Never, Evaluation::Always, Evaluation::DebugOnly];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Evaluation::Never => "never",
            Evaluation::Always => "always",
            Evaluation::DebugOnly => "debug_only",
        }
    }

    /// Whether checks run under this policy in the current build.
    #[must_use]
    pub fn is_active(self) -> bool {
        match self {
            Evaluation::Never => false,
            Evaluation::Always => true,
            Evaluation::DebugOnly => cfg!(debug_assertions),
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Evaluation {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "never" | "unevaluated" => Ok(Evaluation::Never),
            "always" => Ok(Evaluation::Always),
            "debug_only" | "debug" => Ok(Evaluation::DebugOnly),
            _ => Err(PolicyParseError::UnknownEvaluation(s.trim().to_string())),
        }
    }
}

// ============================================================================
// Policy
// ============================================================================

/// Failure behavior and evaluation policy, fixed for the life of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub behavior: Behavior,
    #[serde(default)]
    pub evaluation: Evaluation,
}

impl Policy {
    #[must_use]
    pub const fn new(behavior: Behavior, evaluation: Evaluation) -> Self {
        Self {
            behavior,
            evaluation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyParseError {
    #[error("unknown failure behavior `{0}`")]
    UnknownBehavior(String),
    #[error("unknown evaluation policy `{0}`")]
    UnknownEvaluation(String),
}

/// Lowercase and fold `-` to `_` so `log-and-throw` parses like `log_and_throw`.
fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('-', "_")
}
