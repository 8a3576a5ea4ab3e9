//! Policy loading for Clause.
//!
//! Resolves a [`Policy`] from `~/.clause/config.toml` and the `CLAUSE_BEHAVIOR`
//! / `CLAUSE_EVALUATION` environment overrides:
//!
//! ```toml
//! [contract]
//! behavior = "log_and_throw"
//! evaluation = "debug_only"
//! ```
//!
//! Raw TOML structs stay private; callers only ever see a resolved `Policy`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use toml::de::Error as TomlError;

use clause_types::{Behavior, Evaluation, Policy, PolicyParseError};

pub const CLAUSE_BEHAVIOR: &str = "CLAUSE_BEHAVIOR";
pub const CLAUSE_EVALUATION: &str = "CLAUSE_EVALUATION";

const CONFIG_DIR: &str = ".clause";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: TomlError,
    },
    #[error("invalid value in {var}")]
    InvalidOverride {
        var: &'static str,
        #[source]
        source: PolicyParseError,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    contract: RawContract,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawContract {
    behavior: Option<Behavior>,
    evaluation: Option<Evaluation>,
}

impl RawConfig {
    fn resolve(self) -> Policy {
        let defaults = Policy::default();
        Policy {
            behavior: self.contract.behavior.unwrap_or(defaults.behavior),
            evaluation: self.contract.evaluation.unwrap_or(defaults.evaluation),
        }
    }
}

/// Default config location: `~/.clause/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Parse config text. Missing keys fall back to [`Policy::default`].
pub fn parse_policy(text: &str) -> Result<Policy, TomlError> {
    let raw: RawConfig = toml::from_str(text)?;
    Ok(raw.resolve())
}

/// Read and parse a config file. The file must exist.
pub fn load_from(path: &Path) -> Result<Policy, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Loaded contract config");
    parse_policy(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the effective policy: the default config file when present,
/// then environment overrides on top.
pub fn load() -> Result<Policy, ConfigError> {
    let policy = match config_path() {
        Some(path) if path.exists() => load_from(&path)?,
        _ => Policy::default(),
    };
    apply_env_overrides(policy)
}

/// Apply `CLAUSE_BEHAVIOR` / `CLAUSE_EVALUATION` from the process environment.
pub fn apply_env_overrides(policy: Policy) -> Result<Policy, ConfigError> {
    apply_overrides(policy, |var| env::var(var).ok())
}

/// Apply overrides from `lookup`. Unset or blank values leave the field alone;
/// values that do not parse are errors.
pub fn apply_overrides(
    mut policy: Policy,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Policy, ConfigError> {
    if let Some(raw) = non_blank(lookup(CLAUSE_BEHAVIOR)) {
        policy.behavior = raw
            .parse()
            .map_err(|source| ConfigError::InvalidOverride {
                var: CLAUSE_BEHAVIOR,
                source,
            })?;
        tracing::info!(
            env_var = CLAUSE_BEHAVIOR,
            behavior = %policy.behavior,
            "Contract behavior overridden by environment"
        );
    }
    if let Some(raw) = non_blank(lookup(CLAUSE_EVALUATION)) {
        policy.evaluation = raw
            .parse()
            .map_err(|source| ConfigError::InvalidOverride {
                var: CLAUSE_EVALUATION,
                source,
            })?;
        tracing::info!(
            env_var = CLAUSE_EVALUATION,
            evaluation = %policy.evaluation,
            "Contract evaluation overridden by environment"
        );
    }
    Ok(policy)
}

/// Apply overrides from an in-memory map, for callers that collect settings
/// from somewhere other than the process environment.
pub fn apply_override_map(
    policy: Policy,
    overrides: &HashMap<String, String>,
) -> Result<Policy, ConfigError> {
    apply_overrides(policy, |var| overrides.get(var).cloned())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}
