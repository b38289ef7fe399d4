//! Client configuration.
//!
//! The client never reads the process environment itself. The binary builds a
//! `ClientConfig` (usually via [`ClientConfig::from_env`]) and hands it over, so
//! tests can inject fixtures through [`ClientConfig::from_lookup`].

use std::fmt;
use std::num::NonZeroU32;
use thiserror::Error;

use crate::types::RepoId;

/// Environment variable holding the repository owner (user or organization).
pub const OWNER_VAR: &str = "GITHUB_OWNER";
/// Environment variable holding the repository name.
pub const REPO_VAR: &str = "GITHUB_REPO";
/// Environment variable holding the access token.
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Environment variable naming the protection rule prefix to act on.
pub const RULE_PREFIX_VAR: &str = "SWEEP_RULE_PREFIX";
/// Environment variable enabling branch deletion (`true`/`false`).
pub const DELETE_VAR: &str = "SWEEP_DELETE";
/// Environment variable naming the branch prefix to delete under.
pub const BRANCH_PREFIX_VAR: &str = "SWEEP_BRANCH_PREFIX";
/// Environment variable capping the number of branches deleted.
pub const LIMIT_VAR: &str = "SWEEP_LIMIT";

/// Default protection rule prefix.
pub const DEFAULT_RULE_PREFIX: &str = "release/";
/// Default cap on branches deleted per sweep.
pub const DEFAULT_LIMIT: u32 = 5;

/// Errors from loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{var} is not set")]
    Missing { var: &'static str },

    /// A variable is set to something unparseable.
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// A GitHub access token. `Debug` output never includes the value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    /// Returns the raw token for handing to the HTTP client.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Everything needed to construct an authenticated, repository-scoped client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub repo: RepoId,
    pub token: AccessToken,
}

impl ClientConfig {
    pub fn new(repo: RepoId, token: AccessToken) -> Self {
        Self { repo, token }
    }

    /// Loads configuration from `GITHUB_OWNER`, `GITHUB_REPO` and `GITHUB_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Variables are checked in owner, repo, token order and the first missing
    /// one is reported. Surrounding whitespace is trimmed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing { var })
        };

        let owner = require(OWNER_VAR)?;
        let repo = require(REPO_VAR)?;
        let token = require(TOKEN_VAR)?;

        Ok(Self {
            repo: RepoId::new(owner, repo),
            token: AccessToken::new(token),
        })
    }
}

/// What the command should do once the client is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepMode {
    /// Re-enable delete protection on the matched rule and report its status.
    Protect,
    /// Delete branches under `branch_prefix` with the rule temporarily relaxed.
    Delete {
        branch_prefix: String,
        limit: NonZeroU32,
    },
}

/// Command options, read from `SWEEP_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepOptions {
    pub rule_prefix: String,
    pub mode: SweepMode,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            rule_prefix: DEFAULT_RULE_PREFIX.to_string(),
            mode: SweepMode::Protect,
        }
    }
}

impl SweepOptions {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads options through an arbitrary variable lookup.
    ///
    /// Every variable is optional. The branch prefix defaults to the rule
    /// prefix.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let rule_prefix =
            optional(RULE_PREFIX_VAR).unwrap_or_else(|| DEFAULT_RULE_PREFIX.to_string());

        let delete = match optional(DELETE_VAR) {
            None => false,
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: DELETE_VAR,
                        value,
                        reason: "expected true or false",
                    });
                }
            },
        };

        if !delete {
            return Ok(Self {
                rule_prefix,
                mode: SweepMode::Protect,
            });
        }

        let branch_prefix = optional(BRANCH_PREFIX_VAR).unwrap_or_else(|| rule_prefix.clone());
        let limit = match optional(LIMIT_VAR) {
            None => NonZeroU32::new(DEFAULT_LIMIT).unwrap_or(NonZeroU32::MIN),
            Some(value) => value.parse::<NonZeroU32>().map_err(|_| ConfigError::Invalid {
                var: LIMIT_VAR,
                value,
                reason: "expected a positive integer",
            })?,
        };

        Ok(Self {
            rule_prefix,
            mode: SweepMode::Delete {
                branch_prefix,
                limit,
            },
        })
    }
}
