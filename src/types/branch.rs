//! Branch and branch protection rule values.
//!
//! These are snapshots of server-side objects as returned by a single query.
//! Nothing here is persisted or cached between calls.

use std::fmt;

use super::ids::{RefId, RuleId};

/// The namespace root under which branch refs live.
pub const HEADS_NAMESPACE: &str = "refs/heads/";

/// A branch ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Opaque node ID of the ref, valid for as long as the ref exists.
    pub id: RefId,
    /// Short name under `refs/heads/`, e.g. `release/1.0`.
    pub name: String,
}

impl Branch {
    pub fn new(id: impl Into<RefId>, name: impl Into<String>) -> Self {
        Branch {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Builds a branch from a ref listed under `prefix`.
    ///
    /// GitHub reports a listed ref's `name` relative to the prefix it was
    /// queried with, so `refs/heads/release/` + `1.0` becomes `release/1.0`.
    pub fn from_listed_ref(id: RefId, prefix: &str, name: &str) -> Self {
        let namespace = prefix.strip_prefix(HEADS_NAMESPACE).unwrap_or(prefix);
        Branch {
            id,
            name: format!("{}{}", namespace, name),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A branch protection rule as last reported by GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchProtectionRule {
    pub id: RuleId,
    /// The branch name pattern the rule applies to (e.g. `release/*`).
    pub pattern: String,
    /// Whether branches matching the rule may be deleted.
    pub allows_deletions: bool,
}

impl BranchProtectionRule {
    /// Returns true if the rule's pattern starts with `prefix`.
    ///
    /// This is a plain string prefix test, not glob matching.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.pattern.starts_with(prefix)
    }
}

/// Qualifies a branch prefix with the heads namespace.
pub fn qualify_branch_prefix(prefix: &str) -> String {
    format!("{}{}", HEADS_NAMESPACE, prefix)
}
