//! Core domain types for branch sweeping.

pub mod branch;
pub mod ids;

pub use branch::{Branch, BranchProtectionRule, HEADS_NAMESPACE, qualify_branch_prefix};
pub use ids::{RefId, RepoId, RuleId};
