//! GraphQL documents and the response shapes they decode into.

use serde::{Deserialize, Serialize};

use crate::types::{BranchProtectionRule, RefId, RuleId};

// ─── Branch Listing ───────────────────────────────────────────────────────────

/// Lists refs under a fully qualified prefix (e.g. `refs/heads/release/`).
pub const BRANCHES_QUERY: &str = r#"
query($owner: String!, $repo: String!, $prefix: String!, $first: Int!) {
    repository(owner: $owner, name: $repo) {
        refs(refPrefix: $prefix, first: $first) {
            nodes {
                id
                name
                prefix
            }
        }
    }
}
"#;

#[derive(Debug, Serialize)]
pub struct BranchesVariables<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub prefix: &'a str,
    pub first: u32,
}

#[derive(Debug, Deserialize)]
pub struct BranchesResponse {
    pub repository: Option<BranchesRepository>,
}

#[derive(Debug, Deserialize)]
pub struct BranchesRepository {
    pub refs: Option<RefConnection>,
}

#[derive(Debug, Deserialize)]
pub struct RefConnection {
    #[serde(default)]
    pub nodes: Vec<Option<RefNode>>,
}

#[derive(Debug, Deserialize)]
pub struct RefNode {
    pub id: RefId,
    /// Name relative to `prefix`.
    pub name: String,
    pub prefix: String,
}

// ─── Branch Protection Rules ──────────────────────────────────────────────────

/// Fetches one page of branch protection rules.
pub const RULES_QUERY: &str = r#"
query($owner: String!, $repo: String!, $first: Int!, $after: String) {
    repository(owner: $owner, name: $repo) {
        branchProtectionRules(first: $first, after: $after) {
            nodes {
                id
                pattern
                allowsDeletions
            }
            pageInfo {
                hasNextPage
                endCursor
            }
        }
    }
}
"#;

#[derive(Debug, Serialize)]
pub struct RulesVariables<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub first: u32,
    pub after: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct RulesResponse {
    pub repository: Option<RulesRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesRepository {
    pub branch_protection_rules: RuleConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConnection {
    #[serde(default)]
    pub nodes: Vec<Option<RuleNode>>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleNode {
    pub id: RuleId,
    pub pattern: String,
    pub allows_deletions: bool,
}

impl From<RuleNode> for BranchProtectionRule {
    fn from(node: RuleNode) -> Self {
        BranchProtectionRule {
            id: node.id,
            pattern: node.pattern,
            allows_deletions: node.allows_deletions,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

// ─── Mutations ────────────────────────────────────────────────────────────────

/// Sets `allowsDeletions` on a branch protection rule. No other field is sent.
pub const UPDATE_RULE_MUTATION: &str = r#"
mutation($input: UpdateBranchProtectionRuleInput!) {
    updateBranchProtectionRule(input: $input) {
        branchProtectionRule {
            id
            allowsDeletions
        }
    }
}
"#;

#[derive(Debug, Serialize)]
pub struct UpdateRuleVariables<'a> {
    pub input: UpdateRuleInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleInput<'a> {
    pub branch_protection_rule_id: &'a RuleId,
    pub allows_deletions: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleResponse {
    pub update_branch_protection_rule: Option<UpdateRulePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRulePayload {
    pub branch_protection_rule: Option<UpdatedRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedRule {
    pub allows_deletions: bool,
}

/// Deletes a ref by node ID.
pub const DELETE_REF_MUTATION: &str = r#"
mutation($input: DeleteRefInput!) {
    deleteRef(input: $input) {
        clientMutationId
    }
}
"#;

#[derive(Debug, Serialize)]
pub struct DeleteRefVariables<'a> {
    pub input: DeleteRefInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRefInput<'a> {
    pub ref_id: &'a RefId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRefResponse {
    pub delete_ref: Option<serde_json::Value>,
}
