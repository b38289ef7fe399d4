//! Shared test transports.
//!
//! - `FakeGitHub` interprets the crate's GraphQL documents against an in-memory
//!   set of branches and protection rules, enforcing deletion protection.
//! - `ScriptedTransport` replays canned responses and records every request.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::Mutex;

use proptest::prelude::*;
use serde_json::{Value, json};

use crate::github::queries::{
    BRANCHES_QUERY, DELETE_REF_MUTATION, RULES_QUERY, UPDATE_RULE_MUTATION,
};
use crate::github::{GitHubApiError, GraphQlRequest, GraphQlTransport};
use crate::types::{Branch, BranchProtectionRule, HEADS_NAMESPACE, RefId, RuleId};

// ─── FakeGitHub ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct FakeState {
    branches: Vec<Branch>,
    rules: Vec<BranchProtectionRule>,
    undeletable: HashSet<RefId>,
    requests: Vec<GraphQlRequest>,
}

/// An in-memory stand-in for one GitHub repository.
#[derive(Debug, Default)]
pub struct FakeGitHub {
    state: Mutex<FakeState>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().branches.push(Branch::new(id, name));
        self
    }

    pub fn with_rule(self, id: &str, pattern: &str, allows_deletions: bool) -> Self {
        self.state.lock().unwrap().rules.push(BranchProtectionRule {
            id: RuleId::new(id),
            pattern: pattern.to_string(),
            allows_deletions,
        });
        self
    }

    /// Makes deletion of the given ref fail regardless of protection.
    pub fn with_undeletable(self, id: &str) -> Self {
        self.state.lock().unwrap().undeletable.insert(RefId::new(id));
        self
    }

    pub fn rule(&self, id: &str) -> Option<BranchProtectionRule> {
        let state = self.state.lock().unwrap();
        state.rules.iter().find(|r| r.id.as_str() == id).cloned()
    }

    pub fn branch_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.branches.iter().map(|b| b.name.clone()).collect()
    }

    pub fn requests(&self) -> Vec<GraphQlRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_for(&self, query: &str) -> usize {
        self.requests().iter().filter(|r| r.query == query).count()
    }

    fn handle(&self, request: GraphQlRequest) -> Result<Value, GitHubApiError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        let vars = &request.variables;

        if request.query == BRANCHES_QUERY {
            let prefix = str_var(vars, "prefix")?;
            let first = vars["first"].as_u64().unwrap_or(0) as usize;
            let namespace = prefix.strip_prefix(HEADS_NAMESPACE).unwrap_or(&prefix);
            let nodes: Vec<Value> = state
                .branches
                .iter()
                .filter(|b| b.name.starts_with(namespace))
                .take(first)
                .map(|b| {
                    json!({
                        "id": b.id,
                        "name": &b.name[namespace.len()..],
                        "prefix": prefix,
                    })
                })
                .collect();
            return Ok(json!({ "repository": { "refs": { "nodes": nodes } } }));
        }

        if request.query == RULES_QUERY {
            let first = vars["first"].as_u64().unwrap_or(0) as usize;
            let start = vars["after"]
                .as_str()
                .and_then(|c| c.strip_prefix("cursor:"))
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(0);
            let end = (start + first).min(state.rules.len());
            let nodes: Vec<Value> = state.rules[start.min(end)..end]
                .iter()
                .map(|r| {
                    json!({
                        "id": r.id,
                        "pattern": r.pattern,
                        "allowsDeletions": r.allows_deletions,
                    })
                })
                .collect();
            return Ok(json!({
                "repository": {
                    "branchProtectionRules": {
                        "nodes": nodes,
                        "pageInfo": {
                            "hasNextPage": end < state.rules.len(),
                            "endCursor": format!("cursor:{}", end),
                        }
                    }
                }
            }));
        }

        if request.query == UPDATE_RULE_MUTATION {
            let id = str_var(&vars["input"], "branchProtectionRuleId")?;
            let allow = vars["input"]["allowsDeletions"].as_bool().unwrap_or(false);
            let rule = state
                .rules
                .iter_mut()
                .find(|r| r.id.as_str() == id)
                .ok_or_else(|| unresolved_node(&id))?;
            rule.allows_deletions = allow;
            return Ok(json!({
                "updateBranchProtectionRule": {
                    "branchProtectionRule": { "id": rule.id, "allowsDeletions": allow }
                }
            }));
        }

        if request.query == DELETE_REF_MUTATION {
            let id = RefId::new(str_var(&vars["input"], "refId")?);
            let index = state
                .branches
                .iter()
                .position(|b| b.id == id)
                .ok_or_else(|| unresolved_node(id.as_str()))?;
            let name = state.branches[index].name.clone();

            if state.undeletable.contains(&id) {
                return Err(GitHubApiError::permanent_without_source(format!(
                    "Resource not accessible by integration: {}",
                    name
                )));
            }
            let protected = state
                .rules
                .iter()
                .any(|r| !r.allows_deletions && name.starts_with(r.pattern.trim_end_matches('*')));
            if protected {
                return Err(GitHubApiError::permanent_without_source(format!(
                    "Cannot delete this protected branch: {}",
                    name
                )));
            }

            state.branches.remove(index);
            return Ok(json!({ "deleteRef": { "clientMutationId": null } }));
        }

        Err(GitHubApiError::permanent_without_source("unknown query"))
    }
}

impl GraphQlTransport for FakeGitHub {
    fn execute(
        &self,
        request: GraphQlRequest,
    ) -> impl Future<Output = Result<Value, GitHubApiError>> + Send {
        let result = self.handle(request);
        async move { result }
    }
}

fn str_var(vars: &Value, name: &str) -> Result<String, GitHubApiError> {
    vars[name].as_str().map(str::to_string).ok_or_else(|| {
        GitHubApiError::permanent_without_source(format!("missing variable {}", name))
    })
}

fn unresolved_node(id: &str) -> GitHubApiError {
    GitHubApiError::permanent_without_source(format!(
        "Could not resolve to a node with the global id of '{}'",
        id
    ))
}

// ─── ScriptedTransport ────────────────────────────────────────────────────────

/// Replays queued responses in order. Runs dry with a permanent error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, GitHubApiError>>>,
    requests: Mutex<Vec<GraphQlRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, data: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(data));
        self
    }

    pub fn fail(self, err: GitHubApiError) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<GraphQlRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl GraphQlTransport for ScriptedTransport {
    fn execute(
        &self,
        request: GraphQlRequest,
    ) -> impl Future<Output = Result<Value, GitHubApiError>> + Send {
        self.requests.lock().unwrap().push(request);
        let result = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(GitHubApiError::permanent_without_source(
                    "no scripted response",
                ))
            });
        async move { result }
    }
}

// ─── Generators ───────────────────────────────────────────────────────────────

pub fn arb_branch_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "release/[0-9]\\.[0-9]{1,2}",
        "hotfix/[a-z]{1,8}",
        "[a-z][a-z0-9-]{0,12}",
    ]
}

pub fn arb_pattern() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("release/*".to_string()),
        Just("release/".to_string()),
        Just("hotfix/*".to_string()),
        Just("main".to_string()),
        "[a-z]{1,6}/\\*",
    ]
}

/// Runs a future to completion on a fresh current-thread runtime.
///
/// For use inside `proptest!` bodies, which cannot be async.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}
