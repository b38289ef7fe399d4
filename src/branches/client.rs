//! Branch and branch-protection operations against one repository.
//!
//! Each operation is a single request/response exchange (the rule lookup may
//! walk several pages, strictly one after another). Nothing is cached between
//! calls and nothing is retried.

use std::num::NonZeroU32;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::github::queries::{
    BRANCHES_QUERY, BranchesResponse, BranchesVariables, DELETE_REF_MUTATION, DeleteRefInput,
    DeleteRefResponse, DeleteRefVariables, PageInfo, RULES_QUERY, RulesResponse, RulesVariables,
    UPDATE_RULE_MUTATION, UpdateRuleInput, UpdateRuleResponse, UpdateRuleVariables,
};
use crate::github::{GitHubApiError, GraphQlRequest, GraphQlTransport};
use crate::types::{Branch, BranchProtectionRule, RefId, RepoId, RuleId, qualify_branch_prefix};

use super::error::BranchClientError;

/// Number of branch protection rules requested per page.
pub const RULE_PAGE_SIZE: u32 = 10;

/// Upper bound on rule pages walked by a single lookup.
pub const MAX_RULE_PAGES: u32 = 50;

/// Branch lifecycle operations scoped to one repository.
///
/// Holds only immutable state, so it is as shareable as its transport.
#[derive(Debug, Clone)]
pub struct RepositoryBranchClient<T> {
    transport: T,
    repo: RepoId,
}

impl<T: GraphQlTransport> RepositoryBranchClient<T> {
    pub fn new(transport: T, repo: RepoId) -> Self {
        Self { transport, repo }
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Lists up to `limit` branches whose names start with `prefix`.
    ///
    /// `prefix` is relative to `refs/heads/` (e.g. `release/`). Branches come
    /// back in whatever order GitHub returns them.
    pub async fn get_branches(
        &self,
        prefix: &str,
        limit: NonZeroU32,
    ) -> Result<Vec<Branch>, BranchClientError> {
        const OPERATION: &str = "branches";

        let qualified = qualify_branch_prefix(prefix);
        debug!(repo = %self.repo, prefix = %qualified, limit = limit.get(), "listing branches");

        let variables = BranchesVariables {
            owner: &self.repo.owner,
            repo: &self.repo.repo,
            prefix: &qualified,
            first: limit.get(),
        };
        let response: BranchesResponse = self
            .run(BRANCHES_QUERY, variables)
            .await
            .map_err(|e| BranchClientError::query(OPERATION, e))?;

        let repository = response
            .repository
            .ok_or_else(|| BranchClientError::query(OPERATION, self.missing_repository()))?;

        let branches: Vec<Branch> = repository
            .refs
            .map(|refs| refs.nodes)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|node| Branch::from_listed_ref(node.id, &node.prefix, &node.name))
            .take(limit.get() as usize)
            .collect();

        debug!(count = branches.len(), "listed branches");
        Ok(branches)
    }

    /// Returns the ID of the first rule whose pattern starts with `prefix`.
    pub async fn branch_protection_rule_id(
        &self,
        prefix: &str,
    ) -> Result<RuleId, BranchClientError> {
        self.find_branch_protection_rule(prefix)
            .await
            .map(|rule| rule.id)
    }

    /// Returns the first rule, in server order, whose pattern starts with `prefix`.
    ///
    /// Rules are fetched `RULE_PAGE_SIZE` at a time, following the connection
    /// cursor until a match turns up or the rules run out.
    pub async fn find_branch_protection_rule(
        &self,
        prefix: &str,
    ) -> Result<BranchProtectionRule, BranchClientError> {
        const OPERATION: &str = "branch rules";

        let mut cursor: Option<String> = None;
        let mut page = 1u32;

        loop {
            debug!(repo = %self.repo, prefix, page, "fetching branch protection rules");

            let variables = RulesVariables {
                owner: &self.repo.owner,
                repo: &self.repo.repo,
                first: RULE_PAGE_SIZE,
                after: cursor.as_deref(),
            };
            let response: RulesResponse = self
                .run(RULES_QUERY, variables)
                .await
                .map_err(|e| BranchClientError::query(OPERATION, e))?;

            let connection = response
                .repository
                .ok_or_else(|| BranchClientError::query(OPERATION, self.missing_repository()))?
                .branch_protection_rules;

            let matched = connection
                .nodes
                .into_iter()
                .flatten()
                .map(BranchProtectionRule::from)
                .find(|rule| rule.matches_prefix(prefix));

            if let Some(rule) = matched {
                debug!(
                    rule_id = %rule.id,
                    pattern = %rule.pattern,
                    "matched branch protection rule"
                );
                return Ok(rule);
            }

            match connection.page_info {
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(next),
                } if page < MAX_RULE_PAGES => {
                    cursor = Some(next);
                    page += 1;
                }
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(_),
                } => {
                    warn!(
                        pages = page,
                        prefix,
                        "Hit pagination limit for branch protection rules; lookup may be incomplete"
                    );
                    break;
                }
                PageInfo {
                    has_next_page: true,
                    end_cursor: None,
                } => {
                    warn!(
                        pages = page,
                        prefix,
                        "More branch protection rules reported but no end cursor given; \
                         lookup may be incomplete"
                    );
                    break;
                }
                PageInfo { .. } => break,
            }
        }

        Err(BranchClientError::NotFound {
            prefix: prefix.to_string(),
        })
    }

    /// Sets `allowsDeletions` on a rule, leaving every other setting alone.
    ///
    /// The returned status reflects the value GitHub reports after the update.
    pub async fn allow_delete_protected_branch(
        &self,
        rule_id: &RuleId,
        allow: bool,
    ) -> Result<String, BranchClientError> {
        const OPERATION: &str = "branch protection rule";

        info!(repo = %self.repo, rule_id = %rule_id, allow, "updating allowsDeletions");

        let variables = UpdateRuleVariables {
            input: UpdateRuleInput {
                branch_protection_rule_id: rule_id,
                allows_deletions: allow,
            },
        };
        let response: UpdateRuleResponse = self
            .run(UPDATE_RULE_MUTATION, variables)
            .await
            .map_err(|e| BranchClientError::mutation(OPERATION, e))?;

        let updated = response
            .update_branch_protection_rule
            .and_then(|payload| payload.branch_protection_rule)
            .ok_or_else(|| {
                BranchClientError::mutation(
                    OPERATION,
                    GitHubApiError::permanent_without_source(format!(
                        "rule {} was not returned by the update",
                        rule_id
                    )),
                )
            })?;

        if updated.allows_deletions != allow {
            return Err(BranchClientError::mutation(
                OPERATION,
                GitHubApiError::permanent_without_source(format!(
                    "requested allowsDeletions={} but rule {} reports {}",
                    allow, rule_id, updated.allows_deletions
                )),
            ));
        }

        Ok(format!(
            "protection rule updated, allowsDeletions is now: {}",
            updated.allows_deletions
        ))
    }

    /// Deletes a ref. Irreversible; a second call on the same ref fails.
    ///
    /// Fails while a protection rule covering the branch forbids deletion.
    pub async fn delete_branch(&self, ref_id: &RefId) -> Result<String, BranchClientError> {
        const OPERATION: &str = "ref";

        info!(repo = %self.repo, ref_id = %ref_id, "deleting ref");

        let variables = DeleteRefVariables {
            input: DeleteRefInput { ref_id },
        };
        let response: DeleteRefResponse = self
            .run(DELETE_REF_MUTATION, variables)
            .await
            .map_err(|e| BranchClientError::mutation(OPERATION, e))?;

        if response.delete_ref.is_none() {
            return Err(BranchClientError::mutation(
                OPERATION,
                GitHubApiError::permanent_without_source(format!("ref {} was not deleted", ref_id)),
            ));
        }

        Ok(format!("Ref {} deleted", ref_id))
    }

    async fn run<V, R>(&self, query: &'static str, variables: V) -> Result<R, GitHubApiError>
    where
        V: serde::Serialize,
        R: DeserializeOwned,
    {
        let request = GraphQlRequest::new(query, variables)?;
        let data = self.transport.execute(request).await?;
        crate::github::decode(data)
    }

    fn missing_repository(&self) -> GitHubApiError {
        GitHubApiError::permanent_without_source(format!("repository {} not found", self.repo))
    }
}
