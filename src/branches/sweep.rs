//! Temporarily relax a protection rule and delete the branches it covers.
//!
//! Deleting a protected branch needs its rule to allow deletions first.
//! `sweep_branches` ties the two together: the rule is relaxed only while
//! deletions run, and its prior `allowsDeletions` value is written back on every
//! exit path once it has been changed.

use std::num::NonZeroU32;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::github::GraphQlTransport;
use crate::types::{Branch, BranchProtectionRule};

use super::client::RepositoryBranchClient;
use super::error::BranchClientError;

/// Outcome of a completed sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// The rule as it was before the sweep.
    pub rule: BranchProtectionRule,
    /// Branches deleted, in deletion order.
    pub deleted: Vec<Branch>,
}

/// A sweep that stopped early.
///
/// Deletions cannot be undone, so the branches removed before the failure are
/// carried alongside the cause.
#[derive(Debug, Error)]
#[error("sweep stopped after deleting {} branch(es)", .deleted.len())]
pub struct SweepError {
    /// Branches deleted before the failure, in deletion order.
    pub deleted: Vec<Branch>,
    #[source]
    pub source: BranchClientError,
}

impl SweepError {
    fn before_deleting(source: BranchClientError) -> Self {
        SweepError {
            deleted: Vec::new(),
            source,
        }
    }
}

impl<T: GraphQlTransport> RepositoryBranchClient<T> {
    /// Deletes up to `limit` branches under `branch_prefix`, relaxing the rule
    /// matched by `rule_prefix` for the duration.
    ///
    /// Stops at the first failed deletion. If the rule already allowed
    /// deletions it is never touched. When there is nothing to delete the rule
    /// is left alone as well. Once a relax has been attempted the prior value
    /// is written back, even if the relax itself failed.
    pub async fn sweep_branches(
        &self,
        rule_prefix: &str,
        branch_prefix: &str,
        limit: NonZeroU32,
    ) -> Result<SweepReport, SweepError> {
        let rule = self
            .find_branch_protection_rule(rule_prefix)
            .await
            .map_err(SweepError::before_deleting)?;
        let branches = self
            .get_branches(branch_prefix, limit)
            .await
            .map_err(SweepError::before_deleting)?;

        if branches.is_empty() {
            info!(prefix = branch_prefix, "no branches to sweep");
            return Ok(SweepReport {
                rule,
                deleted: Vec::new(),
            });
        }

        let relax = !rule.allows_deletions;
        let (deleted, outcome) = if relax {
            match self.allow_delete_protected_branch(&rule.id, true).await {
                Ok(_) => self.delete_in_order(branches).await,
                Err(err) => (Vec::new(), Err(err)),
            }
        } else {
            self.delete_in_order(branches).await
        };

        // An update that timed out may still have been applied.
        let restored = if relax {
            self.allow_delete_protected_branch(&rule.id, rule.allows_deletions)
                .await
                .map(|_| ())
        } else {
            Ok(())
        };

        match (outcome, restored) {
            (Ok(()), Ok(())) => Ok(SweepReport { rule, deleted }),
            (Ok(()), Err(restore_err)) => {
                warn!(
                    rule_id = %rule.id,
                    deleted = deleted.len(),
                    "branches were deleted but protection could not be restored"
                );
                Err(SweepError {
                    deleted,
                    source: restore_err,
                })
            }
            (Err(sweep_err), Ok(())) => Err(SweepError {
                deleted,
                source: sweep_err,
            }),
            (Err(sweep_err), Err(restore_err)) => {
                error!(
                    rule_id = %rule.id,
                    error = %restore_err,
                    "could not restore allowsDeletions after a failed sweep; rule may still be relaxed"
                );
                Err(SweepError {
                    deleted,
                    source: sweep_err,
                })
            }
        }
    }

    /// Deletes `branches` in order, stopping at the first failure.
    ///
    /// Returns the branches actually deleted together with the outcome.
    async fn delete_in_order(
        &self,
        branches: Vec<Branch>,
    ) -> (Vec<Branch>, Result<(), BranchClientError>) {
        let mut deleted = Vec::with_capacity(branches.len());
        for branch in branches {
            if let Err(err) = self.delete_branch(&branch.id).await {
                return (deleted, Err(err));
            }
            info!(branch = %branch.name, "deleted branch");
            deleted.push(branch);
        }
        (deleted, Ok(()))
    }
}
