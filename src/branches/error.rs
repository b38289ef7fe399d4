//! Branch client error taxonomy.

use thiserror::Error;

use crate::github::GitHubApiError;

/// Failure of a `RepositoryBranchClient` operation.
#[derive(Debug, Error)]
pub enum BranchClientError {
    /// A read could not complete (network, auth, malformed query, unknown repository).
    #[error("failed to query {operation}: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: GitHubApiError,
    },

    /// The read succeeded but no branch protection rule matched.
    #[error(
        "could not find branch protection rule with prefix {prefix:?}, \
         check the repository's branch protection settings"
    )]
    NotFound { prefix: String },

    /// A write failed (unknown ID, insufficient permission, protection conflict).
    #[error("failed to mutate {operation}: {source}")]
    Mutation {
        operation: &'static str,
        #[source]
        source: GitHubApiError,
    },
}

impl BranchClientError {
    pub(crate) fn query(operation: &'static str, source: GitHubApiError) -> Self {
        BranchClientError::Query { operation, source }
    }

    pub(crate) fn mutation(operation: &'static str, source: GitHubApiError) -> Self {
        BranchClientError::Mutation { operation, source }
    }

    /// Returns true if repeating the operation may succeed.
    ///
    /// `NotFound` is never retriable: the lookup itself worked.
    pub fn is_retriable(&self) -> bool {
        match self {
            BranchClientError::Query { source, .. }
            | BranchClientError::Mutation { source, .. } => source.is_retriable(),
            BranchClientError::NotFound { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_operation_and_cause() {
        let err = BranchClientError::query(
            "branches",
            GitHubApiError::permanent_without_source("Bad credentials"),
        );
        assert_eq!(
            err.to_string(),
            "failed to query branches: GitHub API error: Bad credentials"
        );

        let err = BranchClientError::mutation(
            "ref",
            GitHubApiError::permanent_without_source("Could not resolve to a node"),
        );
        assert!(err.to_string().starts_with("failed to mutate ref: "));
    }

    #[test]
    fn not_found_points_at_settings() {
        let err = BranchClientError::NotFound {
            prefix: "nightly/".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("\"nightly/\""));
        assert!(message.contains("branch protection settings"));
        assert!(!err.is_retriable());
    }

    #[test]
    fn retriability_follows_transport_error() {
        let transient = BranchClientError::query(
            "branches",
            GitHubApiError::transient_without_source("connection reset"),
        );
        assert!(transient.is_retriable());

        let permanent = BranchClientError::mutation(
            "ref",
            GitHubApiError::permanent_without_source("not found"),
        );
        assert!(!permanent.is_retriable());

        let not_found = BranchClientError::NotFound {
            prefix: "x".to_string(),
        };
        assert!(!not_found.is_retriable());
    }
}
