//! The GraphQL transport seam.
//!
//! `RepositoryBranchClient` only ever talks to GitHub through
//! [`GraphQlTransport`]. The production implementation is `OctocrabClient`;
//! tests substitute in-memory fakes.

use std::future::Future;

use serde::{Deserialize, Serialize};

use super::error::{GitHubApiError, is_rate_limit_error};

/// A GraphQL document plus its variables, as POSTed to the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: serde_json::Value,
}

impl GraphQlRequest {
    pub fn new(query: &'static str, variables: impl Serialize) -> Result<Self, GitHubApiError> {
        let variables = serde_json::to_value(variables).map_err(|e| {
            GitHubApiError::permanent_without_source(format!(
                "could not encode GraphQL variables: {}",
                e
            ))
        })?;
        Ok(Self { query, variables })
    }
}

/// Executes GraphQL requests against GitHub.
///
/// Implementations perform exactly one round trip per call and return the
/// response's `data` member. GraphQL-level errors (the `errors` array) must be
/// turned into `Err`.
pub trait GraphQlTransport {
    fn execute(
        &self,
        request: GraphQlRequest,
    ) -> impl Future<Output = Result<serde_json::Value, GitHubApiError>> + Send;
}

/// Decodes a transport result into a typed response shape.
pub(crate) fn decode<T>(data: serde_json::Value) -> Result<T, GitHubApiError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(data).map_err(|e| {
        GitHubApiError::permanent_without_source(format!(
            "unexpected GraphQL response shape: {}",
            e
        ))
    })
}

/// The top-level GraphQL response body.
#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// Unwraps a raw GraphQL response body into its `data` member.
///
/// GitHub answers most GraphQL failures with HTTP 200 and an `errors` array
/// (sometimes alongside partial `data`). Any reported error fails the whole
/// request.
pub(crate) fn unwrap_envelope(
    body: serde_json::Value,
) -> Result<serde_json::Value, GitHubApiError> {
    let envelope: GraphQlEnvelope = serde_json::from_value(body).map_err(|e| {
        GitHubApiError::permanent_without_source(format!("malformed GraphQL response: {}", e))
    })?;

    if !envelope.errors.is_empty() {
        let message = envelope
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        let rate_limited = envelope.errors.iter().any(|e| {
            e.error_type.as_deref().is_some_and(is_rate_limit_error)
                || is_rate_limit_error(&e.message)
        });

        return Err(if rate_limited {
            GitHubApiError::transient_without_source(message)
        } else {
            GitHubApiError::permanent_without_source(message)
        });
    }

    envelope
        .data
        .ok_or_else(|| GitHubApiError::permanent_without_source("GraphQL response carried no data"))
}
