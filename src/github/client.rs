//! Octocrab-backed GraphQL transport.
//!
//! `OctocrabClient` is the production [`GraphQlTransport`]: it POSTs each
//! request to GitHub's GraphQL endpoint with bearer-token authentication and
//! unwraps the response envelope.

use octocrab::Octocrab;

use crate::config::ClientConfig;

use super::error::GitHubApiError;
use super::transport::{GraphQlRequest, GraphQlTransport, unwrap_envelope};

/// An authenticated GitHub GraphQL client.
///
/// Carries no repository; operations name the repository in their variables.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
}

impl OctocrabClient {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Creates a client authenticated with a personal access token.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &ClientConfig) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder()
            .personal_token(config.token.expose().to_owned())
            .build()?;
        Ok(Self::new(client))
    }
}

impl GraphQlTransport for OctocrabClient {
    async fn execute(&self, request: GraphQlRequest) -> Result<serde_json::Value, GitHubApiError> {
        let body: serde_json::Value = self
            .client
            .graphql(&request)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        unwrap_envelope(body)
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient").finish_non_exhaustive()
    }
}
