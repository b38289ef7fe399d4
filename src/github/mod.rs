//! GitHub GraphQL transport.
//!
//! Key features:
//! - A `GraphQlTransport` seam so the branch client can run against fakes
//! - An octocrab-backed implementation with bearer-token authentication
//! - Errors classified as transient or permanent

mod client;
mod error;
pub(crate) mod queries;
mod transport;

pub use client::OctocrabClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use transport::{GraphQlRequest, GraphQlTransport};
pub(crate) use transport::decode;
