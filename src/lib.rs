//! Branch Sweeper - relaxes a GitHub branch protection rule and deletes the
//! branches it covers.
//!
//! The core is [`branches::RepositoryBranchClient`], which maps branch lifecycle
//! intents onto GitHub GraphQL queries and mutations against one repository.

pub mod branches;
pub mod config;
pub mod github;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use branches::{BranchClientError, RepositoryBranchClient, SweepError, SweepReport};
pub use config::{ClientConfig, ConfigError};
pub use github::OctocrabClient;
