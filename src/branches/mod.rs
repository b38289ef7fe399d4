//! Branch lifecycle management for one repository.
//!
//! `RepositoryBranchClient` resolves branch protection rules by pattern prefix,
//! flips their `allowsDeletions` setting, lists branches and deletes refs. All
//! traffic goes through a `GraphQlTransport`.

mod client;
mod error;
mod sweep;

pub use client::{MAX_RULE_PAGES, RULE_PAGE_SIZE, RepositoryBranchClient};
pub use error::BranchClientError;
pub use sweep::{SweepError, SweepReport};
