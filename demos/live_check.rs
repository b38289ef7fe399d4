//! Manual check of the branch client against a real repository.
//!
//! # Usage
//!
//! 1. Set `GITHUB_TOKEN` to a token with `repo` scope (or a fine-grained token
//!    with Administration and Contents read/write).
//!
//! 2. Set `TEST_REPO` to the repository to test against (e.g. `owner/repo`).
//!
//! 3. Optionally set `TEST_RULE_PREFIX` (default `release/`).
//!
//! 4. Run: `cargo run --example live_check`
//!
//! Only reads are performed unless `TEST_MUTATE=1`, in which case the matched
//! rule's `allowsDeletions` is flipped and then put back. Branches are never
//! deleted.

use std::env;
use std::num::NonZeroU32;

use branch_sweeper::config::{AccessToken, ClientConfig};
use branch_sweeper::types::RepoId;
use branch_sweeper::{OctocrabClient, RepositoryBranchClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,branch_sweeper=debug".into()),
        )
        .init();

    let token = env::var("GITHUB_TOKEN")
        .map_err(|_| anyhow::anyhow!("GITHUB_TOKEN environment variable not set"))?;

    let test_repo = env::var("TEST_REPO").map_err(|_| {
        anyhow::anyhow!("TEST_REPO environment variable not set (e.g., owner/repo)")
    })?;
    let test_repo = test_repo
        .strip_prefix("https://github.com/")
        .or_else(|| test_repo.strip_prefix("github.com/"))
        .unwrap_or(&test_repo);
    let (owner, repo) = test_repo
        .split_once('/')
        .ok_or_else(|| anyhow::anyhow!("TEST_REPO must be in owner/repo format"))?;

    let rule_prefix = env::var("TEST_RULE_PREFIX").unwrap_or_else(|_| "release/".to_string());
    let mutate = env::var("TEST_MUTATE").is_ok_and(|v| v == "1");

    let config = ClientConfig::new(RepoId::new(owner, repo), AccessToken::new(token));
    let transport = OctocrabClient::from_config(&config)?;
    let client = RepositoryBranchClient::new(transport, config.repo.clone());

    println!("\n=== Branch Sweeper Live Check ===\n");
    println!("Repository: {}", client.repo());
    println!("Rule prefix: {}\n", rule_prefix);

    let mut passed = 0;
    let mut failed = 0;
    let mut skipped = 0;

    let limit = NonZeroU32::new(5).unwrap_or(NonZeroU32::MIN);
    match client.get_branches(&rule_prefix, limit).await {
        Ok(branches) => {
            println!("  [PASS] get_branches ({} found)", branches.len());
            for branch in &branches {
                println!("         {}", branch);
            }
            passed += 1;
        }
        Err(e) => {
            println!("  [FAIL] get_branches: {}", e);
            failed += 1;
        }
    }

    let rule = match client.find_branch_protection_rule(&rule_prefix).await {
        Ok(rule) => {
            println!(
                "  [PASS] find_branch_protection_rule ({} -> {}, allowsDeletions={})",
                rule.pattern, rule.id, rule.allows_deletions
            );
            passed += 1;
            Some(rule)
        }
        Err(e) => {
            println!("  [FAIL] find_branch_protection_rule: {}", e);
            failed += 1;
            None
        }
    };

    match (&rule, mutate) {
        (Some(rule), true) => {
            let flipped = client
                .allow_delete_protected_branch(&rule.id, !rule.allows_deletions)
                .await;
            let restored = client
                .allow_delete_protected_branch(&rule.id, rule.allows_deletions)
                .await;
            match (flipped, restored) {
                (Ok(_), Ok(status)) => {
                    println!("  [PASS] allow_delete_protected_branch ({})", status);
                    passed += 1;
                }
                (Err(e), _) | (_, Err(e)) => {
                    println!("  [FAIL] allow_delete_protected_branch: {}", e);
                    failed += 1;
                }
            }
        }
        _ => {
            println!(
                "  [SKIP] allow_delete_protected_branch (set TEST_MUTATE=1 with a matching rule)"
            );
            skipped += 1;
        }
    }

    println!("\n=== Summary ===");
    println!("Passed: {}, Failed: {}, Skipped: {}", passed, failed, skipped);

    if failed > 0 {
        anyhow::bail!("{} check(s) failed", failed);
    }
    Ok(())
}
