use std::process::ExitCode;

use anyhow::Context;
use branch_sweeper::config::{SweepMode, SweepOptions};
use branch_sweeper::types::Branch;
use branch_sweeper::{
    BranchClientError, ClientConfig, ConfigError, OctocrabClient, RepositoryBranchClient,
    SweepError,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "branch_sweeper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{:#}", err), "branch sweep failed");
            eprintln!("error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?;
    let options = SweepOptions::from_env()?;

    let transport =
        OctocrabClient::from_config(&config).context("could not initialize GitHub client")?;
    let client = RepositoryBranchClient::new(transport, config.repo.clone());
    tracing::info!(repo = %client.repo(), rule_prefix = %options.rule_prefix, "starting");

    match options.mode {
        SweepMode::Protect => {
            let rule_id = client
                .branch_protection_rule_id(&options.rule_prefix)
                .await
                .context("could not find branch protection rule")?;
            let status = client
                .allow_delete_protected_branch(&rule_id, false)
                .await
                .context("could not modify the branch protection rule")?;
            println!("{}", status);
        }
        SweepMode::Delete {
            branch_prefix,
            limit,
        } => {
            let report = match client
                .sweep_branches(&options.rule_prefix, &branch_prefix, limit)
                .await
            {
                Ok(report) => report,
                Err(err) => {
                    print_deleted(&err.deleted);
                    return Err(anyhow::Error::from(err).context("could not sweep branches"));
                }
            };
            print_deleted(&report.deleted);
            println!(
                "{} branch(es) deleted under {:?}; rule {} restored to allowsDeletions={}",
                report.deleted.len(),
                branch_prefix,
                report.rule.pattern,
                report.rule.allows_deletions
            );
        }
    }

    Ok(())
}

fn print_deleted(branches: &[Branch]) {
    for branch in branches {
        println!("deleted {}", branch);
    }
}

/// Maps a failure to the process exit status.
///
/// 2 configuration, 3 rule not found, 4 query failed, 5 mutation failed,
/// 1 anything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ConfigError>().is_some() {
        return 2;
    }
    let client_err = err
        .downcast_ref::<SweepError>()
        .map(|sweep| &sweep.source)
        .or_else(|| err.downcast_ref::<BranchClientError>());
    match client_err {
        Some(BranchClientError::NotFound { .. }) => 3,
        Some(BranchClientError::Query { .. }) => 4,
        Some(BranchClientError::Mutation { .. }) => 5,
        None => 1,
    }
}
