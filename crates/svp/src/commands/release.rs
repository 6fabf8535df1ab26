//! Release command: publish merged release pull requests.

use anyhow::Context;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use svp_core::config::Config;
use svp_core::publish::{PublishedRelease, publish_releases};

use super::{open_repository, release_settings, spinner};

/// Arguments for the `release` subcommand.
#[derive(Args, Debug, Default)]
pub struct ReleaseArgs {
    /// Repository as OWNER/NAME (default: config, then the current directory)
    #[arg(long, value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// Branch releases merge into (default: the repository's default branch)
    #[arg(long, value_name = "BRANCH")]
    pub target_branch: Option<String>,

    /// List the releases that would be created without creating them
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the release command.
#[instrument(name = "cmd_release", skip_all)]
pub fn cmd_release(args: ReleaseArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(
        json_output = global_json,
        dry_run = args.dry_run,
        "executing release command"
    );

    let settings = release_settings(config, args.target_branch, None);
    let repo = open_repository(args.repo.as_deref(), config)?;

    let progress = spinner(
        &format!("Looking for merged releases in {}...", repo.full_name()),
        global_json,
    );
    let published = publish_releases(&repo, &settings, args.dry_run);
    progress.finish_and_clear();
    let published = published.context("publishing releases failed")?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&published)?);
        return Ok(());
    }

    if published.is_empty() {
        println!("{} No merged release pull requests to publish", "○".yellow());
        return Ok(());
    }

    if args.dry_run {
        println!("\n{}", "DRY RUN: no changes were made".yellow().bold());
    }
    for outcome in &published {
        let release = outcome.release();
        match outcome {
            PublishedRelease::Created { created, .. } => println!(
                "{} Released {} {}",
                "✓".green().bold(),
                release.tag.green().bold(),
                created.url.cyan(),
            ),
            PublishedRelease::AlreadyReleased { .. } => println!(
                "{} {} already released",
                "–".yellow(),
                release.tag.bold(),
            ),
            PublishedRelease::Pending { .. } => println!(
                "{} Would release {} from #{} at {}",
                "○".green(),
                release.tag.bold(),
                release.pull_request_number,
                release.sha.dimmed(),
            ),
        }
    }

    Ok(())
}
