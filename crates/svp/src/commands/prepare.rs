//! Prepare command: open or refresh the release pull request.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use svp_core::config::Config;
use svp_core::prepare::{PrepareOptions, PrepareOutcome, ReleasePlan, prepare_release};
use svp_core::reconcile::Reconciliation;

use super::{open_repository, release_settings, spinner};

/// Arguments for the `prepare` subcommand.
#[derive(Args, Debug, Default)]
pub struct PrepareArgs {
    /// Repository as OWNER/NAME (default: config, then the current directory)
    #[arg(long, value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// Branch releases merge into (default: the repository's default branch)
    #[arg(long, value_name = "BRANCH")]
    pub target_branch: Option<String>,

    /// Update strategy (rust, simple)
    #[arg(long, value_name = "KEY")]
    pub strategy: Option<String>,

    /// Date written in the changelog heading (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Show the planned release without touching the repository
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the prepare command.
#[instrument(name = "cmd_prepare", skip_all)]
pub fn cmd_prepare(args: PrepareArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(
        json_output = global_json,
        dry_run = args.dry_run,
        "executing prepare command"
    );

    let settings = release_settings(config, args.target_branch, args.strategy);
    let repo = open_repository(args.repo.as_deref(), config)?;
    let options = PrepareOptions {
        dry_run: args.dry_run,
        release_date: args.date,
    };

    let progress = spinner(
        &format!("Planning release for {}...", repo.full_name()),
        global_json,
    );
    let outcome = prepare_release(&repo, &settings, options);
    progress.finish_and_clear();
    let outcome = outcome.context("release preparation failed")?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match &outcome {
        PrepareOutcome::NothingToRelease {
            target_branch,
            previous_release,
        } => {
            println!(
                "{} Nothing to release on {} since {}",
                "○".yellow(),
                target_branch.cyan(),
                previous_release.to_string().dimmed(),
            );
        }
        PrepareOutcome::Planned { plan } => {
            println!("\n{}", "DRY RUN: no changes were made".yellow().bold());
            print_plan(plan);
            println!("\n{}", plan.changelog.trim_end());
        }
        PrepareOutcome::Reconciled { plan, result } => {
            print_plan(plan);
            let (verb, pr) = match result {
                Reconciliation::Created(pr) => ("Opened", pr),
                Reconciliation::Updated(pr) => ("Updated", pr),
                Reconciliation::Unchanged(pr) => ("Unchanged", pr),
            };
            println!(
                "\n{} {} #{} {}",
                "✓".green().bold(),
                verb,
                pr.number,
                pr.permalink.cyan(),
            );
        }
    }

    Ok(())
}

fn print_plan(plan: &ReleasePlan) {
    println!(
        "\n{}: {} → {} ({})",
        "Release".bold(),
        plan.previous_release.to_string().dimmed(),
        plan.version.to_string().green().bold(),
        plan.bump,
    );
    println!(
        "{}: {} | {}: {}",
        "Branch".dimmed(),
        plan.target_branch,
        "Commits".dimmed(),
        plan.commits,
    );
    println!(
        "{}: {}",
        "Pull request".dimmed(),
        plan.pull_request.title.cyan()
    );
    for file in &plan.files {
        println!("  {} {}", "•".dimmed(), file);
    }
}
