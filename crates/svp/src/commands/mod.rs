//! Command implementations

pub mod doctor;

pub mod info;

pub mod prepare;

pub mod release;

use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use svp_core::config::{Config, ReleaseSettings};

use crate::github::GhRepository;

/// Resolve the repository to operate on.
///
/// Precedence: `--repo`, then `repository.repo` from config, then whatever
/// `gh` reports for the working directory.
pub fn open_repository(repo_arg: Option<&str>, config: &Config) -> anyhow::Result<GhRepository> {
    let repo = match repo_arg.or_else(|| config.repo()) {
        Some(spec) => GhRepository::from_spec(spec)
            .with_context(|| format!("invalid repository '{spec}', expected OWNER/NAME"))?,
        None => GhRepository::detect().context("could not determine the GitHub repository")?,
    };
    debug!(repo = %repo.full_name(), "using repository");
    Ok(repo)
}

/// Release settings from config with command-line overrides applied.
pub fn release_settings(
    config: &Config,
    target_branch: Option<String>,
    strategy: Option<String>,
) -> ReleaseSettings {
    let mut settings = config.release_settings();
    if target_branch.is_some() {
        settings.target_branch = target_branch;
    }
    if let Some(strategy) = strategy {
        settings.strategy = strategy;
    }
    settings
}

/// A steadily ticking spinner, hidden when output is JSON.
pub fn spinner(message: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
