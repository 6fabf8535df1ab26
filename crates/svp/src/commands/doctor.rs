//! Doctor command: diagnose configuration and environment.

use std::process::Command;

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use svp_core::config;

/// Arguments for the `doctor` subcommand.
#[derive(Args, Debug, Default)]
pub struct DoctorArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct DoctorReport {
    gh: GhStatus,
    directories: DirectoryPaths,
    config: ConfigStatus,
    environment: EnvironmentInfo,
}

#[derive(Serialize)]
struct GhStatus {
    /// Path to the `gh` executable, if found on PATH
    path: Option<String>,
    /// Whether `gh auth status` succeeded
    authenticated: bool,
}

#[derive(Serialize)]
struct DirectoryPaths {
    config: Option<String>,
    data_local: Option<String>,
}

#[derive(Serialize)]
struct ConfigStatus {
    /// Path to loaded config file, if any
    file: Option<String>,
    /// Whether a config file was found
    found: bool,
}

#[derive(Serialize)]
struct EnvironmentInfo {
    /// Current working directory
    cwd: Option<String>,
    /// Relevant environment variables
    env_vars: Vec<EnvVar>,
}

#[derive(Serialize)]
struct EnvVar {
    name: &'static str,
    /// Token values are reported as set, never printed.
    value: Option<String>,
    description: &'static str,
}

const ENV_VARS: &[(&str, &str, bool)] = &[
    ("GH_TOKEN", "GitHub token used by gh", true),
    ("GITHUB_TOKEN", "GitHub token used by gh when GH_TOKEN is unset", true),
    ("GH_HOST", "GitHub host used by gh", false),
    ("XDG_CONFIG_HOME", "Override config directory", false),
    ("SVP_LOG_DIR", "Log directory", false),
    ("SVP_LOG_PATH", "Explicit log file path", false),
    ("RUST_LOG", "Log filter directive", false),
];

impl GhStatus {
    fn probe() -> Self {
        let path = which::which("gh").ok();
        let authenticated = path.as_ref().is_some_and(|gh| {
            Command::new(gh)
                .args(["auth", "status"])
                .output()
                .is_ok_and(|output| output.status.success())
        });
        Self {
            path: path.map(|p| p.display().to_string()),
            authenticated,
        }
    }
}

impl DoctorReport {
    fn gather(cwd: &camino::Utf8Path) -> Self {
        let config_file = config::find_project_config(cwd);

        Self {
            gh: GhStatus::probe(),
            directories: DirectoryPaths {
                config: config::user_config_dir().map(|p| p.to_string()),
                data_local: config::user_data_local_dir().map(|p| p.to_string()),
            },
            config: ConfigStatus {
                found: config_file.is_some(),
                file: config_file.map(|p| p.to_string()),
            },
            environment: EnvironmentInfo {
                cwd: Some(cwd.to_string()),
                env_vars: ENV_VARS
                    .iter()
                    .map(|&(name, description, secret)| EnvVar {
                        name,
                        value: std::env::var(name)
                            .ok()
                            .map(|value| if secret { "(set)".into() } else { value }),
                        description,
                    })
                    .collect(),
            },
        }
    }
}

/// Run diagnostics and report configuration status.
#[instrument(name = "cmd_doctor", skip_all, fields(json_output))]
pub fn cmd_doctor(
    _args: DoctorArgs,
    global_json: bool,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing doctor command");

    let progress = super::spinner("Gathering diagnostics...", global_json);
    let report = DoctorReport::gather(cwd);
    progress.finish_and_clear();

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "GitHub CLI".bold().underline());
    match report.gh.path {
        Some(ref path) => println!("  {} gh: {}", "✓".green(), path.cyan()),
        None => println!("  {} gh not found on PATH", "✗".red()),
    }
    if report.gh.authenticated {
        println!("  {} Authenticated", "✓".green());
    } else {
        println!("  {} Not authenticated (run `gh auth login`)", "○".yellow());
    }
    println!();

    println!("{}", "Configuration".bold().underline());
    match report.config.file {
        Some(ref file) if report.config.found => {
            println!("  {} Config file: {}", "✓".green(), file.cyan());
        }
        _ => println!("  {} No config file found, using defaults", "○".yellow()),
    }
    println!();

    println!("{}", "Directories".bold().underline());
    print_dir("  Config", report.directories.config.as_deref());
    print_dir("  Data (local)", report.directories.data_local.as_deref());
    println!();

    println!("{}", "Environment".bold().underline());
    println!("  {}: {}", "Working directory".dimmed(), cwd.cyan());
    let set_vars: Vec<_> = report
        .environment
        .env_vars
        .iter()
        .filter(|v| v.value.is_some())
        .collect();
    if set_vars.is_empty() {
        println!("  {} No GitHub/logging overrides set", "○".dimmed());
    } else {
        for var in set_vars {
            println!(
                "  {}: {}",
                var.name.dimmed(),
                var.value.as_deref().unwrap_or("").cyan()
            );
        }
    }

    Ok(())
}

fn print_dir(label: &str, path: Option<&str>) {
    print!("{}: ", label.dimmed());
    match path {
        Some(p) => println!("{}", p.cyan()),
        None => println!("{}", "(unavailable)".yellow()),
    }
}
