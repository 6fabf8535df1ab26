//! Logging setup.
//!
//! Events go to a compact stderr layer for whoever runs `svp` and, when a
//! log location resolves, to a daily-rolled JSONL file that keeps span
//! fields (`cmd_prepare`, `prepare_release`, ...) for later inspection.
//! Stdout stays reserved for command output, including `--json`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::Layer as _;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "SVP_LOG_PATH";
const ENV_LOG_DIR: &str = "SVP_LOG_DIR";
const LOG_FILE_NAME: &str = concat!(env!("CARGO_PKG_NAME"), ".jsonl");

/// Location of the JSONL log. Files roll daily, so `file_name` is a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Directory holding the log files.
    pub dir: PathBuf,
    /// File name prefix.
    pub file_name: String,
}

impl LogFile {
    /// Resolve the log location.
    ///
    /// Precedence: `SVP_LOG_PATH`, `SVP_LOG_DIR`, the configured `log_dir`,
    /// then `logs/` under the user's local data directory.
    pub fn resolve(config_dir: Option<&Path>) -> Option<Self> {
        resolve_with(
            std::env::var_os(ENV_LOG_PATH).map(PathBuf::from),
            std::env::var_os(ENV_LOG_DIR).map(PathBuf::from),
            config_dir.map(Path::to_path_buf),
            svp_core::config::user_data_local_dir().map(|dir| dir.into_std_path_buf().join("logs")),
        )
    }

    fn open(&self) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create log directory {}", self.dir.display()))?;
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(self.file_name.clone())
            .build(&self.dir)
            .with_context(|| format!("failed to open log file in {}", self.dir.display()))?;
        Ok(tracing_appender::non_blocking(appender))
    }
}

fn resolve_with(
    path_override: Option<PathBuf>,
    dir_override: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    default_dir: Option<PathBuf>,
) -> Option<LogFile> {
    if let Some(path) = path_override {
        let file_name = path.file_name()?.to_str()?.to_string();
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        return Some(LogFile { dir, file_name });
    }

    dir_override
        .or(config_dir)
        .or(default_dir)
        .map(|dir| LogFile {
            dir,
            file_name: LOG_FILE_NAME.to_string(),
        })
}

/// Keeps the file writer flushing until dropped at the end of `main`.
pub struct ObservabilityGuard {
    _log_guard: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// A log file that cannot be opened disables file logging with a warning;
/// it never stops the command.
pub fn init_observability(
    log_file: Option<&LogFile>,
    env_filter: EnvFilter,
    console_level: LevelFilter,
) -> anyhow::Result<ObservabilityGuard> {
    let (writer, guard, failure) = match log_file.map(LogFile::open).transpose() {
        Ok(Some((writer, guard))) => (Some(writer), Some(guard), None),
        Ok(None) => (None, None, None),
        Err(err) => (None, None, Some(err)),
    };

    let file_layer = writer.map(|writer| {
        fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(false)
            .flatten_event(true)
            .with_writer(writer)
    });
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .with_filter(console_level);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    match (failure, log_file) {
        (Some(err), _) => tracing::warn!(error = %format!("{err:#}"), "file logging disabled"),
        (None, Some(file)) => tracing::debug!(dir = %file.dir.display(), "logging to file"),
        (None, None) => tracing::debug!("no log directory available"),
    }

    Ok(ObservabilityGuard { _log_guard: guard })
}

/// Level of events echoed to stderr.
///
/// Warnings and errors by default, errors only with `--quiet`, and
/// everything the file log gets with `-v`.
pub const fn console_level(quiet: bool, verbose: u8) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    }
}

/// Filter shared by both layers.
///
/// Priority: `--quiet` > `-v` > `RUST_LOG` > configured `log_level`.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    match (quiet, verbose) {
        (true, _) => EnvFilter::new("error"),
        (false, 0) => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
        }
        (false, 1) => EnvFilter::new("debug"),
        (false, _) => EnvFilter::new("trace"),
    }
}
