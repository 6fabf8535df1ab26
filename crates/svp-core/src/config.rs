//! Configuration loading and discovery.
//!
//! Configuration is layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. User config from the platform config directory
//! 3. Project config, found by walking up from the working directory
//! 4. Files passed explicitly (`--config`)
//!
//! # Supported formats
//!
//! - TOML (`.toml`)
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! # Config file locations (in order of precedence, highest first):
//! - `.svp.<ext>` in current directory or any parent
//! - `svp.<ext>` in current directory or any parent
//! - `~/.config/svp/config.<ext>` (user config)
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use svp_core::config::ConfigLoader;
//!
//! let cwd = Utf8PathBuf::from(".");
//! let config = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! let settings = config.release_settings();
//! println!("releasing with the {} strategy", settings.strategy);
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::releases::ReleaseOptions;
use crate::strategy::StrategyConfig;

/// Default head branch prefix of release pull requests.
pub const DEFAULT_BRANCH_PREFIX: &str = "release--branches--";
/// Default label of release pull requests awaiting publication.
pub const DEFAULT_LABEL_PENDING: &str = "autorelease: pending";
/// Default label of published release pull requests.
pub const DEFAULT_LABEL_TAGGED: &str = "autorelease: tagged";
/// Default number of tagged release pull requests seen before stopping.
pub const DEFAULT_HISTORY_DEPTH: usize = 10;
/// Default update strategy.
pub const DEFAULT_STRATEGY: &str = "rust";
/// Default changelog location.
pub const DEFAULT_CHANGELOG_PATH: &str = "CHANGELOG.md";

/// The configuration for svp.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// Which repository to release.
    pub repository: Option<RepositoryConfig>,
    /// Release pull request behavior.
    pub release: Option<ReleaseConfig>,
}

/// Which repository to release and from where.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// `owner/name` or a GitHub URL. Defaults to the current directory's repository.
    pub repo: Option<String>,
    /// Branch releases merge into (default: the repository's default branch).
    pub target_branch: Option<String>,
}

/// Release pull request behavior. Unset fields take the defaults above.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Update strategy key (`"rust"` or `"simple"`).
    pub strategy: Option<String>,
    /// Head branch prefix of release pull requests.
    pub branch_prefix: Option<String>,
    /// Label marking a release pull request as awaiting publication.
    pub label_pending: Option<String>,
    /// Label applied once the release is published.
    pub label_tagged: Option<String>,
    /// Tagged release pull requests to see before assuming the rest are released.
    pub history_depth: Option<usize>,
    /// Cap on commits read from the target branch history.
    pub commit_history_depth: Option<usize>,
    /// Repository-relative changelog path.
    pub changelog_path: Option<String>,
}

/// Release settings with every default filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseSettings {
    /// Update strategy key.
    pub strategy: String,
    /// Branch releases merge into, `None` for the remote default branch.
    pub target_branch: Option<String>,
    /// Head branch prefix of release pull requests.
    pub branch_prefix: String,
    /// Label of pending release pull requests.
    pub label_pending: String,
    /// Label of published release pull requests.
    pub label_tagged: String,
    /// Early-exit depth of the release detector.
    pub history_depth: usize,
    /// Cap on commits read from the branch history, `None` for all.
    pub commit_history_depth: Option<usize>,
    /// Changelog path.
    pub changelog_path: String,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Config::default().release_settings()
    }
}

impl ReleaseSettings {
    /// The release pull request head branch for `target_branch`.
    pub fn head_branch(&self, target_branch: &str) -> String {
        format!("{}{target_branch}", self.branch_prefix)
    }

    /// Options for the release detector.
    pub fn release_options(&self) -> ReleaseOptions {
        ReleaseOptions {
            branch_prefix: self.branch_prefix.clone(),
            label_pending: self.label_pending.clone(),
            history_depth: self.history_depth,
        }
    }

    /// Settings passed to the update strategy.
    pub fn strategy_config(&self) -> StrategyConfig {
        StrategyConfig {
            changelog_path: self.changelog_path.clone(),
        }
    }
}

impl Config {
    /// Resolve the release settings, falling back to defaults.
    pub fn release_settings(&self) -> ReleaseSettings {
        let release = self.release.clone().unwrap_or_default();
        let target_branch = self
            .repository
            .as_ref()
            .and_then(|repository| repository.target_branch.clone());

        ReleaseSettings {
            strategy: release
                .strategy
                .unwrap_or_else(|| DEFAULT_STRATEGY.to_string()),
            target_branch,
            branch_prefix: release
                .branch_prefix
                .unwrap_or_else(|| DEFAULT_BRANCH_PREFIX.to_string()),
            label_pending: release
                .label_pending
                .unwrap_or_else(|| DEFAULT_LABEL_PENDING.to_string()),
            label_tagged: release
                .label_tagged
                .unwrap_or_else(|| DEFAULT_LABEL_TAGGED.to_string()),
            history_depth: release.history_depth.unwrap_or(DEFAULT_HISTORY_DEPTH),
            commit_history_depth: release.commit_history_depth,
            changelog_path: release
                .changelog_path
                .unwrap_or_else(|| DEFAULT_CHANGELOG_PATH.to_string()),
        }
    }

    /// The configured repository, if any.
    pub fn repo(&self) -> Option<&str> {
        self.repository.as_ref()?.repo.as_deref()
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
pub const APP_NAME: &str = "svp";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    project_search_root: Option<Utf8PathBuf>,
    include_user_config: bool,
    /// Stop searching when a parent directory contains this entry.
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Loader with user config enabled and a `.git` search boundary.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Walk up from `path` looking for a project config file.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/svp/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Stop the upward search at a directory whose parent holds `marker`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Search all the way to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file. Later files take precedence.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if self.include_user_config
            && let Some(user_config) = self.find_user_config()
        {
            figment = Self::merge_file(figment, &user_config);
        }

        if let Some(ref root) = self.project_search_root
            && let Some(project_config) = self.find_project_config(root)
        {
            figment = Self::merge_file(figment, &project_config);
        }

        for file in &self.explicit_files {
            figment = Self::merge_file(figment, file);
        }

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            log_level = config.log_level.as_str(),
            repo = config.repo(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Like [`load`](Self::load), but fails when no config file exists.
    pub fn load_or_error(self) -> ConfigResult<Config> {
        let has_user = self.include_user_config && self.find_user_config().is_some();
        let has_project = self
            .project_search_root
            .as_ref()
            .and_then(|root| self.find_project_config(root))
            .is_some();
        let has_explicit = !self.explicit_files.is_empty();

        if !has_user && !has_project && !has_explicit {
            return Err(ConfigError::NotFound);
        }

        self.load()
    }

    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
                && dir != start
            {
                break;
            }

            for ext in CONFIG_EXTENSIONS {
                let dotfile = dir.join(format!(".{APP_NAME}.{ext}"));
                if dotfile.is_file() {
                    return Some(dotfile);
                }

                let regular = dir.join(format!("{APP_NAME}.{ext}"));
                if regular.is_file() {
                    return Some(regular);
                }
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        None
    }

    fn find_user_config(&self) -> Option<Utf8PathBuf> {
        let config_dir = user_config_dir()?;
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| config_dir.join(format!("config.{ext}")))
            .find(|path| path.is_file())
    }

    /// Merge a config file into the figment, detecting format from extension.
    fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
        match path.extension() {
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
            Some("json") => figment.merge(Json::file_exact(path.as_str())),
            _ => figment.merge(Toml::file_exact(path.as_str())),
        }
    }
}

/// Find the project config file path without loading it.
pub fn find_project_config<P: AsRef<Utf8Path>>(start: P) -> Option<Utf8PathBuf> {
    ConfigLoader::new()
        .with_project_search(start.as_ref())
        .without_boundary_marker()
        .find_project_config(start.as_ref())
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Get the user config directory path.
///
/// Returns `~/.config/svp/` on Linux, `~/Library/Application Support/svp/`
/// on macOS, and equivalent on other platforms.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}

/// Get the local data directory path (machine-specific, not synced).
///
/// Log files default to a `logs` directory under it.
pub fn user_data_local_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.data_local_dir().to_path_buf()).ok()
}
