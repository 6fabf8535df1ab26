//! Per-ecosystem release edits.
//!
//! A [`Strategy`] turns the decided version and changelog entry into the
//! list of file [`Update`]s staged on the release pull request. Strategies
//! are looked up by key in a static registry.

use thiserror::Error;

use crate::repository::{Repository, RepositoryError};
use crate::update::{Update, UpdateError};
use crate::updaters::ChangelogUpdater;
use crate::version::Version;

pub mod rust;
pub mod simple;

pub use rust::RustStrategy;
pub use simple::SimpleStrategy;

/// Errors from strategy lookup and update planning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// No strategy is registered under this key.
    #[error("invalid strategy '{0}'")]
    Unknown(String),

    /// A file the strategy needs could not be read.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A file the strategy needs could not be parsed.
    #[error(transparent)]
    Update(#[from] UpdateError),
}

/// Result alias for strategy operations.
pub type StrategyResult<T> = Result<T, StrategyError>;

/// Inputs to [`Strategy::determine_updates`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Rendered changelog entry for the release.
    pub changelog_entry: String,
    /// Version being released.
    pub release_version: Version,
    /// Branch the release merges into.
    pub target_branch: String,
}

/// Settings shared by every strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyConfig {
    /// Repository-relative path of the changelog.
    pub changelog_path: String,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            changelog_path: "CHANGELOG.md".to_string(),
        }
    }
}

/// Plans the file edits of a release.
pub trait Strategy {
    /// Registry key of this strategy.
    fn key(&self) -> &'static str;

    /// The ordered edits for a release described by `options`.
    fn determine_updates(
        &self,
        repo: &dyn Repository,
        options: &UpdateOptions,
    ) -> StrategyResult<Vec<Update>>;
}

type StrategyBuilder = fn(StrategyConfig) -> Box<dyn Strategy>;

fn rust_strategy(config: StrategyConfig) -> Box<dyn Strategy> {
    Box::new(RustStrategy::new(config))
}

fn simple_strategy(config: StrategyConfig) -> Box<dyn Strategy> {
    Box::new(SimpleStrategy::new(config))
}

static STRATEGIES: &[(&str, StrategyBuilder)] = &[("rust", rust_strategy), ("simple", simple_strategy)];

/// Registered strategy keys, sorted.
pub fn strategy_types() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = STRATEGIES.iter().map(|(key, _)| *key).collect();
    keys.sort_unstable();
    keys
}

/// Build the strategy registered under `key`.
pub fn build_strategy(key: &str, config: StrategyConfig) -> StrategyResult<Box<dyn Strategy>> {
    STRATEGIES
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, builder)| builder(config))
        .ok_or_else(|| StrategyError::Unknown(key.to_string()))
}

/// The changelog edit every strategy starts with.
pub(crate) fn changelog_update(config: &StrategyConfig, options: &UpdateOptions) -> Update {
    Update {
        path: config.changelog_path.clone(),
        create_if_missing: true,
        updater: Box::new(ChangelogUpdater::new(options.changelog_entry.clone())),
    }
}
