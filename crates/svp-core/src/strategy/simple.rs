//! Changelog-only releases.

use crate::repository::Repository;
use crate::strategy::{Strategy, StrategyConfig, StrategyResult, UpdateOptions, changelog_update};
use crate::update::Update;

/// Stages only the changelog.
#[derive(Debug, Clone)]
pub struct SimpleStrategy {
    config: StrategyConfig,
}

impl SimpleStrategy {
    /// Strategy writing the changelog at `config.changelog_path`.
    pub const fn new(config: StrategyConfig) -> Self {
        Self { config }
    }
}

impl Strategy for SimpleStrategy {
    fn key(&self) -> &'static str {
        "simple"
    }

    fn determine_updates(
        &self,
        _repo: &dyn Repository,
        options: &UpdateOptions,
    ) -> StrategyResult<Vec<Update>> {
        Ok(vec![changelog_update(&self.config, options)])
    }
}
