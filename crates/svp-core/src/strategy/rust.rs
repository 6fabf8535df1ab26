//! Cargo packages: changelog, `Cargo.toml` and `Cargo.lock`.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::repository::Repository;
use crate::strategy::{Strategy, StrategyConfig, StrategyResult, UpdateOptions, changelog_update};
use crate::update::Update;
use crate::updaters::cargo::package_name;
use crate::updaters::{CargoLock, CargoToml};

const MANIFEST_PATH: &str = "Cargo.toml";
const LOCKFILE_PATH: &str = "Cargo.lock";

/// Releases a single Cargo package at the repository root.
#[derive(Debug, Clone)]
pub struct RustStrategy {
    config: StrategyConfig,
}

impl RustStrategy {
    /// Strategy writing the changelog at `config.changelog_path`.
    pub const fn new(config: StrategyConfig) -> Self {
        Self { config }
    }
}

impl Strategy for RustStrategy {
    fn key(&self) -> &'static str {
        "rust"
    }

    fn determine_updates(
        &self,
        repo: &dyn Repository,
        options: &UpdateOptions,
    ) -> StrategyResult<Vec<Update>> {
        let mut updates = vec![
            changelog_update(&self.config, options),
            Update {
                path: MANIFEST_PATH.to_string(),
                create_if_missing: false,
                updater: Box::new(CargoToml::new(options.release_version.clone())),
            },
        ];

        let manifest = repo.file_contents(MANIFEST_PATH, &options.target_branch)?;
        let mut versions = BTreeMap::new();
        match package_name(&manifest)? {
            Some(name) => {
                debug!(package = %name, version = %options.release_version, "releasing package");
                versions.insert(name, options.release_version.clone());
            }
            None => warn!("Cargo.toml declares no package name, lockfile left as is"),
        }

        updates.push(Update {
            path: LOCKFILE_PATH.to_string(),
            create_if_missing: false,
            updater: Box::new(CargoLock::new(versions)),
        });

        Ok(updates)
    }
}
