//! Core library for svp.
//!
//! Plans releases from a remote repository's merged history and stages them
//! as a single release pull request. All remote access goes through the
//! [`Repository`] trait; this crate never touches a local checkout.
//!
//! # Modules
//!
//! - [`version`] - Semantic version values and tag parsing
//! - [`versioning`] - Bump-level decisions from pull request labels
//! - [`changelog`] - Changelog entry rendering
//! - [`context`] - Previous release and unreleased commits
//! - [`releases`] - Merged release pull requests awaiting a tag
//! - [`body`] - The release pull request body envelope
//! - [`update`] / [`updaters`] - File edits staged on the pull request
//! - [`strategy`] - Per-ecosystem update planning
//! - [`reconcile`] - Create or refresh the pending release pull request
//! - [`prepare`] / [`publish`] - The two top-level workflows
//! - [`config`] - Configuration loading and management
//!
//! # Quick Start
//!
//! ```no_run
//! use svp_core::{ConfigLoader, PrepareOptions, Repository, prepare_release};
//!
//! fn run(repo: &dyn Repository) {
//!     let config = ConfigLoader::new().load().expect("Failed to load configuration");
//!     let outcome = prepare_release(repo, &config.release_settings(), PrepareOptions::default());
//!     println!("{outcome:?}");
//! }
//! ```
#![deny(unsafe_code)]

pub mod body;

pub mod changelog;

pub mod config;

pub mod context;

pub mod error;

pub mod model;

pub mod pagination;

pub mod prepare;

pub mod publish;

pub mod reconcile;

pub mod releases;

pub mod repository;

pub mod strategy;

pub mod update;

pub mod updaters;

pub mod version;

pub mod versioning;

#[cfg(test)]
mod testing;

pub use config::{Config, ConfigLoader, LogLevel, ReleaseSettings};

pub use error::{ConfigError, ConfigResult};

pub use model::{
    Commit, CreatedRelease, PullRequest, PullRequestDraft, PullRequestState, Release, Tag,
};

pub use pagination::{Page, Paginated};

pub use prepare::{PrepareError, PrepareOptions, PrepareOutcome, ReleasePlan, prepare_release};

pub use publish::{PublishedRelease, publish_releases};

pub use reconcile::Reconciliation;

pub use repository::{Repository, RepositoryError, RepositoryResult, Sequence};

pub use update::Update;

pub use version::Version;
