//! Plan the next release and stage it as a pull request.
//!
//! ```text
//! strategy -> target branch -> release context -> bump -> changelog
//!          -> body -> file updates -> reconcile
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::body::wrap;
use crate::changelog::{PullRequestNoteBuilder, build_changelog, build_changelog_today};
use crate::config::ReleaseSettings;
use crate::context::determine_release_context;
use crate::model::PullRequestDraft;
use crate::reconcile::{Reconciliation, reconcile};
use crate::repository::{Repository, RepositoryError};
use crate::strategy::{StrategyError, UpdateOptions, build_strategy};
use crate::version::{Version, VersionError};
use crate::versioning::{BumpLevel, SemanticVersioning, VersioningStrategy};

/// Errors that abort release preparation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    /// The strategy is unknown or could not plan its updates.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// A remote call failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The previous release cannot be bumped.
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Result alias for [`prepare_release`].
pub type PrepareResult<T> = Result<T, PrepareError>;

/// Knobs for a single preparation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareOptions {
    /// Compute the plan without writing anything.
    pub dry_run: bool,
    /// Changelog date, today's local date when unset.
    pub release_date: Option<NaiveDate>,
}

/// Everything decided about the next release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePlan {
    /// Branch the release merges into.
    pub target_branch: String,
    /// The previous release, `0.0.0` if there is none.
    pub previous_release: Version,
    /// Bump applied to the previous release.
    pub bump: BumpLevel,
    /// The version being released.
    pub version: Version,
    /// Number of unreleased commits.
    pub commits: usize,
    /// Rendered changelog entry.
    pub changelog: String,
    /// The release pull request.
    pub pull_request: PullRequestDraft,
    /// Files staged on the pull request, in order.
    pub files: Vec<String>,
}

/// Result of [`prepare_release`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrepareOutcome {
    /// The target branch has no commits since the previous release.
    NothingToRelease {
        /// Branch that was inspected.
        target_branch: String,
        /// The latest release on it.
        previous_release: Version,
    },
    /// Dry run: the plan, nothing written.
    Planned {
        /// The computed plan.
        plan: ReleasePlan,
    },
    /// The release pull request was reconciled with the plan.
    Reconciled {
        /// The computed plan.
        plan: ReleasePlan,
        /// What happened on the remote.
        result: Reconciliation,
    },
}

/// Pull request title for releasing `version` into `branch`.
pub fn release_title(branch: &str, version: &Version) -> String {
    format!("chore({branch}): release {version}")
}

/// Compute the next release of the configured branch and create or update
/// its pull request.
#[instrument(skip_all, fields(strategy = %settings.strategy, dry_run = options.dry_run))]
pub fn prepare_release(
    repo: &dyn Repository,
    settings: &ReleaseSettings,
    options: PrepareOptions,
) -> PrepareResult<PrepareOutcome> {
    let strategy = build_strategy(&settings.strategy, settings.strategy_config())?;

    let target_branch = match &settings.target_branch {
        Some(branch) => branch.clone(),
        None => repo.default_branch()?,
    };

    let context = determine_release_context(repo, &target_branch, settings.commit_history_depth);
    if context.unreleased_commits.is_empty() {
        info!(branch = %target_branch, previous = %context.previous_release, "nothing to release");
        return Ok(PrepareOutcome::NothingToRelease {
            target_branch,
            previous_release: context.previous_release,
        });
    }

    let commits = &context.unreleased_commits;
    if context.previous_release.is_unreleased() {
        info!(branch = %target_branch, "first release on this branch");
    }
    let bump = SemanticVersioning.release_type(commits);
    let version = context.previous_release.bump(bump)?;
    info!(
        previous = %context.previous_release,
        %version,
        %bump,
        commits = commits.len(),
        "next release"
    );

    let changelog = match options.release_date {
        Some(date) => build_changelog(commits, &PullRequestNoteBuilder, &version, date),
        None => build_changelog_today(commits, &PullRequestNoteBuilder, &version),
    };

    let title = release_title(&target_branch, &version);
    let draft = PullRequestDraft {
        title: title.clone(),
        body: wrap(&changelog),
        head_branch_name: settings.head_branch(&target_branch),
        base_branch_name: target_branch.clone(),
        labels: vec![settings.label_pending.clone()],
    };

    let updates = strategy.determine_updates(
        repo,
        &UpdateOptions {
            changelog_entry: changelog.clone(),
            release_version: version.clone(),
            target_branch: target_branch.clone(),
        },
    )?;

    let plan = ReleasePlan {
        target_branch,
        previous_release: context.previous_release.clone(),
        bump,
        version,
        commits: commits.len(),
        changelog,
        files: updates.iter().map(|update| update.path.clone()).collect(),
        pull_request: draft,
    };

    if options.dry_run {
        return Ok(PrepareOutcome::Planned { plan });
    }

    let result = reconcile(
        repo,
        &plan.pull_request,
        &settings.label_pending,
        &title,
        &updates,
    )?;
    Ok(PrepareOutcome::Reconciled { plan, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRepository, commit, merge_commit, tag};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 8).unwrap()
    }

    fn options(dry_run: bool) -> PrepareOptions {
        PrepareOptions {
            dry_run,
            release_date: Some(date()),
        }
    }

    fn repo() -> FakeRepository {
        let mut repo = FakeRepository {
            tags: vec![tag("c2", "v1.0.0")],
            commits: vec![
                merge_commit("c0", 12, "Add widgets (#12)", &["feature"]),
                merge_commit("c1", 11, "Fix sprockets (#11)", &["fix"]),
                commit("c2"),
                commit("c3"),
            ],
            ..FakeRepository::new()
        };
        repo.files.insert(
            "Cargo.toml".into(),
            "[package]\nname = \"widget\"\nversion = \"1.0.0\"\n".into(),
        );
        repo.files.insert(
            "Cargo.lock".into(),
            "version = 4\n\n[[package]]\nname = \"widget\"\nversion = \"1.0.0\"\n".into(),
        );
        repo
    }

    const CHANGELOG: &str = "## v1.1.0 (2025-08-08)\n\
        \n\
        ### Features\n\
        \n\
        - Add widgets ([#12](https://example.test/pull/12))\n\
        \n\
        ### Bug Fixes\n\
        \n\
        - Fix sprockets ([#11](https://example.test/pull/11))\n";

    #[test]
    fn opens_a_release_pull_request() {
        let repo = repo();
        let outcome = prepare_release(&repo, &ReleaseSettings::default(), options(false)).unwrap();

        let PrepareOutcome::Reconciled { plan, result } = outcome else {
            panic!("expected a reconciled release, got {outcome:?}");
        };
        assert!(matches!(result, Reconciliation::Created(_)));
        assert_eq!(plan.target_branch, "main");
        assert_eq!(plan.version, Version::new(1, 1, 0));
        assert_eq!(plan.bump, BumpLevel::Minor);
        assert_eq!(plan.commits, 2);
        assert_eq!(plan.changelog, CHANGELOG);
        assert_eq!(plan.pull_request.title, "chore(main): release 1.1.0");
        assert_eq!(plan.pull_request.head_branch_name, "release--branches--main");
        assert_eq!(plan.pull_request.labels, ["autorelease: pending"]);
        assert_eq!(plan.files, ["CHANGELOG.md", "Cargo.toml", "Cargo.lock"]);

        let written = repo.written.borrow();
        assert_eq!(written[0].0, "CHANGELOG.md");
        assert_eq!(
            written[0].1.as_deref(),
            Some(format!("# Changelog\n\n{CHANGELOG}").as_str())
        );
        assert!(written[1].1.as_deref().unwrap().contains("version = \"1.1.0\""));
        assert!(written[2].1.as_deref().unwrap().contains("version = \"1.1.0\""));
    }

    #[test]
    fn unknown_strategy_fails_before_any_remote_call() {
        let repo = repo();
        let settings = ReleaseSettings {
            strategy: "cobol".into(),
            ..ReleaseSettings::default()
        };
        let err = prepare_release(&repo, &settings, options(false)).unwrap_err();
        assert_eq!(err.to_string(), "invalid strategy 'cobol'");
        assert!(repo.calls().is_empty());
        assert_eq!(repo.history_opens.get(), 0);
    }

    #[test]
    fn nothing_to_release_when_head_is_tagged() {
        let repo = FakeRepository {
            tags: vec![tag("c0", "v2.0.0")],
            commits: vec![commit("c0"), commit("c1")],
            ..FakeRepository::new()
        };
        let outcome = prepare_release(&repo, &ReleaseSettings::default(), options(false)).unwrap();
        assert_eq!(
            outcome,
            PrepareOutcome::NothingToRelease {
                target_branch: "main".into(),
                previous_release: Version::new(2, 0, 0),
            }
        );
    }

    #[test]
    fn dry_run_writes_nothing() {
        let repo = repo();
        let outcome = prepare_release(&repo, &ReleaseSettings::default(), options(true)).unwrap();
        assert!(matches!(outcome, PrepareOutcome::Planned { .. }));
        assert_eq!(repo.calls(), ["default_branch"]);
        assert!(repo.written.borrow().is_empty());
    }

    #[test]
    fn configured_branch_skips_default_branch_lookup() {
        let repo = repo();
        let settings = ReleaseSettings {
            target_branch: Some("develop".into()),
            strategy: "simple".into(),
            ..ReleaseSettings::default()
        };
        let outcome = prepare_release(&repo, &settings, options(true)).unwrap();
        let PrepareOutcome::Planned { plan } = outcome else {
            panic!("expected a plan");
        };
        assert_eq!(plan.pull_request.title, "chore(develop): release 1.1.0");
        assert_eq!(plan.pull_request.head_branch_name, "release--branches--develop");
        assert_eq!(plan.files, ["CHANGELOG.md"]);
        assert!(repo.calls().is_empty());
    }

    #[test]
    fn existing_identical_pull_request_is_unchanged() {
        let repo = repo();
        let first = prepare_release(&repo, &ReleaseSettings::default(), options(true)).unwrap();
        let PrepareOutcome::Planned { plan } = first else {
            panic!("expected a plan");
        };

        let repo = FakeRepository {
            open: vec![crate::model::PullRequest {
                number: 41,
                title: plan.pull_request.title.clone(),
                body: plan.pull_request.body.clone(),
                head_branch_name: plan.pull_request.head_branch_name.clone(),
                base_branch_name: "main".into(),
                labels: plan.pull_request.labels.clone(),
                ..Default::default()
            }],
            ..repo
        };
        let outcome = prepare_release(&repo, &ReleaseSettings::default(), options(false)).unwrap();
        let PrepareOutcome::Reconciled { result, .. } = outcome else {
            panic!("expected a reconciled release");
        };
        assert!(matches!(result, Reconciliation::Unchanged(_)));
    }

    #[test]
    fn broken_lockfile_is_reported_as_an_update_failure() {
        let mut repo = repo();
        repo.files
            .insert("Cargo.lock".into(), "[[package]\nname = ".into());
        let err = prepare_release(&repo, &ReleaseSettings::default(), options(false)).unwrap_err();
        let PrepareError::Repository(RepositoryError::Update { path, source }) = err else {
            panic!("expected an update failure, got {err:?}");
        };
        assert_eq!(path, "Cargo.lock");
        assert!(matches!(source, crate::update::UpdateError::Toml(_)));
    }

    #[test]
    fn unbumpable_previous_release_is_an_error() {
        let repo = FakeRepository {
            tags: vec![tag("c1", "v18446744073709551615.0.0")],
            commits: vec![merge_commit("c0", 7, "Drop the api (#7)", &["api!"]), commit("c1")],
            ..FakeRepository::new()
        };
        let settings = ReleaseSettings {
            strategy: "simple".into(),
            ..ReleaseSettings::default()
        };
        let err = prepare_release(&repo, &settings, options(true)).unwrap_err();
        assert!(matches!(
            err,
            PrepareError::Version(VersionError::Overflow { component: "major", .. })
        ));
        assert!(repo.written.borrow().is_empty());
    }

    #[test]
    fn first_release_bumps_from_unreleased() {
        let repo = FakeRepository {
            commits: vec![merge_commit("c0", 1, "Initial (#1)", &[])],
            ..FakeRepository::new()
        };
        let settings = ReleaseSettings {
            strategy: "simple".into(),
            ..ReleaseSettings::default()
        };
        let outcome = prepare_release(&repo, &settings, options(true)).unwrap();
        let PrepareOutcome::Planned { plan } = outcome else {
            panic!("expected a plan");
        };
        assert_eq!(plan.previous_release, Version::UNRELEASED);
        assert_eq!(plan.version, Version::new(0, 0, 1));
    }
}
