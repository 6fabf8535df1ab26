//! Publish merged release pull requests as tagged releases.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::ReleaseSettings;
use crate::model::{CreatedRelease, Release};
use crate::releases::determine_releases;
use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// What happened to one detected release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishedRelease {
    /// The release and its tag were created.
    Created {
        /// The detected release.
        release: Release,
        /// The remote release.
        created: CreatedRelease,
    },
    /// The remote already had a release for this tag.
    AlreadyReleased {
        /// The detected release.
        release: Release,
    },
    /// Dry run: the release would be created.
    Pending {
        /// The detected release.
        release: Release,
    },
}

impl PublishedRelease {
    /// The release this outcome is about.
    pub const fn release(&self) -> &Release {
        match self {
            Self::Created { release, .. }
            | Self::AlreadyReleased { release }
            | Self::Pending { release } => release,
        }
    }
}

/// Create a release for every merged, untagged release pull request.
///
/// Releases are created oldest first. A release whose tag already exists is
/// reported as [`PublishedRelease::AlreadyReleased`]. Either way the pull
/// request's pending label is swapped for the tagged label.
#[instrument(skip(repo, settings))]
pub fn publish_releases(
    repo: &dyn Repository,
    settings: &ReleaseSettings,
    dry_run: bool,
) -> RepositoryResult<Vec<PublishedRelease>> {
    let target_branch = match &settings.target_branch {
        Some(branch) => branch.clone(),
        None => repo.default_branch()?,
    };

    let releases = determine_releases(repo, &target_branch, &settings.release_options());
    info!(count = releases.len(), branch = %target_branch, "releases to publish");

    let mut published = Vec::with_capacity(releases.len());
    for release in releases.into_iter().rev() {
        if dry_run {
            published.push(PublishedRelease::Pending { release });
            continue;
        }

        let outcome = match repo.create_release(&release) {
            Ok(created) => {
                info!(tag = %release.tag, url = %created.url, "created release");
                PublishedRelease::Created { release, created }
            }
            Err(RepositoryError::DuplicateRelease { tag }) => {
                warn!(%tag, "release already exists");
                PublishedRelease::AlreadyReleased { release }
            }
            Err(err) => return Err(err),
        };

        let number = outcome.release().pull_request_number;
        repo.remove_labels(number, std::slice::from_ref(&settings.label_pending))?;
        repo.add_labels(number, std::slice::from_ref(&settings.label_tagged))?;
        published.push(outcome);
    }

    Ok(published)
}
