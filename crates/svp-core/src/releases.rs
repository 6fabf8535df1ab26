//! Find merged release pull requests that were never published.

use std::collections::HashSet;

use tracing::{debug, info, instrument, trace, warn};

use crate::body::extract_release;
use crate::model::{PullRequest, PullRequestState, Release};
use crate::repository::Repository;
use crate::version::parse_version_tag;

/// Number of tags read when collecting already-released shas.
const TAG_SCAN_LIMIT: usize = 100;

/// How release pull requests are recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOptions {
    /// Head branch prefix of release pull requests.
    pub branch_prefix: String,
    /// Label carried by release pull requests awaiting publication.
    pub label_pending: String,
    /// Stop after seeing this many already-tagged release pull requests.
    pub history_depth: usize,
}

impl ReleaseOptions {
    fn is_candidate(&self, pull_request: &PullRequest) -> bool {
        pull_request.head_branch_name.starts_with(&self.branch_prefix)
            || pull_request.has_label(&self.label_pending)
    }
}

/// Walk merged pull requests (newest first) and collect untagged releases.
///
/// Once `history_depth` already-tagged release pull requests have been seen,
/// everything older is assumed released and the walk stops without pulling
/// further.
pub fn find_releases(
    pull_requests: impl IntoIterator<Item = PullRequest>,
    released_shas: &HashSet<String>,
    options: &ReleaseOptions,
) -> Vec<Release> {
    let mut releases = Vec::new();
    let mut confirmed = 0usize;

    for pull_request in pull_requests {
        if !options.is_candidate(&pull_request) {
            continue;
        }

        let tagged = pull_request
            .sha
            .as_ref()
            .is_some_and(|sha| released_shas.contains(sha));
        if tagged {
            debug!(pull_request = pull_request.number, "already released");
            confirmed += 1;
            if confirmed >= options.history_depth {
                info!(
                    confirmed,
                    pull_request = pull_request.number,
                    "assuming older pull requests have been released"
                );
                break;
            }
            continue;
        }

        match build_release(&pull_request) {
            Some(release) => {
                debug!(pull_request = pull_request.number, tag = %release.tag, "found unreleased pull request");
                releases.push(release);
            }
            None => trace!(
                pull_request = pull_request.number,
                "no valid release notes or version"
            ),
        }
    }

    releases
}

/// Build the release described by a merged pull request's body.
pub fn build_release(pull_request: &PullRequest) -> Option<Release> {
    let Some(sha) = &pull_request.sha else {
        warn!(
            pull_request = pull_request.number,
            "pull request has no merge sha, skipping"
        );
        return None;
    };

    let notes = extract_release(&pull_request.body, pull_request.number)?;
    Some(Release {
        sha: sha.clone(),
        tag: format!("v{}", notes.version),
        notes: notes.notes,
        pull_request_number: pull_request.number,
    })
}

/// Releases merged into `target_branch` that have no tag yet, newest first.
#[instrument(skip(repo, options))]
pub fn determine_releases(
    repo: &dyn Repository,
    target_branch: &str,
    options: &ReleaseOptions,
) -> Vec<Release> {
    let released_shas: HashSet<String> = repo
        .tags(Some(TAG_SCAN_LIMIT))
        .filter(|tag| parse_version_tag(&tag.name).is_some())
        .map(|tag| tag.sha)
        .collect();
    debug!(tags = released_shas.len(), "collected released shas");

    find_releases(
        repo.pull_requests(target_branch, PullRequestState::Merged, None),
        &released_shas,
        options,
    )
}
