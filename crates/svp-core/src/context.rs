//! Resolve the previous release and the commits made since.
//!
//! The newest version tag whose commit appears in the branch history marks
//! the previous release. Tags are tried newest first; a tag created on
//! another branch never shows up in the history and is skipped.
//!
//! The history is the expensive side (one network page per pull), so it is
//! opened once, on the first version tag, and every commit pulled from it is
//! cached. Later tags check the cache before pulling further.

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use crate::model::Commit;
use crate::repository::{Repository, Sequence};
use crate::version::{Version, parse_version_tag};

/// Where the next release starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseContext {
    /// The most recent reachable release, [`Version::UNRELEASED`] if none.
    pub previous_release: Version,
    /// Commits newer than the previous release, newest first.
    pub unreleased_commits: Vec<Commit>,
}

/// Find the previous release on `target_branch` and everything after it.
///
/// `history_depth` caps how many commits are read from the branch history.
#[instrument(skip(repo))]
pub fn determine_release_context(
    repo: &dyn Repository,
    target_branch: &str,
    history_depth: Option<usize>,
) -> ReleaseContext {
    let mut cache: Vec<Commit> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut history: Option<Sequence<'_, Commit>> = None;

    for tag in repo.tags(None) {
        let Some(version) = parse_version_tag(&tag.name) else {
            debug!(tag = %tag.name, "skipping non-version tag");
            continue;
        };

        if seen.contains(&tag.sha)
            && let Some(position) = cache.iter().position(|commit| commit.sha == tag.sha)
        {
            cache.truncate(position);
            return resolved(version, cache, &tag.name);
        }

        let commits =
            history.get_or_insert_with(|| repo.merge_commits(target_branch, history_depth));
        for commit in commits {
            let found = commit.sha == tag.sha;
            seen.insert(commit.sha.clone());
            cache.push(commit);
            if found {
                cache.pop();
                return resolved(version, cache, &tag.name);
            }
        }

        warn!(
            tag = %tag.name,
            branch = target_branch,
            "tag not found in branch history, skipping"
        );
    }

    cache.extend(history.unwrap_or_else(|| repo.merge_commits(target_branch, history_depth)));
    info!(commits = cache.len(), "no previous release found");
    ReleaseContext {
        previous_release: Version::UNRELEASED,
        unreleased_commits: cache,
    }
}

fn resolved(previous_release: Version, unreleased_commits: Vec<Commit>, tag: &str) -> ReleaseContext {
    info!(
        tag,
        unreleased = unreleased_commits.len(),
        "resolved previous release"
    );
    ReleaseContext {
        previous_release,
        unreleased_commits,
    }
}
