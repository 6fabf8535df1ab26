//! Bump-level decisions.
//!
//! A [`VersioningStrategy`] looks at the unreleased commits and decides how
//! far the version moves. Only [`SemanticVersioning`] exists today.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Commit;

/// Semver bump level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    /// Patch release (x.y.Z).
    Patch,
    /// Minor release (x.Y.0).
    Minor,
    /// Major release (X.0.0).
    Major,
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// Decides the bump level for a set of commits.
pub trait VersioningStrategy {
    /// Bump level demanded by `commits`.
    fn release_type(&self, commits: &[Commit]) -> BumpLevel;
}

/// Label-driven semantic versioning.
///
/// Only merge commits count. A label ending in `!` on any of them means a
/// major release; otherwise a `feat`/`feature` label means minor; otherwise
/// patch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticVersioning;

impl VersioningStrategy for SemanticVersioning {
    fn release_type(&self, commits: &[Commit]) -> BumpLevel {
        let mut level = BumpLevel::Patch;
        for commit in commits.iter().filter(|c| c.is_merge_commit) {
            let Some(ref pull_request) = commit.pull_request else {
                continue;
            };
            for label in &pull_request.labels {
                if label.ends_with('!') {
                    debug!(sha = %commit.sha, %label, "breaking change label");
                    return BumpLevel::Major;
                }
                if label == "feat" || label == "feature" {
                    level = BumpLevel::Minor;
                }
            }
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PullRequest;

    fn merge_commit(sha: &str, labels: &[&str]) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: format!("change {sha}"),
            is_merge_commit: true,
            pull_request: Some(PullRequest {
                sha: Some(sha.to_string()),
                merge_commit_oid: Some(sha.to_string()),
                labels: labels.iter().map(ToString::to_string).collect(),
                ..PullRequest::default()
            }),
        }
    }

    #[test]
    fn no_commits_is_patch() {
        assert_eq!(SemanticVersioning.release_type(&[]), BumpLevel::Patch);
    }

    #[test]
    fn unlabelled_is_patch() {
        let commits = [merge_commit("a", &["fix"]), merge_commit("b", &[])];
        assert_eq!(SemanticVersioning.release_type(&commits), BumpLevel::Patch);
    }

    #[test]
    fn feature_labels_are_minor() {
        assert_eq!(
            SemanticVersioning.release_type(&[merge_commit("a", &["feat"])]),
            BumpLevel::Minor
        );
        assert_eq!(
            SemanticVersioning.release_type(&[merge_commit("a", &["feature"])]),
            BumpLevel::Minor
        );
    }

    #[test]
    fn breaking_wins_regardless_of_order() {
        let feature_first = [merge_commit("a", &["feature"]), merge_commit("b", &["fix!"])];
        let breaking_first = [merge_commit("a", &["fix!"]), merge_commit("b", &["feature"])];
        assert_eq!(
            SemanticVersioning.release_type(&feature_first),
            BumpLevel::Major
        );
        assert_eq!(
            SemanticVersioning.release_type(&breaking_first),
            BumpLevel::Major
        );
    }

    #[test]
    fn non_merge_commits_are_ignored() {
        let mut commit = merge_commit("a", &["feat!"]);
        commit.is_merge_commit = false;
        assert_eq!(SemanticVersioning.release_type(&[commit]), BumpLevel::Patch);
    }

    #[test]
    fn bump_level_display() {
        assert_eq!(BumpLevel::Major.to_string(), "major");
        assert_eq!(BumpLevel::Minor.to_string(), "minor");
        assert_eq!(BumpLevel::Patch.to_string(), "patch");
    }
}
