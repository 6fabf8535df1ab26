//! Value types exchanged with the remote repository.
//!
//! Everything here is a plain value: the remote collaborator builds them,
//! the engine reads them and hands new values back.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of a branch's (flattened) commit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit sha.
    pub sha: String,
    /// Full commit message.
    pub message: String,
    /// Whether this commit is the recorded merge commit of `pull_request`.
    pub is_merge_commit: bool,
    /// The pull request the remote associated with this commit, if any.
    pub pull_request: Option<PullRequest>,
}

/// A pull request as reported by the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Sha known to be the actual merge commit, when known.
    pub sha: Option<String>,
    /// Pull request number.
    pub number: u64,
    /// Title.
    pub title: String,
    /// Body (Markdown).
    pub body: String,
    /// Web URL.
    pub permalink: String,
    /// Head branch name.
    pub head_branch_name: String,
    /// Base branch name.
    pub base_branch_name: String,
    /// The merge commit id recorded by the remote.
    pub merge_commit_oid: Option<String>,
    /// Label names.
    pub labels: Vec<String>,
}

impl PullRequest {
    /// Whether the pull request carries `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// A remote tag, dereferenced to the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Sha of the tagged commit.
    pub sha: String,
    /// Tag name (e.g. `v1.2.3`).
    pub name: String,
    /// Commit date of the tagged commit.
    pub committed_date: String,
}

/// Pull request state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestState {
    /// Open pull requests.
    Open,
    /// Closed without merging.
    Closed,
    /// Merged pull requests.
    Merged,
}

impl fmt::Display for PullRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Merged => write!(f, "MERGED"),
        }
    }
}

/// The pull request the engine wants to exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestDraft {
    /// Title.
    pub title: String,
    /// Body (wrapped changelog).
    pub body: String,
    /// Branch carrying the release edits.
    pub head_branch_name: String,
    /// Branch the release merges into.
    pub base_branch_name: String,
    /// Labels to apply.
    pub labels: Vec<String>,
}

/// A merged release pull request that has not been published yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    /// Merge commit sha the tag should point at.
    pub sha: String,
    /// Tag name (`v<version>`).
    pub tag: String,
    /// Release notes.
    pub notes: String,
    /// Number of the pull request that produced the release.
    pub pull_request_number: u64,
}

/// A release created on the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRelease {
    /// Remote release id.
    pub id: u64,
    /// Web URL of the release.
    pub url: String,
}
