//! The remote repository contract.
//!
//! The engine never talks to a forge directly. Everything it reads or
//! writes goes through [`Repository`]; the CLI supplies an implementation
//! backed by the GitHub API, tests supply an in-memory one.
//!
//! Sequence methods return lazy iterators. Pulling the next item may fetch
//! a page from the network; dropping the iterator stops fetching.

use thiserror::Error;

use crate::model::{
    Commit, CreatedRelease, PullRequest, PullRequestDraft, PullRequestState, Release, Tag,
};
use crate::update::{RenderError, Update, UpdateError};

/// Errors reported by a [`Repository`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The file does not exist on the branch.
    #[error("file '{path}' not found on branch '{branch}'")]
    NotFound {
        /// File path.
        path: String,
        /// Branch that was searched.
        branch: String,
    },

    /// A release for this tag already exists.
    #[error("release '{tag}' already exists")]
    DuplicateRelease {
        /// The duplicate tag.
        tag: String,
    },

    /// A staged file could not be rendered from its current content.
    #[error("failed to update '{path}': {source}")]
    Update {
        /// File being updated.
        path: String,
        /// Underlying updater error.
        source: UpdateError,
    },

    /// Any other failure talking to the remote.
    #[error("{0}")]
    Transport(String),
}

impl From<RenderError> for RepositoryError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Repository(err) => err,
            RenderError::Update { path, source } => Self::Update { path, source },
        }
    }
}

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Lazy sequence handed out by a [`Repository`].
pub type Sequence<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// A remote repository.
pub trait Repository {
    /// Tags, most recently committed first.
    fn tags(&self, max_results: Option<usize>) -> Sequence<'_, Tag>;

    /// History of `branch`, newest first. Empty when the branch is unknown.
    fn merge_commits(&self, branch: &str, max_results: Option<usize>) -> Sequence<'_, Commit>;

    /// Pull requests targeting `branch` in `state`, newest first.
    fn pull_requests(
        &self,
        branch: &str,
        state: PullRequestState,
        max_results: Option<usize>,
    ) -> Sequence<'_, PullRequest>;

    /// Contents of the file at `path` on `branch`.
    fn file_contents(&self, path: &str, branch: &str) -> RepositoryResult<String>;

    /// Commit `updates` onto the draft's head branch and open a pull request.
    fn create_pull_request(
        &self,
        draft: &PullRequestDraft,
        message: &str,
        updates: &[Update],
    ) -> RepositoryResult<PullRequest>;

    /// Recreate the head branch contents from `updates` and retitle pull
    /// request `number`.
    fn update_pull_request(
        &self,
        number: u64,
        draft: &PullRequestDraft,
        message: &str,
        updates: &[Update],
    ) -> RepositoryResult<PullRequest>;

    /// Publish a release (and its tag).
    fn create_release(&self, release: &Release) -> RepositoryResult<CreatedRelease>;

    /// Add labels to an issue or pull request.
    fn add_labels(&self, number: u64, labels: &[String]) -> RepositoryResult<()>;

    /// Remove labels from an issue or pull request.
    fn remove_labels(&self, number: u64, labels: &[String]) -> RepositoryResult<()>;

    /// The repository's default branch.
    fn default_branch(&self) -> RepositoryResult<String>;
}
