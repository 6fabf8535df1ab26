//! Create or refresh the single pending release pull request.

use serde::Serialize;
use tracing::{info, instrument};

use crate::model::{PullRequest, PullRequestDraft, PullRequestState};
use crate::repository::{Repository, RepositoryResult};
use crate::update::Update;

/// What [`reconcile`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "pull_request", rename_all = "snake_case")]
pub enum Reconciliation {
    /// No pending release pull request existed; one was opened.
    Created(PullRequest),
    /// The pending release pull request was rewritten.
    Updated(PullRequest),
    /// The pending release pull request already matched.
    Unchanged(PullRequest),
}

impl Reconciliation {
    /// The pull request acted upon.
    pub const fn pull_request(&self) -> &PullRequest {
        match self {
            Self::Created(pr) | Self::Updated(pr) | Self::Unchanged(pr) => pr,
        }
    }
}

/// Find the open pull request on the draft's base branch that comes from
/// the draft's head branch and carries `label_pending`.
pub fn find_pending(
    repo: &dyn Repository,
    draft: &PullRequestDraft,
    label_pending: &str,
) -> Option<PullRequest> {
    repo.pull_requests(&draft.base_branch_name, PullRequestState::Open, None)
        .find(|pr| pr.head_branch_name == draft.head_branch_name && pr.has_label(label_pending))
}

/// Make the remote match `draft`.
///
/// Only the title and body are compared when deciding whether an existing
/// pull request is up to date.
#[instrument(skip_all, fields(head = %draft.head_branch_name))]
pub fn reconcile(
    repo: &dyn Repository,
    draft: &PullRequestDraft,
    label_pending: &str,
    commit_message: &str,
    updates: &[Update],
) -> RepositoryResult<Reconciliation> {
    let Some(existing) = find_pending(repo, draft, label_pending) else {
        let created = repo.create_pull_request(draft, commit_message, updates)?;
        info!(number = created.number, "opened release pull request");
        return Ok(Reconciliation::Created(created));
    };

    if existing.title == draft.title && existing.body == draft.body {
        info!(number = existing.number, "release pull request is up to date");
        return Ok(Reconciliation::Unchanged(existing));
    }

    let updated = repo.update_pull_request(existing.number, draft, commit_message, updates)?;
    info!(number = updated.number, "updated release pull request");
    Ok(Reconciliation::Updated(updated))
}
