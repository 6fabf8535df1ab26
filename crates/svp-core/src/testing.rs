//! In-memory [`Repository`] for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::model::{
    Commit, CreatedRelease, PullRequest, PullRequestDraft, PullRequestState, Release, Tag,
};
use crate::repository::{Repository, RepositoryError, RepositoryResult, Sequence};
use crate::update::{Update, render_update};

/// A scripted repository that records every write.
#[derive(Debug, Default)]
pub struct FakeRepository {
    pub tags: Vec<Tag>,
    pub commits: Vec<Commit>,
    pub merged: Vec<PullRequest>,
    pub open: Vec<PullRequest>,
    pub files: BTreeMap<String, String>,
    /// Tags for which `create_release` reports a duplicate.
    pub existing_releases: Vec<String>,
    /// Number of commits pulled from `merge_commits` sequences.
    pub commit_pulls: Cell<usize>,
    /// Number of pull requests pulled from `pull_requests` sequences.
    pub pull_request_pulls: Cell<usize>,
    /// Number of `merge_commits` sequences opened.
    pub history_opens: Cell<usize>,
    /// Every call made, in order.
    pub calls: RefCell<Vec<String>>,
    /// Files written by pull request operations, `None` when skipped.
    pub written: RefCell<Vec<(String, Option<String>)>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn write_updates(&self, branch: &str, updates: &[Update]) -> RepositoryResult<()> {
        for update in updates {
            let existing = self.file_contents(&update.path, branch);
            let rendered = render_update(update, existing)?;
            self.written
                .borrow_mut()
                .push((update.path.clone(), rendered));
        }
        Ok(())
    }
}

impl Repository for FakeRepository {
    fn tags(&self, max_results: Option<usize>) -> Sequence<'_, Tag> {
        Box::new(
            self.tags
                .iter()
                .take(max_results.unwrap_or(usize::MAX))
                .cloned(),
        )
    }

    fn merge_commits(&self, _branch: &str, max_results: Option<usize>) -> Sequence<'_, Commit> {
        self.history_opens.set(self.history_opens.get() + 1);
        Box::new(
            self.commits
                .iter()
                .take(max_results.unwrap_or(usize::MAX))
                .inspect(|_| self.commit_pulls.set(self.commit_pulls.get() + 1))
                .cloned(),
        )
    }

    fn pull_requests(
        &self,
        _branch: &str,
        state: PullRequestState,
        max_results: Option<usize>,
    ) -> Sequence<'_, PullRequest> {
        let source: &[PullRequest] = match state {
            PullRequestState::Open => &self.open,
            PullRequestState::Merged => &self.merged,
            PullRequestState::Closed => &[],
        };
        Box::new(
            source
                .iter()
                .take(max_results.unwrap_or(usize::MAX))
                .inspect(|_| self.pull_request_pulls.set(self.pull_request_pulls.get() + 1))
                .cloned(),
        )
    }

    fn file_contents(&self, path: &str, branch: &str) -> RepositoryResult<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                path: path.to_string(),
                branch: branch.to_string(),
            })
    }

    fn create_pull_request(
        &self,
        draft: &PullRequestDraft,
        message: &str,
        updates: &[Update],
    ) -> RepositoryResult<PullRequest> {
        self.record(format!("create_pull_request {} ({message})", draft.title));
        self.write_updates(&draft.base_branch_name, updates)?;
        Ok(PullRequest {
            number: 100,
            title: draft.title.clone(),
            body: draft.body.clone(),
            head_branch_name: draft.head_branch_name.clone(),
            base_branch_name: draft.base_branch_name.clone(),
            labels: draft.labels.clone(),
            ..PullRequest::default()
        })
    }

    fn update_pull_request(
        &self,
        number: u64,
        draft: &PullRequestDraft,
        message: &str,
        updates: &[Update],
    ) -> RepositoryResult<PullRequest> {
        self.record(format!("update_pull_request #{number} {} ({message})", draft.title));
        self.write_updates(&draft.base_branch_name, updates)?;
        Ok(PullRequest {
            number,
            title: draft.title.clone(),
            body: draft.body.clone(),
            head_branch_name: draft.head_branch_name.clone(),
            base_branch_name: draft.base_branch_name.clone(),
            labels: draft.labels.clone(),
            ..PullRequest::default()
        })
    }

    fn create_release(&self, release: &Release) -> RepositoryResult<CreatedRelease> {
        self.record(format!("create_release {}", release.tag));
        if self.existing_releases.contains(&release.tag) {
            return Err(RepositoryError::DuplicateRelease {
                tag: release.tag.clone(),
            });
        }
        Ok(CreatedRelease {
            id: release.pull_request_number,
            url: format!("https://example.test/releases/{}", release.tag),
        })
    }

    fn add_labels(&self, number: u64, labels: &[String]) -> RepositoryResult<()> {
        self.record(format!("add_labels #{number} {}", labels.join(",")));
        Ok(())
    }

    fn remove_labels(&self, number: u64, labels: &[String]) -> RepositoryResult<()> {
        self.record(format!("remove_labels #{number} {}", labels.join(",")));
        Ok(())
    }

    fn default_branch(&self) -> RepositoryResult<String> {
        self.record("default_branch".to_string());
        Ok("main".to_string())
    }
}

/// A plain commit with no pull request.
pub fn commit(sha: &str) -> Commit {
    Commit {
        sha: sha.to_string(),
        message: format!("commit {sha}"),
        is_merge_commit: false,
        pull_request: None,
    }
}

/// The merge commit of pull request `number`.
pub fn merge_commit(sha: &str, number: u64, message: &str, labels: &[&str]) -> Commit {
    Commit {
        sha: sha.to_string(),
        message: message.to_string(),
        is_merge_commit: true,
        pull_request: Some(PullRequest {
            sha: Some(sha.to_string()),
            number,
            title: message.to_string(),
            permalink: format!("https://example.test/pull/{number}"),
            merge_commit_oid: Some(sha.to_string()),
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
            ..PullRequest::default()
        }),
    }
}

pub fn tag(sha: &str, name: &str) -> Tag {
    Tag {
        sha: sha.to_string(),
        name: name.to_string(),
        committed_date: String::new(),
    }
}

/// A merged pull request whose head branch is `head`.
pub fn merged_pull_request(number: u64, sha: &str, head: &str, body: &str) -> PullRequest {
    PullRequest {
        sha: Some(sha.to_string()),
        number,
        title: format!("pull request {number}"),
        body: body.to_string(),
        permalink: format!("https://example.test/pull/{number}"),
        head_branch_name: head.to_string(),
        base_branch_name: "main".to_string(),
        merge_commit_oid: Some(sha.to_string()),
        labels: Vec::new(),
    }
}
