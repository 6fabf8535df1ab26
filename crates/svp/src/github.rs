//! GitHub access through the `gh` CLI.
//!
//! Shells out to `gh api` for every call, so authentication, hosts and
//! proxies come from the user's `gh` setup. Listings go through GraphQL and
//! are exposed as lazy [`Paginated`] sequences; writes use the REST API.

use std::io::Write;
use std::process::{Command, Stdio};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use svp_core::pagination::{Page, Paginated};
use svp_core::update::render_update;
use svp_core::{
    Commit, CreatedRelease, PullRequest, PullRequestDraft, PullRequestState, Release,
    Repository, RepositoryError, RepositoryResult, Sequence, Tag, Update,
};

/// Largest page GitHub's GraphQL API serves.
const MAX_PAGE_SIZE: usize = 100;
const DEFAULT_PAGE_SIZE: usize = 25;
const FILE_MODE: &str = "100644";

/// Characters escaped in a single URL path segment or query value.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');
/// Like [`SEGMENT`], keeping `/` separators.
const PATH: &AsciiSet = &SEGMENT.remove(b'/');

const TAGS_QUERY: &str = r#"
query($owner: String!, $name: String!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    refs(refPrefix: "refs/tags/", first: $first, after: $cursor,
         orderBy: {field: TAG_COMMIT_DATE, direction: DESC}) {
      nodes {
        name
        target {
          ... on Commit { oid committedDate }
          ... on Tag { target { ... on Commit { oid committedDate } } }
        }
      }
      pageInfo { hasNextPage endCursor }
    }
  }
}"#;

const HISTORY_QUERY: &str = r"
query($owner: String!, $name: String!, $branch: String!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    ref(qualifiedName: $branch) {
      target {
        ... on Commit {
          history(first: $first, after: $cursor) {
            nodes {
              oid
              message
              associatedPullRequests(first: 10) {
                nodes {
                  number title body permalink headRefName baseRefName
                  mergeCommit { oid }
                  labels(first: 10) { nodes { name } }
                }
              }
            }
            pageInfo { hasNextPage endCursor }
          }
        }
      }
    }
  }
}";

const PULL_REQUESTS_QUERY: &str = r"
query($owner: String!, $name: String!, $branch: String!, $states: [PullRequestState!],
      $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequests(first: $first, after: $cursor, baseRefName: $branch, states: $states,
                 orderBy: {field: CREATED_AT, direction: DESC}) {
      nodes {
        number title body permalink headRefName baseRefName
        mergeCommit { oid }
        labels(first: 10) { nodes { name } }
      }
      pageInfo { hasNextPage endCursor }
    }
  }
}";

/// A GitHub repository reached through `gh`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhRepository {
    owner: String,
    name: String,
}

impl GhRepository {
    /// Repository `owner/name`.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name` or a GitHub URL.
    pub fn from_spec(spec: &str) -> Option<Self> {
        parse_repo_spec(spec).map(|(owner, name)| Self::new(owner, name))
    }

    /// The repository `gh` resolves for the current directory.
    pub fn detect() -> RepositoryResult<Self> {
        let out = gh(
            &["repo", "view", "--json", "nameWithOwner", "--jq", ".nameWithOwner"],
            None,
        )?;
        let spec = out.trim();
        Self::from_spec(spec).ok_or_else(|| {
            RepositoryError::Transport(format!("unexpected repository name '{spec}'"))
        })
    }

    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    fn endpoint(&self, path: &str) -> String {
        if path.is_empty() {
            format!("repos/{}/{}", self.owner, self.name)
        } else {
            format!("repos/{}/{}/{path}", self.owner, self.name)
        }
    }

    fn rest(&self, method: &str, path: &str, body: Option<&Value>) -> RepositoryResult<Value> {
        let endpoint = self.endpoint(path);
        let input = body.map(Value::to_string);
        let mut args = vec!["api", "--method", method, endpoint.as_str()];
        if input.is_some() {
            args.extend(["--input", "-"]);
        }

        let out = gh(&args, input.as_deref())?;
        if out.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&out).map_err(|e| {
            RepositoryError::Transport(format!("invalid response from {endpoint}: {e}"))
        })
    }

    fn rest_as<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> RepositoryResult<T> {
        let value = self.rest(method, path, body)?;
        serde_json::from_value(value)
            .map_err(|e| RepositoryError::Transport(format!("unexpected response from {path}: {e}")))
    }

    fn query<T: DeserializeOwned>(&self, query: &str, mut variables: Value) -> RepositoryResult<T> {
        variables["owner"] = json!(self.owner);
        variables["name"] = json!(self.name);
        let body = json!({ "query": query, "variables": variables }).to_string();

        let out = gh(&["api", "graphql", "--input", "-"], Some(&body))?;
        let response: GraphQlResponse<T> = serde_json::from_str(&out)
            .map_err(|e| RepositoryError::Transport(format!("invalid GraphQL response: {e}")))?;
        if let Some(errors) = response.errors {
            return Err(RepositoryError::Transport(format!("GraphQL errors: {errors}")));
        }
        response
            .data
            .ok_or_else(|| RepositoryError::Transport("GraphQL response has no data".into()))
    }

    fn tags_page(&self, cursor: Option<&str>, first: usize) -> RepositoryResult<Option<Page<Tag>>> {
        let data: TagsData = self.query(TAGS_QUERY, json!({ "first": first, "cursor": cursor }))?;
        Ok(data
            .repository
            .map(|repository| repository.refs.into_page(TagNode::into_tag)))
    }

    fn history_page(
        &self,
        branch: &str,
        cursor: Option<&str>,
        first: usize,
    ) -> RepositoryResult<Option<Page<Commit>>> {
        let data: HistoryData = self.query(
            HISTORY_QUERY,
            json!({ "branch": branch, "first": first, "cursor": cursor }),
        )?;
        let history = data
            .repository
            .and_then(|repository| repository.git_ref)
            .and_then(|git_ref| git_ref.target.history);
        if history.is_none() {
            warn!(branch, "no commits found for branch");
        }
        Ok(history.map(|history| history.into_page(|node| Some(node.into_commit()))))
    }

    fn pull_requests_page(
        &self,
        branch: &str,
        state: PullRequestState,
        cursor: Option<&str>,
        first: usize,
    ) -> RepositoryResult<Option<Page<PullRequest>>> {
        let data: PullRequestsData = self.query(
            PULL_REQUESTS_QUERY,
            json!({
                "branch": branch,
                "states": [state.to_string()],
                "first": first,
                "cursor": cursor,
            }),
        )?;
        Ok(data.repository.map(|repository| {
            repository.pull_requests.into_page(|node| {
                let sha = node.merge_commit.as_ref().map(|commit| commit.oid.clone());
                Some(node.into_pull_request(sha))
            })
        }))
    }

    /// Commit the rendered `updates` on top of the base branch and point the
    /// head branch at the result, replacing whatever it held before.
    fn commit_updates(
        &self,
        draft: &PullRequestDraft,
        message: &str,
        updates: &[Update],
    ) -> RepositoryResult<()> {
        let base = &draft.base_branch_name;
        let base_ref: RestRef = self.rest_as(
            "GET",
            &format!("git/ref/heads/{}", utf8_percent_encode(base, PATH)),
            None,
        )?;
        let base_sha = base_ref.object.sha;

        let mut tree = Vec::with_capacity(updates.len());
        for update in updates {
            let existing = self.file_contents(&update.path, base);
            let rendered = render_update(update, existing)?;
            if let Some(content) = rendered {
                tree.push(json!({
                    "path": update.path,
                    "mode": FILE_MODE,
                    "type": "blob",
                    "content": content,
                }));
            }
        }
        debug!(files = tree.len(), %base_sha, "committing release files");

        let base_commit: RestCommit =
            self.rest_as("GET", &format!("git/commits/{base_sha}"), None)?;
        let new_tree: RestSha = self.rest_as(
            "POST",
            "git/trees",
            Some(&json!({ "base_tree": base_commit.tree.sha, "tree": tree })),
        )?;
        let commit: RestSha = self.rest_as(
            "POST",
            "git/commits",
            Some(&json!({ "message": message, "tree": new_tree.sha, "parents": [base_sha] })),
        )?;

        self.force_branch(&draft.head_branch_name, &commit.sha)
    }

    fn force_branch(&self, branch: &str, sha: &str) -> RepositoryResult<()> {
        let path = format!("git/refs/heads/{}", utf8_percent_encode(branch, PATH));
        match self.rest("PATCH", &path, Some(&json!({ "sha": sha, "force": true }))) {
            Ok(_) => Ok(()),
            Err(err) if has_status(&err, 404) || has_status(&err, 422) => {
                debug!(branch, "creating branch");
                self.rest(
                    "POST",
                    "git/refs",
                    Some(&json!({ "ref": format!("refs/heads/{branch}"), "sha": sha })),
                )?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

impl Repository for GhRepository {
    fn tags(&self, max_results: Option<usize>) -> Sequence<'_, Tag> {
        let first = page_size(max_results);
        Box::new(Paginated::new(
            "tags",
            max_results,
            move |cursor: Option<&str>| self.tags_page(cursor, first),
        ))
    }

    fn merge_commits(&self, branch: &str, max_results: Option<usize>) -> Sequence<'_, Commit> {
        let first = page_size(max_results);
        let branch = branch.to_string();
        Box::new(Paginated::new(
            "merge_commits",
            max_results,
            move |cursor: Option<&str>| self.history_page(&branch, cursor, first),
        ))
    }

    fn pull_requests(
        &self,
        branch: &str,
        state: PullRequestState,
        max_results: Option<usize>,
    ) -> Sequence<'_, PullRequest> {
        let first = page_size(max_results);
        let branch = branch.to_string();
        Box::new(Paginated::new(
            "pull_requests",
            max_results,
            move |cursor: Option<&str>| self.pull_requests_page(&branch, state, cursor, first),
        ))
    }

    #[instrument(skip(self))]
    fn file_contents(&self, path: &str, branch: &str) -> RepositoryResult<String> {
        let endpoint = self.endpoint(&format!(
            "contents/{}?ref={}",
            utf8_percent_encode(path, PATH),
            utf8_percent_encode(branch, SEGMENT)
        ));
        match gh(
            &["api", "-H", "Accept: application/vnd.github.raw+json", endpoint.as_str()],
            None,
        ) {
            Ok(content) => Ok(content),
            Err(err) if has_status(&err, 404) => Err(RepositoryError::NotFound {
                path: path.to_string(),
                branch: branch.to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    #[instrument(skip_all, fields(head = %draft.head_branch_name))]
    fn create_pull_request(
        &self,
        draft: &PullRequestDraft,
        message: &str,
        updates: &[Update],
    ) -> RepositoryResult<PullRequest> {
        self.commit_updates(draft, message, updates)?;
        let pull: RestPull = self.rest_as(
            "POST",
            "pulls",
            Some(&json!({
                "title": draft.title,
                "body": draft.body,
                "head": draft.head_branch_name,
                "base": draft.base_branch_name,
            })),
        )?;
        let mut pull_request = pull.into_pull_request();
        if !draft.labels.is_empty() {
            self.add_labels(pull_request.number, &draft.labels)?;
            pull_request.labels.clone_from(&draft.labels);
        }
        Ok(pull_request)
    }

    #[instrument(skip(self, draft, message, updates))]
    fn update_pull_request(
        &self,
        number: u64,
        draft: &PullRequestDraft,
        message: &str,
        updates: &[Update],
    ) -> RepositoryResult<PullRequest> {
        self.commit_updates(draft, message, updates)?;
        let pull: RestPull = self.rest_as(
            "PATCH",
            &format!("pulls/{number}"),
            Some(&json!({ "title": draft.title, "body": draft.body, "state": "open" })),
        )?;
        Ok(pull.into_pull_request())
    }

    #[instrument(skip_all, fields(tag = %release.tag))]
    fn create_release(&self, release: &Release) -> RepositoryResult<CreatedRelease> {
        let body = json!({
            "tag_name": release.tag,
            "target_commitish": release.sha,
            "name": release.tag,
            "body": release.notes,
        });
        match self.rest_as::<RestRelease>("POST", "releases", Some(&body)) {
            Ok(created) => Ok(CreatedRelease {
                id: created.id,
                url: created.html_url,
            }),
            Err(err) if has_status(&err, 422) && err.to_string().contains("already_exists") => {
                Err(RepositoryError::DuplicateRelease {
                    tag: release.tag.clone(),
                })
            }
            Err(err) => Err(err),
        }
    }

    fn add_labels(&self, number: u64, labels: &[String]) -> RepositoryResult<()> {
        self.rest(
            "POST",
            &format!("issues/{number}/labels"),
            Some(&json!({ "labels": labels })),
        )?;
        Ok(())
    }

    fn remove_labels(&self, number: u64, labels: &[String]) -> RepositoryResult<()> {
        for label in labels {
            let path = format!(
                "issues/{number}/labels/{}",
                utf8_percent_encode(label, SEGMENT)
            );
            match self.rest("DELETE", &path, None) {
                Ok(_) => {}
                Err(err) if has_status(&err, 404) => {
                    debug!(number, %label, "label was not set");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn default_branch(&self) -> RepositoryResult<String> {
        let repository: RestRepository = self.rest_as("GET", "", None)?;
        Ok(repository.default_branch)
    }
}

fn page_size(max_results: Option<usize>) -> usize {
    max_results.map_or(DEFAULT_PAGE_SIZE, |max| max.clamp(1, MAX_PAGE_SIZE))
}

/// Whether a failed `gh` call reported HTTP `status`.
fn has_status(err: &RepositoryError, status: u16) -> bool {
    matches!(err, RepositoryError::Transport(message) if message.contains(&format!("(HTTP {status})")))
}

/// Run `gh` with `args`, feeding `input` on stdin, and return its stdout.
fn gh(args: &[&str], input: Option<&str>) -> RepositoryResult<String> {
    debug!(?args, "running gh");
    let mut child = Command::new("gh")
        .args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| RepositoryError::Transport(format!("failed to execute gh: {e}")))?;

    if let Some(input) = input
        && let Some(mut stdin) = child.stdin.take()
    {
        stdin
            .write_all(input.as_bytes())
            .map_err(|e| RepositoryError::Transport(format!("failed to write to gh: {e}")))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| RepositoryError::Transport(format!("failed to run gh: {e}")))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let command = args.iter().take(4).copied().collect::<Vec<_>>().join(" ");
        Err(RepositoryError::Transport(if stdout.is_empty() {
            format!("gh {command} failed: {stderr}")
        } else {
            format!("gh {command} failed: {stderr}: {stdout}")
        }))
    }
}

/// Parse owner and repo from a git remote URL.
///
/// Handles both HTTPS and SSH formats:
/// - `https://github.com/owner/repo.git`
/// - `git@github.com:owner/repo.git`
pub fn parse_owner_repo(url: &str) -> Option<(String, String)> {
    let path = url.strip_prefix("git@").map_or_else(
        || {
            url.split("//")
                .nth(1)
                .and_then(|after_scheme| after_scheme.split_once('/').map(|(_, path)| path))
        },
        |rest| rest.split_once(':').map(|(_, path)| path),
    )?;

    let path = path.strip_suffix(".git").unwrap_or(path);
    let path = path.trim_end_matches('/');
    let (owner, repo) = path.split_once('/')?;

    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }

    Some((owner.to_string(), repo.to_string()))
}

/// Parse `owner/name` or anything [`parse_owner_repo`] accepts.
pub fn parse_repo_spec(spec: &str) -> Option<(String, String)> {
    let spec = spec.trim();
    parse_owner_repo(spec).or_else(|| {
        let (owner, name) = spec.split_once('/')?;
        let valid = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        (valid(owner) && valid(name)).then(|| (owner.to_string(), name.to_string()))
    })
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<T>,
    page_info: PageInfo,
}

impl<T> Connection<T> {
    fn into_page<U>(self, map: impl FnMut(T) -> Option<U>) -> Page<U> {
        Page {
            items: self.nodes.into_iter().filter_map(map).collect(),
            next_cursor: if self.page_info.has_next_page {
                self.page_info.end_cursor
            } else {
                None
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
struct NodeList<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

#[derive(Deserialize)]
struct Oid {
    oid: String,
}

#[derive(Deserialize)]
struct TagsData {
    repository: Option<TagsRepository>,
}

#[derive(Deserialize)]
struct TagsRepository {
    refs: Connection<TagNode>,
}

#[derive(Deserialize)]
struct TagNode {
    name: String,
    target: TagTarget,
}

/// A tag target: a commit, or an annotated tag wrapping one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagTarget {
    oid: Option<String>,
    committed_date: Option<String>,
    target: Option<Box<TagTarget>>,
}

impl TagNode {
    fn into_tag(self) -> Option<Tag> {
        let commit = match self.target.target {
            Some(inner) => *inner,
            None => self.target,
        };
        let Some(sha) = commit.oid else {
            debug!(tag = %self.name, "tag does not point at a commit");
            return None;
        };
        Some(Tag {
            sha,
            name: self.name,
            committed_date: commit.committed_date.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
struct HistoryData {
    repository: Option<HistoryRepository>,
}

#[derive(Deserialize)]
struct HistoryRepository {
    #[serde(rename = "ref")]
    git_ref: Option<HistoryRef>,
}

#[derive(Deserialize)]
struct HistoryRef {
    target: HistoryTarget,
}

#[derive(Deserialize)]
struct HistoryTarget {
    history: Option<Connection<CommitNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitNode {
    oid: String,
    message: String,
    associated_pull_requests: NodeList<PullRequestNode>,
}

impl CommitNode {
    fn into_commit(self) -> Commit {
        let mut candidates = self.associated_pull_requests.nodes;
        let merged_by = candidates.iter().position(|pr| {
            pr.merge_commit
                .as_ref()
                .is_some_and(|commit| commit.oid == self.oid)
        });
        let pull_request = if candidates.is_empty() {
            None
        } else {
            Some(candidates.swap_remove(merged_by.unwrap_or(0)))
        };

        Commit {
            is_merge_commit: merged_by.is_some(),
            pull_request: pull_request.map(|pr| pr.into_pull_request(Some(self.oid.clone()))),
            sha: self.oid,
            message: self.message,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    number: u64,
    title: String,
    body: Option<String>,
    permalink: String,
    head_ref_name: String,
    base_ref_name: String,
    merge_commit: Option<Oid>,
    labels: Option<NodeList<Named>>,
}

impl PullRequestNode {
    fn into_pull_request(self, sha: Option<String>) -> PullRequest {
        PullRequest {
            sha,
            number: self.number,
            title: self.title,
            body: self.body.unwrap_or_default(),
            permalink: self.permalink,
            head_branch_name: self.head_ref_name,
            base_branch_name: self.base_ref_name,
            merge_commit_oid: self.merge_commit.map(|commit| commit.oid),
            labels: self
                .labels
                .map(|labels| labels.nodes.into_iter().map(|label| label.name).collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct PullRequestsData {
    repository: Option<PullRequestsRepository>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestsRepository {
    pull_requests: Connection<PullRequestNode>,
}

#[derive(Deserialize)]
struct RestSha {
    sha: String,
}

#[derive(Deserialize)]
struct RestRef {
    object: RestSha,
}

#[derive(Deserialize)]
struct RestCommit {
    tree: RestSha,
}

#[derive(Deserialize)]
struct RestBranch {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct RestPull {
    number: u64,
    title: String,
    body: Option<String>,
    html_url: String,
    head: RestBranch,
    base: RestBranch,
    merge_commit_sha: Option<String>,
    #[serde(default)]
    labels: Vec<Named>,
}

impl RestPull {
    fn into_pull_request(self) -> PullRequest {
        PullRequest {
            sha: None,
            number: self.number,
            title: self.title,
            body: self.body.unwrap_or_default(),
            permalink: self.html_url,
            head_branch_name: self.head.name,
            base_branch_name: self.base.name,
            merge_commit_oid: self.merge_commit_sha,
            labels: self.labels.into_iter().map(|label| label.name).collect(),
        }
    }
}

#[derive(Deserialize)]
struct RestRelease {
    id: u64,
    html_url: String,
}

#[derive(Deserialize)]
struct RestRepository {
    default_branch: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_owner_repo_https() {
        let result = parse_owner_repo("https://github.com/johanflint/release-svp.git");
        assert_eq!(result, Some(("johanflint".into(), "release-svp".into())));
    }

    #[test]
    fn parse_owner_repo_ssh() {
        let result = parse_owner_repo("git@github.com:johanflint/release-svp");
        assert_eq!(result, Some(("johanflint".into(), "release-svp".into())));
    }

    #[test]
    fn parse_owner_repo_invalid() {
        assert!(parse_owner_repo("not-a-url").is_none());
        assert!(parse_owner_repo("").is_none());
        assert!(parse_owner_repo("https://github.com/only-owner").is_none());
    }

    #[test]
    fn repo_spec_accepts_owner_slash_name() {
        let repo = GhRepository::from_spec("johanflint/release-svp").unwrap();
        assert_eq!(repo.full_name(), "johanflint/release-svp");
        assert!(GhRepository::from_spec("owner/").is_none());
        assert!(GhRepository::from_spec("a b/c").is_none());
    }

    #[test]
    fn endpoints_are_scoped_to_the_repository() {
        let repo = GhRepository::new("o", "r");
        assert_eq!(repo.endpoint(""), "repos/o/r");
        assert_eq!(repo.endpoint("pulls/3"), "repos/o/r/pulls/3");
    }

    #[test]
    fn label_names_are_escaped() {
        let encoded = utf8_percent_encode("autorelease: pending", SEGMENT).to_string();
        assert_eq!(encoded, "autorelease%3A%20pending");
        let path = utf8_percent_encode("docs/read me.md", PATH).to_string();
        assert_eq!(path, "docs/read%20me.md");
    }

    #[test]
    fn status_is_read_from_gh_errors() {
        let err = RepositoryError::Transport("gh api failed: gh: Not Found (HTTP 404)".into());
        assert!(has_status(&err, 404));
        assert!(!has_status(&err, 422));
    }

    #[test]
    fn page_size_is_bounded() {
        assert_eq!(page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(page_size(Some(10)), 10);
        assert_eq!(page_size(Some(1000)), MAX_PAGE_SIZE);
    }

    #[test]
    fn annotated_tags_resolve_to_their_commit() {
        let node: TagNode = serde_json::from_value(json!({
            "name": "v1.0.0",
            "target": { "target": { "oid": "abc", "committedDate": "2025-01-01T00:00:00Z" } }
        }))
        .unwrap();
        let tag = node.into_tag().unwrap();
        assert_eq!(tag.sha, "abc");
        assert_eq!(tag.committed_date, "2025-01-01T00:00:00Z");
    }

    #[test]
    fn commit_prefers_the_pull_request_it_merged() {
        let node: CommitNode = serde_json::from_value(json!({
            "oid": "m1",
            "message": "Add things (#2)\n\nbody",
            "associatedPullRequests": { "nodes": [
                {
                    "number": 1, "title": "other", "body": null, "permalink": "p1",
                    "headRefName": "a", "baseRefName": "main",
                    "mergeCommit": { "oid": "zzz" }, "labels": { "nodes": [] }
                },
                {
                    "number": 2, "title": "Add things", "body": "b", "permalink": "p2",
                    "headRefName": "b", "baseRefName": "main",
                    "mergeCommit": { "oid": "m1" }, "labels": { "nodes": [{ "name": "feature" }] }
                }
            ]}
        }))
        .unwrap();
        let commit = node.into_commit();
        assert!(commit.is_merge_commit);
        let pr = commit.pull_request.unwrap();
        assert_eq!(pr.number, 2);
        assert_eq!(pr.sha.as_deref(), Some("m1"));
        assert_eq!(pr.merge_commit_oid.as_deref(), Some("m1"));
        assert_eq!(pr.labels, ["feature"]);
    }

    #[test]
    fn connection_without_next_page_has_no_cursor() {
        let connection: Connection<Named> = serde_json::from_value(json!({
            "nodes": [{ "name": "x" }],
            "pageInfo": { "hasNextPage": false, "endCursor": "c1" }
        }))
        .unwrap();
        let page = connection.into_page(|named| Some(named.name));
        assert_eq!(page.items, ["x"]);
        assert_eq!(page.next_cursor, None);
    }
}
