use super::{
    CommitRecord, IssueRecord, Participation, PullRecord, RepoSlug, RepoSummary,
    RepositorySource, ReviewKind, ReviewRecord,
};
use crate::error::{AgileError, Result};
use crate::types::config::GitHubSettings;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const USER_AGENT: &str = concat!("agilemeter/", env!("CARGO_PKG_VERSION"));
const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_RAW: &str = "application/vnd.github.raw";
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiRepo {
    full_name: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    watchers_count: u64,
}

impl From<ApiRepo> for RepoSummary {
    fn from(repo: ApiRepo) -> Self {
        Self {
            full_name: repo.full_name,
            created_at: repo.created_at,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            watchers: repo.watchers_count,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    commit: ApiCommitDetail,
    #[serde(default)]
    stats: Option<ApiCommitStats>,
    #[serde(default)]
    files: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    #[serde(default)]
    message: String,
    author: Option<ApiGitSignature>,
}

#[derive(Debug, Deserialize)]
struct ApiGitSignature {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitStats {
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

#[derive(Debug, Deserialize)]
struct ApiLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiIssue {
    number: u64,
    #[serde(default)]
    title: String,
    body: Option<String>,
    #[serde(default)]
    state: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    labels: Vec<ApiLabel>,
    user: Option<ApiUser>,
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiPull {
    number: u64,
    #[serde(default)]
    title: String,
    body: Option<String>,
    #[serde(default)]
    state: String,
    created_at: DateTime<Utc>,
    user: Option<ApiUser>,
    #[serde(default)]
    merged: bool,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    review_comments: u64,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    changed_files: u64,
}

impl From<ApiPull> for PullRecord {
    fn from(pull: ApiPull) -> Self {
        Self {
            number: pull.number,
            title: pull.title,
            body: pull.body.unwrap_or_default(),
            state: pull.state,
            created_at: pull.created_at,
            merged: pull.merged,
            comments_count: pull.comments,
            review_comments_count: pull.review_comments,
            additions: pull.additions,
            deletions: pull.deletions,
            changed_files: pull.changed_files,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiComment {
    body: Option<String>,
    created_at: DateTime<Utc>,
    user: Option<ApiUser>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    issue_url: Option<String>,
    #[serde(default)]
    pull_request_url: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

impl ApiComment {
    fn is_by(&self, login: &str) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| user.login.eq_ignore_ascii_case(login))
    }
}

#[derive(Debug, Deserialize)]
struct ApiContent {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Trailing number of an API URL such as `.../issues/42`.
fn trailing_number(url: Option<&str>) -> u64 {
    url.and_then(|url| url.rsplit('/').next())
        .and_then(|segment| segment.parse().ok())
        .unwrap_or(0)
}

/// Blocking GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    per_page: u32,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings, token: Option<String>) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            token: token.filter(|token| !token.trim().is_empty()),
            per_page: settings.per_page,
        })
    }

    fn request(&self, path: &str, accept: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let builder = self
            .client
            .get(url)
            .header("Accept", accept)
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn send(&self, path: &str, builder: RequestBuilder) -> Result<Response> {
        tracing::debug!(path, "github request");
        let response = builder.send()?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(AgileError::GitHubApi {
                status,
                url: path.to_string(),
                body,
            });
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.send(path, self.request(path, ACCEPT_JSON).query(query))?;
        Ok(response.json()?)
    }

    /// Walks `page=1..` until a short page, keeping items that pass `keep`,
    /// and stops early once `limit` items are kept.
    fn paginate<T, F>(
        &self,
        path: &str,
        query: &[(&str, String)],
        limit: Option<usize>,
        mut keep: F,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: FnMut(&T) -> bool,
    {
        let mut items = Vec::new();
        let per_page = self.per_page.to_string();
        for page in 1.. {
            let mut params = query.to_vec();
            params.push(("per_page", per_page.clone()));
            params.push(("page", page.to_string()));
            let batch: Vec<T> = self.get_json(path, &params)?;
            let fetched = batch.len();
            for item in batch {
                if limit.is_some_and(|limit| items.len() >= limit) {
                    return Ok(items);
                }
                if keep(&item) {
                    items.push(item);
                }
            }
            if limit.is_some_and(|limit| items.len() >= limit) || fetched < self.per_page as usize
            {
                break;
            }
        }
        Ok(items)
    }

    fn walk_contents(
        &self,
        repo: &str,
        dir: &str,
        depth_left: usize,
        out: &mut Vec<String>,
    ) -> Result<()> {
        if depth_left == 0 {
            return Ok(());
        }
        let path = if dir.is_empty() {
            format!("/repos/{repo}/contents")
        } else {
            format!("/repos/{repo}/contents/{dir}")
        };
        let entries: Vec<ApiContent> = self.get_json(&path, &[])?;
        for entry in entries {
            out.push(entry.path.clone());
            if entry.kind == "dir" && depth_left > 1 {
                if let Err(err) = self.walk_contents(repo, &entry.path, depth_left - 1, out) {
                    tracing::debug!(repo, dir = %entry.path, error = %err, "skipping unreadable directory");
                }
            }
        }
        Ok(())
    }

    fn commit_detail(&self, repo: &str, sha: &str) -> Result<ApiCommit> {
        self.get_json(&format!("/repos/{repo}/commits/{sha}"), &[])
    }

    fn pull_detail(&self, repo: &str, number: u64) -> Result<ApiPull> {
        self.get_json(&format!("/repos/{repo}/pulls/{number}"), &[])
    }
}

impl RepositorySource for GitHubClient {
    fn authenticated_login(&self) -> Result<String> {
        let user: ApiUser = self.get_json("/user", &[])?;
        Ok(user.login)
    }

    fn organization_repos(&self, org: &str) -> Result<Vec<RepoSummary>> {
        let repos: Vec<ApiRepo> = self.paginate(
            &format!("/orgs/{org}/repos"),
            &[("type", "all".to_string())],
            None,
            |_| true,
        )?;
        Ok(repos.into_iter().map(RepoSummary::from).collect())
    }

    fn repository(&self, slug: &RepoSlug) -> Result<RepoSummary> {
        let repo: ApiRepo = self.get_json(&format!("/repos/{slug}"), &[])?;
        Ok(repo.into())
    }

    fn commit_count(&self, repo: &str, since: DateTime<Utc>) -> Result<u64> {
        let commits: Vec<serde_json::Value> = self.paginate(
            &format!("/repos/{repo}/commits"),
            &[("since", timestamp(since))],
            None,
            |_| true,
        )?;
        Ok(commits.len() as u64)
    }

    fn commit_messages(
        &self,
        repo: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<String>> {
        let commits: Vec<ApiCommit> = self.paginate(
            &format!("/repos/{repo}/commits"),
            &[("since", timestamp(since))],
            Some(limit),
            |_| true,
        )?;
        Ok(commits
            .into_iter()
            .map(|commit| commit.commit.message.trim().to_string())
            .filter(|message| !message.is_empty())
            .collect())
    }

    fn participation(&self, repo: &str) -> Result<Participation> {
        let mut participation = Participation::default();
        let issues: Vec<ApiIssue> = self.paginate(
            &format!("/repos/{repo}/issues"),
            &[("state", "all".to_string())],
            None,
            |issue: &ApiIssue| issue.pull_request.is_none(),
        )?;
        for issue in &issues {
            participation.record_author(issue.user.as_ref().map(|user| user.login.as_str()));
        }
        let pulls: Vec<ApiPull> = self.paginate(
            &format!("/repos/{repo}/pulls"),
            &[("state", "all".to_string())],
            None,
            |_| true,
        )?;
        for pull in &pulls {
            participation.record_author(pull.user.as_ref().map(|user| user.login.as_str()));
        }
        participation.total_issues = issues.len() as u64;
        participation.total_prs = pulls.len() as u64;
        Ok(participation)
    }

    fn path_listing(&self, repo: &str, depth: usize) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        self.walk_contents(repo, "", depth, &mut paths)?;
        Ok(paths)
    }

    fn readme(&self, repo: &str) -> Result<Option<String>> {
        let path = format!("/repos/{repo}/readme");
        match self.send(&path, self.request(&path, ACCEPT_RAW)) {
            Ok(response) => Ok(Some(response.text()?)),
            Err(AgileError::GitHubApi { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn user_commits(
        &self,
        repo: &str,
        login: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CommitRecord>> {
        let listed: Vec<ApiCommit> = self.paginate(
            &format!("/repos/{repo}/commits"),
            &[("author", login.to_string()), ("since", timestamp(since))],
            Some(limit),
            |commit: &ApiCommit| commit.commit.author.is_some(),
        )?;
        let mut records = Vec::with_capacity(listed.len());
        for commit in listed {
            let Some(author) = commit.commit.author.as_ref() else {
                continue;
            };
            let mut record = CommitRecord {
                sha: commit.sha.clone(),
                message: commit.commit.message.clone(),
                date: author.date,
                files_count: 0,
                additions: 0,
                deletions: 0,
            };
            match self.commit_detail(repo, &commit.sha) {
                Ok(detail) => {
                    record.files_count = detail.files.map_or(0, |files| files.len() as u64);
                    if let Some(stats) = detail.stats {
                        record.additions = stats.additions;
                        record.deletions = stats.deletions;
                    }
                }
                Err(err) => {
                    tracing::debug!(repo, sha = %commit.sha, error = %err, "commit detail unavailable");
                }
            }
            records.push(record);
        }
        Ok(records)
    }

    fn user_issues(
        &self,
        repo: &str,
        login: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<IssueRecord>> {
        let issues: Vec<ApiIssue> = self.paginate(
            &format!("/repos/{repo}/issues"),
            &[
                ("creator", login.to_string()),
                ("state", "all".to_string()),
                ("since", timestamp(since)),
            ],
            Some(limit),
            |issue: &ApiIssue| issue.pull_request.is_none(),
        )?;
        Ok(issues
            .into_iter()
            .map(|issue| IssueRecord {
                number: issue.number,
                title: issue.title,
                body: issue.body.unwrap_or_default(),
                state: issue.state,
                created_at: issue.created_at,
                comments_count: issue.comments,
                labels: issue.labels.into_iter().map(|label| label.name).collect(),
            })
            .collect())
    }

    fn user_pulls(&self, repo: &str, login: &str, limit: usize) -> Result<Vec<PullRecord>> {
        let listed: Vec<ApiPull> = self.paginate(
            &format!("/repos/{repo}/pulls"),
            &[
                ("state", "all".to_string()),
                ("sort", "created".to_string()),
                ("direction", "desc".to_string()),
            ],
            Some(limit),
            |pull: &ApiPull| {
                pull.user
                    .as_ref()
                    .is_some_and(|user| user.login.eq_ignore_ascii_case(login))
            },
        )?;
        Ok(listed
            .into_iter()
            .map(|pull| match self.pull_detail(repo, pull.number) {
                Ok(detail) => PullRecord::from(detail),
                Err(err) => {
                    tracing::debug!(repo, number = pull.number, error = %err, "pull detail unavailable");
                    PullRecord::from(pull)
                }
            })
            .collect())
    }

    fn user_reviews(
        &self,
        repo: &str,
        login: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ReviewRecord>> {
        let query = [
            ("since", timestamp(since)),
            ("sort", "created".to_string()),
            ("direction", "desc".to_string()),
        ];
        let discussion: Vec<ApiComment> = self.paginate(
            &format!("/repos/{repo}/issues/comments"),
            &query,
            Some(limit),
            |comment: &ApiComment| comment.is_by(login) && comment.html_url.contains("/pull/"),
        )?;
        let mut reviews = discussion
            .into_iter()
            .map(|comment| ReviewRecord {
                kind: ReviewKind::PrComment,
                pr_number: trailing_number(comment.issue_url.as_deref()),
                body: comment.body.unwrap_or_default(),
                created_at: comment.created_at,
                path: None,
            })
            .collect::<Vec<_>>();

        let remaining = limit.saturating_sub(reviews.len());
        if remaining > 0 {
            let inline: Vec<ApiComment> = self.paginate(
                &format!("/repos/{repo}/pulls/comments"),
                &query,
                Some(remaining),
                |comment: &ApiComment| comment.is_by(login),
            )?;
            reviews.extend(inline.into_iter().map(|comment| ReviewRecord {
                kind: ReviewKind::ReviewComment,
                pr_number: trailing_number(comment.pull_request_url.as_deref()),
                body: comment.body.unwrap_or_default(),
                created_at: comment.created_at,
                path: comment.path,
            }));
        }
        Ok(reviews)
    }
}
