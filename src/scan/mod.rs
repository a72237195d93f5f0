pub mod github;

use crate::error::{AgileError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Commit messages sampled per repository for the commit-quality analysis.
pub const REPO_MESSAGE_SAMPLE: usize = 15;

/// `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoSlug {
    type Err = AgileError;

    fn from_str(value: &str) -> Result<Self> {
        let mut parts = value.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(AgileError::InvalidRepoSlug(value.to_string())),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoSummary {
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
}

/// Issue and pull request totals with their distinct author logins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Participation {
    pub total_issues: u64,
    pub total_prs: u64,
    pub authors: HashSet<String>,
}

impl Participation {
    pub fn record_author(&mut self, login: Option<&str>) {
        if let Some(login) = login.filter(|login| !login.is_empty()) {
            self.authors.insert(login.to_lowercase());
        }
    }
}

/// Everything collected for one repository. `None` marks a facet that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoSnapshot {
    pub summary: RepoSummary,
    pub total_commits: Option<u64>,
    pub recent_messages: Option<Vec<String>>,
    pub participation: Option<Participation>,
    pub paths: Option<Vec<String>>,
    pub readme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
    pub date: DateTime<Utc>,
    pub files_count: u64,
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub comments_count: u64,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRecord {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub merged: bool,
    pub comments_count: u64,
    pub review_comments_count: u64,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewKind {
    PrComment,
    ReviewComment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    pub kind: ReviewKind,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub pr_number: u64,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityStats {
    pub commits_count: u64,
    pub issues_count: u64,
    pub prs_count: u64,
    pub reviews_count: u64,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub files_changed: u64,
}

/// One contributor's sampled activity in one repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserActivity {
    pub repository: String,
    pub login: String,
    pub commits: Vec<CommitRecord>,
    pub issues: Vec<IssueRecord>,
    pub pulls: Vec<PullRecord>,
    pub reviews: Vec<ReviewRecord>,
    pub stats: ActivityStats,
}

impl UserActivity {
    pub fn new(
        repository: String,
        login: String,
        commits: Vec<CommitRecord>,
        issues: Vec<IssueRecord>,
        pulls: Vec<PullRecord>,
        reviews: Vec<ReviewRecord>,
    ) -> Self {
        let stats = ActivityStats {
            commits_count: commits.len() as u64,
            issues_count: issues.len() as u64,
            prs_count: pulls.len() as u64,
            reviews_count: reviews.len() as u64,
            lines_added: commits.iter().map(|commit| commit.additions).sum(),
            lines_removed: commits.iter().map(|commit| commit.deletions).sum(),
            files_changed: commits.iter().map(|commit| commit.files_count).sum(),
        };
        Self {
            repository,
            login,
            commits,
            issues,
            pulls,
            reviews,
            stats,
        }
    }
}

/// Hosted version-control data needed by the scorers.
///
/// `repo` arguments are `owner/name` full names. Every method may fail
/// independently; callers decide how a failed facet degrades.
pub trait RepositorySource {
    fn authenticated_login(&self) -> Result<String>;
    fn organization_repos(&self, org: &str) -> Result<Vec<RepoSummary>>;
    fn repository(&self, slug: &RepoSlug) -> Result<RepoSummary>;

    fn commit_count(&self, repo: &str, since: DateTime<Utc>) -> Result<u64>;
    fn commit_messages(&self, repo: &str, since: DateTime<Utc>, limit: usize)
        -> Result<Vec<String>>;
    fn participation(&self, repo: &str) -> Result<Participation>;
    fn path_listing(&self, repo: &str, depth: usize) -> Result<Vec<String>>;
    /// README text, `Ok(None)` when the repository has none.
    fn readme(&self, repo: &str) -> Result<Option<String>>;

    fn user_commits(
        &self,
        repo: &str,
        login: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CommitRecord>>;
    fn user_issues(
        &self,
        repo: &str,
        login: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<IssueRecord>>;
    fn user_pulls(&self, repo: &str, login: &str, limit: usize) -> Result<Vec<PullRecord>>;
    fn user_reviews(
        &self,
        repo: &str,
        login: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ReviewRecord>>;
}

fn facet<T>(subject: &str, facet: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(subject, facet, error = %err, "collection failed; using empty facet");
            None
        }
    }
}

/// Repositories of `org` created on or after `created_since`.
pub fn select_repositories<S: RepositorySource>(
    source: &S,
    org: &str,
    created_since: DateTime<Utc>,
) -> Result<Vec<RepoSummary>> {
    let repos = source.organization_repos(org)?;
    let listed = repos.len();
    let selected = repos
        .into_iter()
        .filter(|repo| repo.created_at >= created_since)
        .collect::<Vec<_>>();
    tracing::info!(org, listed, selected = selected.len(), "selected repositories");
    Ok(selected)
}

pub fn collect_repository<S: RepositorySource>(
    source: &S,
    summary: RepoSummary,
    messages_since: DateTime<Utc>,
    structure_depth: usize,
) -> RepoSnapshot {
    let name = summary.full_name.as_str();
    tracing::info!(repo = name, "collecting repository");

    let total_commits = facet(
        name,
        "commits",
        source.commit_count(name, summary.created_at),
    );
    let recent_messages = facet(
        name,
        "commit messages",
        source.commit_messages(name, messages_since, REPO_MESSAGE_SAMPLE),
    );
    let participation = facet(name, "participation", source.participation(name));
    let paths = facet(
        name,
        "structure",
        source.path_listing(name, structure_depth),
    );
    let readme = facet(name, "readme", source.readme(name)).flatten();

    RepoSnapshot {
        summary,
        total_commits,
        recent_messages,
        participation,
        paths,
        readme,
    }
}

pub fn collect_user<S: RepositorySource>(
    source: &S,
    repo: &RepoSummary,
    login: &str,
    since: DateTime<Utc>,
    sample_size: usize,
) -> UserActivity {
    let name = repo.full_name.as_str();
    tracing::info!(repo = name, login, "collecting user activity");

    let commits = facet(
        name,
        "commits",
        source.user_commits(name, login, since, sample_size),
    )
    .unwrap_or_default();
    let issues = facet(
        name,
        "issues",
        source.user_issues(name, login, since, sample_size),
    )
    .unwrap_or_default();
    let pulls = facet(name, "pull requests", source.user_pulls(name, login, sample_size))
        .unwrap_or_default();
    let reviews = facet(
        name,
        "reviews",
        source.user_reviews(name, login, since, sample_size),
    )
    .unwrap_or_default();

    let activity = UserActivity::new(
        repo.full_name.clone(),
        login.to_string(),
        commits,
        issues,
        pulls,
        reviews,
    );
    tracing::info!(
        commits = activity.stats.commits_count,
        issues = activity.stats.issues_count,
        prs = activity.stats.prs_count,
        reviews = activity.stats.reviews_count,
        "collection finished"
    );
    activity
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .expect("valid date")
    }

    pub(crate) fn summary(name: &str, created_at: DateTime<Utc>) -> RepoSummary {
        RepoSummary {
            full_name: name.to_string(),
            created_at,
            stars: 4,
            forks: 1,
            watchers: 4,
        }
    }

    pub(crate) fn commit(message: &str, additions: u64, deletions: u64) -> CommitRecord {
        CommitRecord {
            sha: format!("sha-{message}"),
            message: message.to_string(),
            date: at(2024, 9, 2),
            files_count: 2,
            additions,
            deletions,
        }
    }

    fn failure() -> AgileError {
        AgileError::GitHubApi {
            status: 500,
            url: "/test".to_string(),
            body: "boom".to_string(),
        }
    }

    /// In-memory source; `failing` names facets that return an error.
    #[derive(Debug, Default)]
    pub(crate) struct FakeSource {
        pub repos: Vec<RepoSummary>,
        pub total_commits: u64,
        pub messages: Vec<String>,
        pub participation: Participation,
        pub paths: Vec<String>,
        pub readme: Option<String>,
        pub commits: Vec<CommitRecord>,
        pub issues: Vec<IssueRecord>,
        pub pulls: Vec<PullRecord>,
        pub reviews: Vec<ReviewRecord>,
        pub failing: Vec<&'static str>,
    }

    impl FakeSource {
        fn check(&self, facet: &'static str) -> Result<()> {
            if self.failing.contains(&facet) {
                Err(failure())
            } else {
                Ok(())
            }
        }
    }

    impl RepositorySource for FakeSource {
        fn authenticated_login(&self) -> Result<String> {
            self.check("auth")?;
            Ok("tester".to_string())
        }

        fn organization_repos(&self, _org: &str) -> Result<Vec<RepoSummary>> {
            self.check("repos")?;
            Ok(self.repos.clone())
        }

        fn repository(&self, slug: &RepoSlug) -> Result<RepoSummary> {
            self.check("repository")?;
            Ok(summary(&slug.to_string(), at(2024, 1, 1)))
        }

        fn commit_count(&self, _repo: &str, _since: DateTime<Utc>) -> Result<u64> {
            self.check("commit_count")?;
            Ok(self.total_commits)
        }

        fn commit_messages(
            &self,
            _repo: &str,
            _since: DateTime<Utc>,
            limit: usize,
        ) -> Result<Vec<String>> {
            self.check("commit_messages")?;
            Ok(self.messages.iter().take(limit).cloned().collect())
        }

        fn participation(&self, _repo: &str) -> Result<Participation> {
            self.check("participation")?;
            Ok(self.participation.clone())
        }

        fn path_listing(&self, _repo: &str, _depth: usize) -> Result<Vec<String>> {
            self.check("paths")?;
            Ok(self.paths.clone())
        }

        fn readme(&self, _repo: &str) -> Result<Option<String>> {
            self.check("readme")?;
            Ok(self.readme.clone())
        }

        fn user_commits(
            &self,
            _repo: &str,
            _login: &str,
            _since: DateTime<Utc>,
            limit: usize,
        ) -> Result<Vec<CommitRecord>> {
            self.check("user_commits")?;
            Ok(self.commits.iter().take(limit).cloned().collect())
        }

        fn user_issues(
            &self,
            _repo: &str,
            _login: &str,
            _since: DateTime<Utc>,
            limit: usize,
        ) -> Result<Vec<IssueRecord>> {
            self.check("user_issues")?;
            Ok(self.issues.iter().take(limit).cloned().collect())
        }

        fn user_pulls(&self, _repo: &str, _login: &str, limit: usize) -> Result<Vec<PullRecord>> {
            self.check("user_pulls")?;
            Ok(self.pulls.iter().take(limit).cloned().collect())
        }

        fn user_reviews(
            &self,
            _repo: &str,
            _login: &str,
            _since: DateTime<Utc>,
            limit: usize,
        ) -> Result<Vec<ReviewRecord>> {
            self.check("user_reviews")?;
            Ok(self.reviews.iter().take(limit).cloned().collect())
        }
    }

    #[test]
    fn repo_slug_parses_owner_and_name() {
        let slug: RepoSlug = "acme/widgets".parse().expect("valid slug");
        assert_eq!(slug.owner, "acme");
        assert_eq!(slug.name, "widgets");
        assert_eq!(slug.to_string(), "acme/widgets");
    }

    #[test]
    fn repo_slug_rejects_malformed_values() {
        for value in ["acme", "acme/", "/widgets", "a/b/c", ""] {
            let err = value.parse::<RepoSlug>().unwrap_err();
            assert!(matches!(err, AgileError::InvalidRepoSlug(_)), "{value}");
        }
    }

    #[test]
    fn participation_lowercases_authors() {
        let mut participation = Participation::default();
        participation.record_author(Some("Alice"));
        participation.record_author(Some("alice"));
        participation.record_author(Some(""));
        participation.record_author(None);
        participation.record_author(Some("bob"));
        assert_eq!(participation.authors.len(), 2);
    }

    #[test]
    fn select_repositories_filters_by_creation_date() {
        let source = FakeSource {
            repos: vec![
                summary("acme/old", at(2023, 12, 31)),
                summary("acme/edge", at(2024, 1, 1)),
                summary("acme/new", at(2024, 6, 1)),
            ],
            ..FakeSource::default()
        };
        let selected = select_repositories(&source, "acme", at(2024, 1, 1)).expect("listing");
        let names = selected
            .iter()
            .map(|repo| repo.full_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["acme/edge", "acme/new"]);
    }

    #[test]
    fn failed_listing_is_an_error() {
        let source = FakeSource {
            failing: vec!["repos"],
            ..FakeSource::default()
        };
        assert!(select_repositories(&source, "acme", at(2024, 1, 1)).is_err());
    }

    #[test]
    fn failed_facets_are_isolated() {
        let source = FakeSource {
            total_commits: 40,
            messages: vec!["feat: one".to_string()],
            paths: vec!["README.md".to_string()],
            readme: Some("# Widgets".to_string()),
            failing: vec!["participation", "readme"],
            ..FakeSource::default()
        };
        let snapshot = collect_repository(
            &source,
            summary("acme/widgets", at(2024, 1, 1)),
            at(2024, 1, 1),
            2,
        );
        assert_eq!(snapshot.total_commits, Some(40));
        assert_eq!(snapshot.recent_messages.as_deref().map(<[String]>::len), Some(1));
        assert_eq!(snapshot.participation, None);
        assert_eq!(snapshot.paths, Some(vec!["README.md".to_string()]));
        assert_eq!(snapshot.readme, None);
    }

    #[test]
    fn user_activity_accumulates_stats() {
        let source = FakeSource {
            commits: vec![commit("feat: a", 10, 2), commit("fix: b", 5, 5)],
            failing: vec!["user_reviews"],
            ..FakeSource::default()
        };
        let repo = summary("acme/widgets", at(2024, 1, 1));
        let activity = collect_user(&source, &repo, "dev", at(2024, 8, 1), 20);
        assert_eq!(activity.stats.commits_count, 2);
        assert_eq!(activity.stats.lines_added, 15);
        assert_eq!(activity.stats.lines_removed, 7);
        assert_eq!(activity.stats.files_changed, 4);
        assert_eq!(activity.stats.reviews_count, 0);
        assert!(activity.reviews.is_empty());
    }

    #[test]
    fn user_collection_respects_sample_size() {
        let source = FakeSource {
            commits: (0..30).map(|i| commit(&format!("c{i}"), 1, 0)).collect(),
            ..FakeSource::default()
        };
        let repo = summary("acme/widgets", at(2024, 1, 1));
        let activity = collect_user(&source, &repo, "dev", at(2024, 8, 1), 20);
        assert_eq!(activity.commits.len(), 20);
        assert_eq!(activity.stats.commits_count, 20);
    }
}
