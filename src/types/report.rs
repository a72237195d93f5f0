use super::metrics::{
    CollaborationMetrics, EngagementMetrics, QualitativeResult, StructureMetrics, VelocityMetrics,
};
use super::scoring::{FrequencyAssessment, MaturityLevel, Score};
use crate::scan::{ActivityStats, CommitRecord, IssueRecord, PullRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryReport {
    pub repo_name: String,
    pub created_at: DateTime<Utc>,
    pub final_score: Score,
    pub maturity_level: MaturityLevel,
    pub velocity_metrics: VelocityMetrics,
    pub collaboration_metrics: CollaborationMetrics,
    pub structure_metrics: StructureMetrics,
    pub engagement_metrics: EngagementMetrics,
    pub ai_commit_analysis: QualitativeResult,
    pub ai_structure_analysis: QualitativeResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub org: String,
    pub created_since: NaiveDate,
    pub total_repos: usize,
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
}

impl RunMetadata {
    pub fn new(org: &str, created_since: NaiveDate, total_repos: usize) -> Self {
        Self {
            org: org.to_string(),
            created_since,
            total_repos,
            generated_at: Utc::now(),
            tool_version: format!("agilemeter v{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Ranked results of one organization run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationReport {
    pub metadata: RunMetadata,
    pub repositories: Vec<RepositoryReport>,
}

impl OrganizationReport {
    pub fn average_score(&self) -> Score {
        if self.repositories.is_empty() {
            return 0.0;
        }
        let total = self
            .repositories
            .iter()
            .map(|report| report.final_score)
            .sum::<Score>();
        total / self.repositories.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserReport {
    pub login: String,
    pub repository: String,
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub stats: ActivityStats,
    pub frequency: FrequencyAssessment,
    pub commit_analysis: QualitativeResult,
    pub issue_analysis: QualitativeResult,
    pub review_analysis: QualitativeResult,
    pub recent_commits: Vec<CommitRecord>,
    pub recent_issues: Vec<IssueRecord>,
    pub recent_pulls: Vec<PullRecord>,
    pub pull_additions: u64,
    pub pull_changed_files: u64,
}

impl UserReport {
    /// Monthly rate over the window, with a month taken as four weeks.
    pub fn per_month(&self, count: u64) -> f64 {
        let months = (self.frequency.weeks_total as f64 / 4.0).max(1.0);
        count as f64 / months
    }

    pub fn average_per_pull(&self, total: u64) -> f64 {
        total as f64 / self.stats.prs_count.max(1) as f64
    }

    pub fn add_remove_ratio(&self) -> f64 {
        self.stats.lines_added as f64 / self.stats.lines_removed.max(1) as f64
    }

    pub fn lines_per_commit(&self) -> f64 {
        self.stats.lines_added as f64 / self.stats.commits_count.max(1) as f64
    }
}
