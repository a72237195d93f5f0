pub mod composite;
pub mod frequency;
pub mod normalize;
pub mod structure;

use crate::ai::{QualitativeAnalyzer, TextGenerator};
use crate::error::Result;
use crate::scan::{self, RepoSnapshot, RepoSummary, RepositorySource, UserActivity};
use crate::types::report::{RepositoryReport, UserReport};
use crate::types::scoring::{ScoreCard, WeightTable};
use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};

/// Entries kept in the "recent" lists of a user report.
pub const RECENT_ITEMS: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub workers: usize,
    pub messages_since: DateTime<Utc>,
    pub structure_depth: usize,
}

pub fn analyze_repository<G: TextGenerator>(
    snapshot: &RepoSnapshot,
    analyzer: &QualitativeAnalyzer<G>,
    weights: &WeightTable,
    now: DateTime<Utc>,
) -> RepositoryReport {
    let summary = &snapshot.summary;
    let velocity_metrics = snapshot
        .total_commits
        .map(|total| normalize::velocity(total, summary.created_at, now))
        .unwrap_or_default();
    let collaboration_metrics = snapshot
        .participation
        .as_ref()
        .map(|participation| {
            normalize::collaboration(
                participation.total_issues,
                participation.total_prs,
                participation.authors.len() as u64,
            )
        })
        .unwrap_or_default();
    let structure_metrics = snapshot
        .paths
        .as_deref()
        .map(structure::structure_metrics)
        .unwrap_or_default();
    let engagement_metrics = normalize::engagement(summary.stars, summary.forks, summary.watchers);

    let messages = snapshot.recent_messages.as_deref().unwrap_or_default();
    let ai_commit_analysis = analyzer.analyze_commit_quality(messages);
    let ai_structure_analysis = analyzer.analyze_project_structure(
        &structure_metrics.file_structure,
        snapshot.readme.as_deref(),
    );

    let card = ScoreCard {
        development_velocity: velocity_metrics.score,
        collaboration_index: collaboration_metrics.score,
        code_quality: ai_commit_analysis.score,
        documentation_maturity: ai_structure_analysis.score,
        project_structure: structure_metrics.score,
        community_engagement: engagement_metrics.score,
    };
    let assessment = composite::composite(&card, weights);
    tracing::info!(
        repo = %summary.full_name,
        final_score = assessment.final_score,
        level = assessment.maturity_level.label(),
        "repository scored"
    );

    RepositoryReport {
        repo_name: summary.full_name.clone(),
        created_at: summary.created_at,
        final_score: assessment.final_score,
        maturity_level: assessment.maturity_level,
        velocity_metrics,
        collaboration_metrics,
        structure_metrics,
        engagement_metrics,
        ai_commit_analysis,
        ai_structure_analysis,
    }
}

pub fn analyze_user<G: TextGenerator>(
    activity: &UserActivity,
    analyzer: &QualitativeAnalyzer<G>,
    since: NaiveDate,
    until: NaiveDate,
) -> UserReport {
    let frequency = frequency::commit_frequency(activity.stats.commits_count, since, until);
    tracing::info!(
        login = %activity.login,
        level = frequency.alert_level.as_str(),
        "commit frequency assessed"
    );

    UserReport {
        login: activity.login.clone(),
        repository: activity.repository.clone(),
        since,
        until,
        generated_at: Utc::now(),
        stats: activity.stats,
        frequency,
        commit_analysis: analyzer.analyze_commits_detailed(&activity.commits),
        issue_analysis: analyzer.analyze_issues_detailed(&activity.issues),
        review_analysis: analyzer.analyze_reviews_detailed(&activity.reviews),
        recent_commits: activity.commits.iter().take(RECENT_ITEMS).cloned().collect(),
        recent_issues: activity.issues.iter().take(RECENT_ITEMS).cloned().collect(),
        recent_pulls: activity.pulls.iter().take(RECENT_ITEMS).cloned().collect(),
        pull_additions: activity.pulls.iter().map(|pull| pull.additions).sum(),
        pull_changed_files: activity.pulls.iter().map(|pull| pull.changed_files).sum(),
    }
}

/// Highest final score first; equal scores fall back to name order.
pub fn rank(reports: &mut [RepositoryReport]) {
    reports.sort_by(|left, right| {
        right
            .final_score
            .total_cmp(&left.final_score)
            .then_with(|| left.repo_name.cmp(&right.repo_name))
    });
}

/// Collects and scores every repository on a dedicated pool.
///
/// A subject that panics is logged and left out; the remaining reports are
/// returned ranked.
pub fn analyze_organization<S, G>(
    source: &S,
    repos: Vec<RepoSummary>,
    analyzer: &QualitativeAnalyzer<G>,
    weights: &WeightTable,
    options: BatchOptions,
    now: DateTime<Utc>,
) -> Result<Vec<RepositoryReport>>
where
    S: RepositorySource + Sync,
    G: TextGenerator + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()?;
    let total = repos.len();

    let mut reports = pool.install(|| {
        repos
            .into_par_iter()
            .filter_map(|summary| {
                let name = summary.full_name.clone();
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    let snapshot = scan::collect_repository(
                        source,
                        summary,
                        options.messages_since,
                        options.structure_depth,
                    );
                    analyze_repository(&snapshot, analyzer, weights, now)
                }));
                match outcome {
                    Ok(report) => Some(report),
                    Err(_) => {
                        tracing::warn!(repo = %name, "repository analysis aborted; skipping");
                        None
                    }
                }
            })
            .collect::<Vec<_>>()
    });

    tracing::info!(analyzed = reports.len(), total, "organization batch finished");
    rank(&mut reports);
    Ok(reports)
}
