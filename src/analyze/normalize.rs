use crate::types::metrics::{CollaborationMetrics, EngagementMetrics, VelocityMetrics};
use crate::types::scoring::Score;
use chrono::{DateTime, Utc};

pub const VELOCITY_CEILING: f64 = 5.0;
pub const ACTIVITY_CEILING: f64 = 20.0;
pub const CONTRIBUTOR_CEILING: f64 = 5.0;
pub const STAR_CEILING: f64 = 10.0;
pub const FORK_CEILING: f64 = 5.0;
pub const WATCHER_CEILING: f64 = 10.0;

/// Linear ramp from 0 at `raw = 0` to 1 at `raw = ceiling`, clamped to [0, 1].
///
/// Non-finite input and non-positive ceilings map to 0.0.
pub fn normalize(raw: f64, ceiling: f64) -> Score {
    if !raw.is_finite() || ceiling.is_nan() || ceiling <= 0.0 {
        return 0.0;
    }
    (raw / ceiling).clamp(0.0, 1.0)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Commit velocity since the repository was created.
pub fn velocity(
    total_commits: u64,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> VelocityMetrics {
    let days = now.signed_duration_since(created_at).num_days();
    let weeks_since_creation = (days as f64 / 7.0).max(1.0);
    let commits_per_week = total_commits as f64 / weeks_since_creation;

    VelocityMetrics {
        total_commits,
        weeks_since_creation: round_to(weeks_since_creation, 1),
        commits_per_week: round_to(commits_per_week, 2),
        score: normalize(commits_per_week, VELOCITY_CEILING),
    }
}

/// Average of issue/PR activity and contributor diversity.
pub fn collaboration(
    total_issues: u64,
    total_prs: u64,
    unique_contributors: u64,
) -> CollaborationMetrics {
    let activity = normalize((total_issues + total_prs) as f64, ACTIVITY_CEILING);
    let diversity = normalize(unique_contributors as f64, CONTRIBUTOR_CEILING);

    CollaborationMetrics {
        total_issues,
        total_prs,
        unique_contributors,
        score: round_to((activity + diversity) / 2.0, 3),
    }
}

/// Unweighted average of star, fork and watcher ramps.
pub fn engagement(stars: u64, forks: u64, watchers: u64) -> EngagementMetrics {
    let star_score = normalize(stars as f64, STAR_CEILING);
    let fork_score = normalize(forks as f64, FORK_CEILING);
    let watch_score = normalize(watchers as f64, WATCHER_CEILING);

    EngagementMetrics {
        stars,
        forks,
        watchers,
        score: round_to((star_score + fork_score + watch_score) / 3.0, 3),
    }
}
