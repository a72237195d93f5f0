use super::normalize::round_to;
use crate::types::scoring::{AlertLevel, FrequencyAssessment};
use chrono::NaiveDate;

const HIGH_INACTIVITY_SHARE: f64 = 0.7;
const MEDIUM_INACTIVITY_SHARE: f64 = 0.4;
const LOW_FREQUENCY: f64 = 0.5;
const GOOD_FREQUENCY: f64 = 1.0;

/// Estimates inactivity over a window from a commit count alone.
///
/// Each commit is assumed to cover at most one distinct week, so
/// `weeks_inactive = weeks_total - commit_count`. Commit timestamps are not
/// consulted: fifty commits in a single week still count as fifty active
/// weeks. An inverted or sub-week window is treated as one week.
pub fn commit_frequency(
    commit_count: u64,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> FrequencyAssessment {
    let days = window_end.signed_duration_since(window_start).num_days();
    let weeks_total = u64::try_from(days / 7).unwrap_or(0).max(1);
    let commits_per_week = commit_count as f64 / weeks_total as f64;

    let (weeks_inactive, alert_level, message) = if commit_count == 0 {
        (
            weeks_total,
            AlertLevel::Critical,
            format!("CRITICAL: {weeks_total} weeks without any commit"),
        )
    } else {
        let weeks_inactive = weeks_total.saturating_sub(commit_count);
        let inactive = weeks_inactive as f64;
        let total = weeks_total as f64;

        let (level, message) = if commits_per_week >= GOOD_FREQUENCY {
            (
                AlertLevel::Good,
                format!("Good frequency: {commits_per_week:.1} commits/week"),
            )
        } else if inactive >= total * HIGH_INACTIVITY_SHARE {
            (
                AlertLevel::High,
                format!("ALERT: ~{weeks_inactive} inactive weeks out of {weeks_total} weeks"),
            )
        } else if inactive >= total * MEDIUM_INACTIVITY_SHARE {
            (
                AlertLevel::Medium,
                format!(
                    "Attention: ~{weeks_inactive} low-activity weeks out of {weeks_total} weeks"
                ),
            )
        } else if commits_per_week < LOW_FREQUENCY {
            (
                AlertLevel::Low,
                format!("Low frequency: {commits_per_week:.1} commits/week"),
            )
        } else {
            (
                AlertLevel::Normal,
                format!("Adequate frequency: {commits_per_week:.1} commits/week"),
            )
        };
        (weeks_inactive, level, message)
    };

    FrequencyAssessment {
        commits_per_week: round_to(commits_per_week, 2),
        weeks_total,
        weeks_inactive,
        alert_level,
        message,
    }
}
