use crate::types::metrics::QualitativeResult;
use crate::types::report::{OrganizationReport, UserReport};

const COMMIT_PREVIEW_CHARS: usize = 100;

const STRENGTHS: [&str; 3] = [
    "Consistent activity in the repository",
    "Participation in different aspects of development",
    "Engagement with the team through reviews",
];

const IMPROVEMENT_AREAS: [&str; 3] = [
    "**Commits:** Focus on more descriptive and atomic messages",
    "**Issues:** Improve the structure of user stories",
    "**Reviews:** Provide more specific and constructive feedback",
];

const NEXT_STEPS: [&str; 3] = [
    "Apply the specific recommendations for each area",
    "Monitor progress monthly",
    "Ask the team for feedback on the improvements",
];

fn numbered(output: &mut String, items: &[impl AsRef<str>]) {
    for (index, item) in items.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", index + 1, item.as_ref()));
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub fn organization_markdown(report: &OrganizationReport) -> String {
    let meta = &report.metadata;
    let mut output = String::new();
    output.push_str("# Agile Maturity Report\n\n");
    output.push_str(&format!(
        "Organization: {}  \nCreated since: {}  \nRepositories: {}  \nGenerated: {}\n\n",
        meta.org,
        meta.created_since,
        meta.total_repos,
        meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("Average score: {:.3}\n\n", report.average_score()));

    output.push_str("## Ranking\n\n");
    if report.repositories.is_empty() {
        output.push_str("- none\n");
        return output;
    }
    output.push_str(
        "| # | Repository | Score | Level | Commits/week | Contributors | Issues | PRs | Stars | AI commits | AI structure |\n",
    );
    output.push_str("|---|---|---|---|---|---|---|---|---|---|---|\n");
    for (index, repo) in report.repositories.iter().enumerate() {
        output.push_str(&format!(
            "| {} | {} | {:.3} | {} | {:.2} | {} | {} | {} | {} | {:.2} | {:.2} |\n",
            index + 1,
            repo.repo_name,
            repo.final_score,
            repo.maturity_level.label(),
            repo.velocity_metrics.commits_per_week,
            repo.collaboration_metrics.unique_contributors,
            repo.collaboration_metrics.total_issues,
            repo.collaboration_metrics.total_prs,
            repo.engagement_metrics.stars,
            repo.ai_commit_analysis.score,
            repo.ai_structure_analysis.score
        ));
    }

    output.push_str("\n## Recommendations\n");
    for repo in &report.repositories {
        output.push_str(&format!("\n### {}\n\n", repo.repo_name));
        let recommendations = repo
            .ai_commit_analysis
            .recommendations
            .iter()
            .chain(&repo.ai_structure_analysis.recommendations)
            .collect::<Vec<_>>();
        if recommendations.is_empty() {
            output.push_str("- none\n");
        } else {
            for recommendation in recommendations {
                output.push_str(&format!("- {recommendation}\n"));
            }
        }
    }
    output
}

fn analysis_section(output: &mut String, title: &str, area: &str, result: &QualitativeResult) {
    output.push_str(&format!("## {title}\n\n"));
    output.push_str(&format!("### Score: {:.2}/1.0\n\n", result.score));
    output.push_str(&format!("{}\n\n", result.analysis));
    output.push_str(&format!("### Recommendations for {area}:\n"));
    numbered(output, &result.recommendations);
}

/// Narrative report for one contributor.
pub fn user_markdown(report: &UserReport) -> String {
    let stats = &report.stats;
    let frequency = &report.frequency;
    let marker = frequency.alert_level.marker();
    let mut output = String::new();

    output.push_str("# Detailed Agile Practices Report\n\n");
    output.push_str(&format!(
        "**User:** {}  \n**Repository:** {}  \n**Period:** Since {}  \n**Generated at:** {}\n\n---\n\n",
        report.login,
        report.repository,
        report.since,
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    output.push_str("## Executive Summary\n\n### General Statistics\n");
    output.push_str(&format!(
        "- **Commits:** {}\n- **Issues:** {}\n- **Pull Requests:** {}\n- **Review Comments:** {}\n- **Lines Added:** {}\n- **Lines Removed:** {}\n- **Files Changed:** {}\n\n",
        stats.commits_count,
        stats.issues_count,
        stats.prs_count,
        stats.reviews_count,
        stats.lines_added,
        stats.lines_removed,
        stats.files_changed
    ));

    output.push_str("### Commit Frequency Analysis\n");
    output.push_str(&format!(
        "{marker} **{}**\n- **Commits per Week:** {}\n- **Weeks in Period:** {}\n- **Estimated Inactive Weeks:** {}\n\n",
        frequency.message, frequency.commits_per_week, frequency.weeks_total, frequency.weeks_inactive
    ));

    output.push_str("### Quality Scores (AI)\n");
    output.push_str(&format!(
        "- **Commit Quality:** {:.2}/1.0\n- **Issue Quality:** {:.2}/1.0\n- **Review Quality:** {:.2}/1.0\n\n---\n\n",
        report.commit_analysis.score, report.issue_analysis.score, report.review_analysis.score
    ));

    analysis_section(&mut output, "Commit Analysis", "Commits", &report.commit_analysis);
    output.push_str("\n### Latest Commits:\n");
    for commit in &report.recent_commits {
        output.push_str(&format!(
            "- **{}**: {}...\n",
            commit.date.format("%Y-%m-%d"),
            preview(&commit.message, COMMIT_PREVIEW_CHARS)
        ));
    }
    output.push_str("\n---\n\n");

    analysis_section(&mut output, "Issue Analysis", "Issues", &report.issue_analysis);
    output.push_str("\n### Recent Issues:\n");
    for issue in &report.recent_issues {
        output.push_str(&format!("- **#{}** ({}): {}\n", issue.number, issue.state, issue.title));
    }
    output.push_str("\n---\n\n");

    output.push_str("## Pull Request Analysis\n\n### PR Statistics:\n");
    output.push_str(&format!(
        "- **Total:** {}\n- **Average Additions per PR:** {:.1}\n- **Average Files per PR:** {:.1}\n\n",
        stats.prs_count,
        report.average_per_pull(report.pull_additions),
        report.average_per_pull(report.pull_changed_files)
    ));
    output.push_str("### Recent PRs:\n");
    for pull in &report.recent_pulls {
        let status = if pull.merged {
            "Merged".to_string()
        } else {
            title_case(&pull.state)
        };
        output.push_str(&format!("- **#{}** ({status}): {}\n", pull.number, pull.title));
    }
    output.push_str("\n---\n\n");

    analysis_section(&mut output, "Code Review Analysis", "Reviews", &report.review_analysis);
    output.push_str("\n---\n\n");

    output.push_str("## General Recommendations\n\n### Identified Strengths:\n");
    for strength in STRENGTHS {
        output.push_str(&format!("- {strength}\n"));
    }
    output.push_str("\n### Areas for Improvement:\n");
    numbered(&mut output, &IMPROVEMENT_AREAS);
    output.push_str("\n### Next Steps:\n");
    numbered(&mut output, &NEXT_STEPS);
    output.push_str("\n---\n\n");

    output.push_str("## Frequency and Consistency Analysis\n\n### Frequency Status:\n");
    output.push_str(&format!("{marker} **{}**\n\n", frequency.message));
    output.push_str(&format!(
        "### Consistency Metrics:\n- **Actual Frequency:** {} commits/week\n- **Analyzed Period:** {} weeks\n- **Inactive Weeks (estimate):** {} weeks\n- **Activity Rate:** {:.1}%\n\n",
        frequency.commits_per_week,
        frequency.weeks_total,
        frequency.weeks_inactive,
        frequency.activity_rate()
    ));
    output.push_str("### Frequency Recommendations:\n");
    numbered(&mut output, frequency.alert_level.recommendations());
    output.push_str("\n---\n\n");

    output.push_str("## Productivity Metrics\n\n### Activity by Type:\n");
    output.push_str(&format!(
        "- **Commits/Week:** {}\n- **Issues/Month:** {:.1}\n- **PRs/Month:** {:.1}\n- **Reviews/Month:** {:.1}\n\n",
        frequency.commits_per_week,
        report.per_month(stats.issues_count),
        report.per_month(stats.prs_count),
        report.per_month(stats.reviews_count)
    ));
    output.push_str(&format!(
        "### Code Impact:\n- **Add/Remove Ratio:** {:.2}\n- **Lines per Commit:** {:.1}\n\n---\n\n",
        report.add_remove_ratio(),
        report.lines_per_commit()
    ));
    output.push_str(&format!(
        "*Report generated by agilemeter v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));
    output
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{sample_organization, sample_user};
    use crate::types::scoring::AlertLevel;

    #[test]
    fn organization_markdown_lists_ranked_rows() {
        let rendered = organization_markdown(&sample_organization());
        assert!(rendered.contains("# Agile Maturity Report"));
        let top = rendered.find("| 1 | acme/api |").expect("top row");
        let second = rendered.find("| 2 | acme/site |").expect("second row");
        assert!(top < second);
        assert!(rendered.contains("Average score: 0.500"));
        assert!(rendered.contains("- Add a CONTRIBUTING guide"));
    }

    #[test]
    fn user_markdown_contains_every_section() {
        let rendered = user_markdown(&sample_user());
        for section in [
            "## Executive Summary",
            "### Commit Frequency Analysis",
            "## Commit Analysis",
            "## Issue Analysis",
            "## Pull Request Analysis",
            "## Code Review Analysis",
            "## General Recommendations",
            "## Frequency and Consistency Analysis",
            "## Productivity Metrics",
        ] {
            assert!(rendered.contains(section), "missing {section}");
        }
        assert!(rendered.contains("**User:** dev"));
        assert!(rendered.contains("🎯 **Good frequency: 1.2 commits/week**"));
        assert!(rendered.contains("- **Activity Rate:** 100.0%"));
        assert!(rendered.contains("1. 🎯 Excellent commit frequency!"));
        assert!(rendered.contains("- **#4** (Merged): Add search"));
        assert!(rendered.contains("- **#5** (Closed): Drop legacy"));
        assert!(rendered.contains("- **Average Additions per PR:** 60.0"));
    }

    #[test]
    fn user_markdown_uses_level_remediation_list() {
        let mut report = sample_user();
        report.frequency.alert_level = AlertLevel::Critical;
        let rendered = user_markdown(&report);
        for (index, line) in AlertLevel::Critical.recommendations().iter().enumerate() {
            assert!(rendered.contains(&format!("{}. {line}", index + 1)));
        }
    }

    #[test]
    fn empty_organization_renders_none() {
        let mut report = sample_organization();
        report.repositories.clear();
        let rendered = organization_markdown(&report);
        assert!(rendered.contains("## Ranking\n\n- none"));
    }

    #[test]
    fn title_case_capitalizes_first_letter() {
        assert_eq!(title_case("open"), "Open");
        assert_eq!(title_case(""), "");
    }
}
