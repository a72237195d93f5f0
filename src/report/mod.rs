pub mod json;
pub mod md;
pub mod xlsx;

use crate::error::Result;
use crate::types::report::{OrganizationReport, UserReport};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Md,
    Json,
}

impl OutputFormat {
    /// Format implied by the file extension, if recognised.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "md" | "markdown" => Some(Self::Md),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn write_organization(
    report: &OrganizationReport,
    format: OutputFormat,
    path: &Path,
) -> Result<()> {
    match format {
        OutputFormat::Xlsx => xlsx::write_workbook(report, path)?,
        OutputFormat::Md => std::fs::write(path, md::organization_markdown(report))?,
        OutputFormat::Json => std::fs::write(path, json::to_json(report)?)?,
    }
    tracing::info!(path = %path.display(), ?format, "organization report written");
    Ok(())
}

/// Writes the user report; only Markdown and JSON apply to a single contributor.
pub fn write_user(report: &UserReport, format: OutputFormat, path: &Path) -> Result<()> {
    match format {
        OutputFormat::Json => std::fs::write(path, json::to_json(report)?)?,
        OutputFormat::Md | OutputFormat::Xlsx => std::fs::write(path, md::user_markdown(report))?,
    }
    tracing::info!(path = %path.display(), ?format, "user report written");
    Ok(())
}

pub fn organization_summary(report: &OrganizationReport, path: &Path) -> String {
    format!(
        "Done! File: {}\nRepositories analyzed: {}\nAverage score: {:.3}",
        path.display(),
        report.repositories.len(),
        report.average_score()
    )
}

pub fn user_summary(report: &UserReport, path: &Path) -> String {
    let stats = &report.stats;
    format!(
        "Analysis complete!\n\nSummary:\n- Commits: {}\n- Issues: {}\n- PRs: {}\n- Reviews: {}\n\nAI scores:\n- Commits: {:.2}/1.0\n- Issues: {:.2}/1.0\n- Reviews: {:.2}/1.0\n\nDetailed report: {}",
        stats.commits_count,
        stats.issues_count,
        stats.prs_count,
        stats.reviews_count,
        report.commit_analysis.score,
        report.issue_analysis.score,
        report.review_analysis.score,
        path.display()
    )
}
