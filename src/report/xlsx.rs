use crate::error::Result;
use crate::types::report::OrganizationReport;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

pub const SUMMARY_SHEET: &str = "Repository Summary";
pub const DETAILED_SHEET: &str = "Detailed Analysis";
pub const METADATA_SHEET: &str = "Metadata";

const SUMMARY_HEADERS: [&str; 13] = [
    "repo_name",
    "created_at",
    "final_score",
    "maturity_level",
    "commits_per_week",
    "total_contributors",
    "total_issues",
    "total_prs",
    "has_readme",
    "has_tests",
    "stars",
    "ai_commit_score",
    "ai_structure_score",
];

const DETAILED_HEADERS: [&str; 7] = [
    "repo_name",
    "final_score",
    "maturity_level",
    "ai_commit_analysis",
    "ai_structure_analysis",
    "commit_recommendations",
    "structure_recommendations",
];

const METADATA_HEADERS: [&str; 5] = [
    "org",
    "created_since",
    "total_repos",
    "generated_at",
    "tool_version",
];

fn write_headers(sheet: &mut Worksheet, headers: &[&str], bold: &Format) -> Result<()> {
    for (col, header) in (0u16..).zip(headers) {
        sheet.write_string_with_format(0, col, *header, bold)?;
    }
    Ok(())
}

/// Writes the three-sheet workbook; repositories are expected in ranked order.
pub fn write_workbook(report: &OrganizationReport, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let summary = workbook.add_worksheet();
    summary.set_name(SUMMARY_SHEET)?;
    write_headers(summary, &SUMMARY_HEADERS, &bold)?;
    for (row, repo) in (1u32..).zip(&report.repositories) {
        summary.write_string(row, 0, repo.repo_name.as_str())?;
        summary.write_string(row, 1, repo.created_at.to_rfc3339())?;
        summary.write_number(row, 2, repo.final_score)?;
        summary.write_string(row, 3, repo.maturity_level.label())?;
        summary.write_number(row, 4, repo.velocity_metrics.commits_per_week)?;
        summary.write_number(row, 5, repo.collaboration_metrics.unique_contributors as f64)?;
        summary.write_number(row, 6, repo.collaboration_metrics.total_issues as f64)?;
        summary.write_number(row, 7, repo.collaboration_metrics.total_prs as f64)?;
        summary.write_boolean(row, 8, repo.structure_metrics.flags.has_readme)?;
        summary.write_boolean(row, 9, repo.structure_metrics.flags.has_tests)?;
        summary.write_number(row, 10, repo.engagement_metrics.stars as f64)?;
        summary.write_number(row, 11, repo.ai_commit_analysis.score)?;
        summary.write_number(row, 12, repo.ai_structure_analysis.score)?;
    }
    summary.set_column_width(0, 32)?;

    let detailed = workbook.add_worksheet();
    detailed.set_name(DETAILED_SHEET)?;
    write_headers(detailed, &DETAILED_HEADERS, &bold)?;
    for (row, repo) in (1u32..).zip(&report.repositories) {
        detailed.write_string(row, 0, repo.repo_name.as_str())?;
        detailed.write_number(row, 1, repo.final_score)?;
        detailed.write_string(row, 2, repo.maturity_level.label())?;
        detailed.write_string(row, 3, repo.ai_commit_analysis.analysis.as_str())?;
        detailed.write_string(row, 4, repo.ai_structure_analysis.analysis.as_str())?;
        detailed.write_string(row, 5, repo.ai_commit_analysis.recommendations.join("; "))?;
        detailed.write_string(row, 6, repo.ai_structure_analysis.recommendations.join("; "))?;
    }
    detailed.set_column_width(0, 32)?;

    let metadata = workbook.add_worksheet();
    metadata.set_name(METADATA_SHEET)?;
    write_headers(metadata, &METADATA_HEADERS, &bold)?;
    let meta = &report.metadata;
    metadata.write_string(1, 0, meta.org.as_str())?;
    metadata.write_string(1, 1, meta.created_since.to_string())?;
    metadata.write_number(1, 2, meta.total_repos as f64)?;
    metadata.write_string(1, 3, meta.generated_at.to_rfc3339())?;
    metadata.write_string(1, 4, meta.tool_version.as_str())?;

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_organization;

    #[test]
    fn workbook_is_written() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("repos.xlsx");
        write_workbook(&sample_organization(), &path).expect("workbook should be written");

        let bytes = std::fs::read(&path).expect("workbook should be readable");
        // xlsx is a zip container
        assert!(bytes.starts_with(b"PK"));
    }
}
