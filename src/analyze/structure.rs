use super::normalize::round_to;
use crate::types::metrics::{StructureFlags, StructureMetrics};
use crate::types::scoring::Score;

/// Number of listing entries kept on [`StructureMetrics`] and sent to the analyzer.
pub const STRUCTURE_PREVIEW_LEN: usize = 15;

const CHECKLIST_LEN: f64 = 5.0;

/// Derives the checklist flags from a shallow path listing.
///
/// Matching is a case-insensitive substring test against every path, so
/// `docs/LICENSE.md` counts as a license and `.circleci/config.yml` as CI.
pub fn detect_flags(paths: &[String]) -> StructureFlags {
    let lowered = paths
        .iter()
        .map(|path| path.to_lowercase())
        .collect::<Vec<_>>();
    let any = |needle: &str| lowered.iter().any(|path| path.contains(needle));

    StructureFlags {
        has_readme: any("readme"),
        has_gitignore: any(".gitignore"),
        has_license: any("license"),
        has_tests: any("test"),
        has_ci: any(".github") || any("ci"),
    }
}

pub fn checklist_score(flags: &StructureFlags) -> Score {
    let present = [
        flags.has_readme,
        flags.has_gitignore,
        flags.has_license,
        flags.has_tests,
        flags.has_ci,
    ]
    .iter()
    .filter(|flag| **flag)
    .count();
    present as f64 / CHECKLIST_LEN
}

pub fn structure_metrics(paths: &[String]) -> StructureMetrics {
    let flags = detect_flags(paths);
    StructureMetrics {
        total_files: paths.len() as u64,
        flags,
        file_structure: paths.iter().take(STRUCTURE_PREVIEW_LEN).cloned().collect(),
        score: round_to(checklist_score(&flags), 3),
    }
}
