use super::scoring::Score;
use serde::Serialize;

/// Score used whenever a qualitative signal cannot be computed.
pub const NEUTRAL_SCORE: Score = 0.5;

/// Analysis text used when no qualitative analysis was produced.
pub const NOT_AVAILABLE: &str = "Analysis not available";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VelocityMetrics {
    pub total_commits: u64,
    pub weeks_since_creation: f64,
    pub commits_per_week: f64,
    pub score: Score,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollaborationMetrics {
    pub total_issues: u64,
    pub total_prs: u64,
    pub unique_contributors: u64,
    pub score: Score,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StructureFlags {
    pub has_readme: bool,
    pub has_gitignore: bool,
    pub has_license: bool,
    pub has_tests: bool,
    pub has_ci: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructureMetrics {
    pub total_files: u64,
    pub flags: StructureFlags,
    pub file_structure: Vec<String>,
    pub score: Score,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngagementMetrics {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub score: Score,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualitativeResult {
    pub score: Score,
    pub analysis: String,
    pub recommendations: Vec<String>,
}

impl QualitativeResult {
    pub fn neutral(analysis: impl Into<String>) -> Self {
        Self {
            score: NEUTRAL_SCORE,
            analysis: analysis.into(),
            recommendations: Vec::new(),
        }
    }

    pub fn not_available() -> Self {
        Self::neutral(NOT_AVAILABLE)
    }

    pub fn with_recommendations(mut self, recommendations: &[&str]) -> Self {
        self.recommendations = recommendations.iter().map(|r| r.to_string()).collect();
        self
    }
}

impl Default for QualitativeResult {
    fn default() -> Self {
        Self::not_available()
    }
}
