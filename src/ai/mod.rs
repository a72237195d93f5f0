pub mod extract;
pub mod openai;

use crate::error::Result;
use crate::scan::{CommitRecord, IssueRecord, ReviewRecord};
use crate::types::metrics::QualitativeResult;
use serde::Serialize;

const SUMMARY_RECOMMENDATIONS: usize = 2;
const DETAILED_RECOMMENDATIONS: usize = 3;
const SUMMARY_MAX_TOKENS: u32 = 200;
const DETAILED_MAX_TOKENS: u32 = 300;

const MAX_COMMIT_MESSAGES: usize = 10;
const MAX_STRUCTURE_ENTRIES: usize = 15;
const README_PREVIEW_CHARS: usize = 300;
const MAX_ISSUES: usize = 5;
const ISSUE_BODY_PREVIEW_CHARS: usize = 500;
const MAX_REVIEWS: usize = 8;
const REVIEW_BODY_PREVIEW_CHARS: usize = 200;

pub const AI_FAILED: &str = "AI analysis failed";
pub const CONFIGURE_AI_HINT: &str = "Configure an OpenAI API key for detailed analysis";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// External text-generation service.
///
/// Implementations must bound each call in time; any error is treated the same
/// by the analyzer regardless of cause.
pub trait TextGenerator {
    fn complete(&self, messages: &[ChatMessage], max_tokens: u32) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    CommitQuality,
    ProjectStructure,
    IssueQuality,
    ReviewQuality,
}

impl AnalysisKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::CommitQuality => "commit quality",
            Self::ProjectStructure => "project structure",
            Self::IssueQuality => "issue quality",
            Self::ReviewQuality => "review quality",
        }
    }

    /// Canned advice used when a detailed analysis yields no recommendation lines.
    pub fn fallback_recommendations(self) -> &'static [&'static str] {
        match self {
            Self::CommitQuality => &[
                "Improve the clarity of commit messages",
                "Use the conventional format (feat:, fix:, docs:)",
                "Describe the 'why' in addition to the 'what'",
            ],
            Self::IssueQuality => &[
                "Add clear acceptance criteria",
                "Use the 'As a... I want... So that...' format",
                "Include more technical details",
            ],
            Self::ReviewQuality => &[
                "Provide more specific feedback",
                "Suggest constructive improvements",
                "Focus on quality, security and performance",
            ],
            Self::ProjectStructure => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    Summary,
    Detailed,
}

impl Depth {
    fn cap(self) -> usize {
        match self {
            Self::Summary => SUMMARY_RECOMMENDATIONS,
            Self::Detailed => DETAILED_RECOMMENDATIONS,
        }
    }

    fn max_tokens(self) -> u32 {
        match self {
            Self::Summary => SUMMARY_MAX_TOKENS,
            Self::Detailed => DETAILED_MAX_TOKENS,
        }
    }
}

fn system_prompt(kind: AnalysisKind, depth: Depth) -> &'static str {
    match (kind, depth) {
        (AnalysisKind::CommitQuality, Depth::Summary) => {
            "Analyze the commit messages for agile practices. \
             Provide: 1) Score 0.0-1.0 2) Brief analysis 3) 2 recommendations"
        }
        (AnalysisKind::ProjectStructure, _) => {
            "Analyze the project structure for agile practices. \
             Provide: 1) Score 0.0-1.0 2) Brief analysis 3) 2 recommendations"
        }
        (AnalysisKind::CommitQuality, Depth::Detailed) => {
            "You are an expert in agile practices and commit quality. \
             Analyze the commit messages and provide: \
             1) A score from 0.0 to 1.0 \
             2) A detailed analysis of strengths and weaknesses \
             3) 3 specific recommendations for improvement"
        }
        (AnalysisKind::IssueQuality, _) => {
            "You are an expert in agile user stories. \
             Analyze the issues and provide: \
             1) A score from 0.0 to 1.0 \
             2) An analysis of the quality of the stories \
             3) Specific recommendations"
        }
        (AnalysisKind::ReviewQuality, _) => {
            "You are a code review expert. \
             Analyze the review comments and provide: \
             1) A score from 0.0 to 1.0 \
             2) An analysis of the quality of the reviews \
             3) Recommendations for improvement"
        }
    }
}

fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Qualitative scoring backed by an optional text generator.
///
/// The enabled/disabled mode is fixed at construction. A disabled analyzer
/// never calls out and returns neutral results. An enabled analyzer degrades a
/// failed call to a neutral result for that one analysis only.
#[derive(Debug)]
pub struct QualitativeAnalyzer<G> {
    generator: Option<G>,
}

impl<G: TextGenerator> QualitativeAnalyzer<G> {
    pub fn new(generator: Option<G>) -> Self {
        if generator.is_some() {
            tracing::info!("AI analysis enabled");
        } else {
            tracing::info!("AI analysis disabled; qualitative scores default to neutral");
        }
        Self { generator }
    }

    pub fn disabled() -> Self {
        Self { generator: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Repository-level review of recent commit messages.
    pub fn analyze_commit_quality(&self, messages: &[String]) -> QualitativeResult {
        if messages.is_empty() || !self.is_enabled() {
            return QualitativeResult::not_available();
        }
        let listing = messages
            .iter()
            .take(MAX_COMMIT_MESSAGES)
            .map(|message| format!("- {message}"))
            .collect::<Vec<_>>()
            .join("\n");
        let payload = format!("Commit messages:\n{listing}");
        let text = self.complete(AnalysisKind::CommitQuality, Depth::Summary, payload);
        extract::extract(text.as_deref(), Depth::Summary.cap())
    }

    /// Repository-level review of the path listing and README.
    pub fn analyze_project_structure(
        &self,
        paths: &[String],
        readme: Option<&str>,
    ) -> QualitativeResult {
        if !self.is_enabled() {
            return QualitativeResult::not_available();
        }
        let structure = paths
            .iter()
            .take(MAX_STRUCTURE_ENTRIES)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        let readme_preview = readme
            .filter(|readme| !readme.is_empty())
            .map(|readme| preview(readme, README_PREVIEW_CHARS))
            .unwrap_or("No README");
        let payload = format!("Structure:\n{structure}\n\nREADME:\n{readme_preview}");
        let text = self.complete(AnalysisKind::ProjectStructure, Depth::Summary, payload);
        extract::extract(text.as_deref(), Depth::Summary.cap())
    }

    pub fn analyze_commits_detailed(&self, commits: &[CommitRecord]) -> QualitativeResult {
        if commits.is_empty() {
            return QualitativeResult::neutral("No commits found");
        }
        let messages = commits
            .iter()
            .map(|commit| commit.message.as_str())
            .filter(|message| !message.is_empty())
            .collect::<Vec<_>>();
        if messages.is_empty() || !self.is_enabled() {
            return basic_result(messages.len(), "commits");
        }
        let listing = messages
            .iter()
            .take(MAX_COMMIT_MESSAGES)
            .map(|message| format!("- {message}"))
            .collect::<Vec<_>>()
            .join("\n");
        let payload = format!("Analyze these commit messages:\n{listing}");
        self.detailed(AnalysisKind::CommitQuality, payload)
    }

    pub fn analyze_issues_detailed(&self, issues: &[IssueRecord]) -> QualitativeResult {
        if issues.is_empty() {
            return QualitativeResult::neutral("No issues found");
        }
        if !self.is_enabled() {
            return basic_result(issues.len(), "issues");
        }
        let listing = issues
            .iter()
            .take(MAX_ISSUES)
            .map(|issue| {
                format!(
                    "Title: {}\nDescription: {}...",
                    issue.title,
                    preview(&issue.body, ISSUE_BODY_PREVIEW_CHARS)
                )
            })
            .collect::<Vec<_>>()
            .join("\n---\n");
        let payload = format!("Analyze these issues/stories:\n{listing}");
        self.detailed(AnalysisKind::IssueQuality, payload)
    }

    pub fn analyze_reviews_detailed(&self, reviews: &[ReviewRecord]) -> QualitativeResult {
        if reviews.is_empty() {
            return QualitativeResult::neutral("No reviews found");
        }
        if !self.is_enabled() {
            return basic_result(reviews.len(), "reviews");
        }
        let listing = reviews
            .iter()
            .take(MAX_REVIEWS)
            .filter(|review| !review.body.is_empty())
            .map(|review| format!("- {}...", preview(&review.body, REVIEW_BODY_PREVIEW_CHARS)))
            .collect::<Vec<_>>()
            .join("\n");
        let payload = format!("Analyze these review comments:\n{listing}");
        self.detailed(AnalysisKind::ReviewQuality, payload)
    }

    fn detailed(&self, kind: AnalysisKind, payload: String) -> QualitativeResult {
        match self.complete(kind, Depth::Detailed, payload) {
            Some(text) => {
                let mut result = extract::extract(Some(&text), Depth::Detailed.cap());
                if result.recommendations.is_empty() {
                    result = result.with_recommendations(kind.fallback_recommendations());
                }
                result
            }
            None => QualitativeResult::neutral(AI_FAILED),
        }
    }

    fn complete(&self, kind: AnalysisKind, depth: Depth, payload: String) -> Option<String> {
        let generator = self.generator.as_ref()?;
        let messages = [
            ChatMessage::system(system_prompt(kind, depth)),
            ChatMessage::user(payload),
        ];
        match generator.complete(&messages, depth.max_tokens()) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(kind = kind.label(), error = %err, "text generation failed; using neutral score");
                None
            }
        }
    }
}

fn basic_result(count: usize, noun: &str) -> QualitativeResult {
    QualitativeResult::neutral(format!("Analysis not available: {count} {noun} found"))
        .with_recommendations(&[CONFIGURE_AI_HINT])
}
