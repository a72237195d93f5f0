//! Recovers a bounded score and recommendation lines from free-form analysis text.
//!
//! The generator is asked for a score in [0, 1] followed by recommendations,
//! but nothing enforces that shape. Extraction is therefore heuristic:
//!
//! - the first numeral anywhere in the text is the score, clamped to [0, 1];
//!   no numeral means the neutral 0.5;
//! - the text is split into lines and each line into sentences; a sentence
//!   mentioning one of [`RECOMMENDATION_KEYWORDS`] is a candidate;
//! - candidates lose leading list markers and must keep at least
//!   [`MIN_RECOMMENDATION_LEN`] characters.

use crate::types::metrics::{QualitativeResult, NEUTRAL_SCORE};
use crate::types::scoring::Score;
use regex::Regex;
use std::sync::LazyLock;

pub const RECOMMENDATION_KEYWORDS: [&str; 4] = ["recommend", "suggest", "improv", "should"];
pub const MIN_RECOMMENDATION_LEN: usize = 10;

static SCORE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("score pattern is valid"));

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d.\-*\s]+").expect("list marker pattern is valid"));

/// Full extraction; absent or blank text yields the not-available default.
pub fn extract(text: Option<&str>, cap: usize) -> QualitativeResult {
    match text.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => QualitativeResult {
            score: extract_score(text),
            analysis: text.to_string(),
            recommendations: extract_recommendations(text, cap),
        },
        None => QualitativeResult::not_available(),
    }
}

pub fn extract_score(text: &str) -> Score {
    SCORE_PATTERN
        .find(text)
        .and_then(|found| found.as_str().parse::<f64>().ok())
        .map(|score| score.clamp(0.0, 1.0))
        .unwrap_or(NEUTRAL_SCORE)
}

pub fn extract_recommendations(text: &str, cap: usize) -> Vec<String> {
    text.lines()
        .flat_map(sentences)
        .filter(|sentence| mentions_recommendation(sentence))
        .map(strip_list_marker)
        .filter(|candidate| candidate.chars().count() >= MIN_RECOMMENDATION_LEN)
        .map(str::to_string)
        .take(cap)
        .collect()
}

fn mentions_recommendation(sentence: &str) -> bool {
    let lowered = sentence.to_lowercase();
    RECOMMENDATION_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

fn strip_list_marker(sentence: &str) -> &str {
    match LIST_MARKER.find(sentence) {
        Some(marker) => sentence[marker.end()..].trim(),
        None => sentence.trim(),
    }
}

/// Splits after `.`, `!` or `?` followed by whitespace.
///
/// A segment made only of list-marker characters (`1.`, `-`) is not split off,
/// so numbered items stay attached to their text.
fn sentences(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let Some(&(next_idx, next)) = chars.peek() else {
            break;
        };
        if !next.is_whitespace() {
            continue;
        }
        let segment = &line[start..next_idx];
        if LIST_MARKER.find(segment).map(|m| m.end()) == Some(segment.len()) {
            continue;
        }
        segments.push(segment);
        start = next_idx;
    }
    segments.push(&line[start..]);
    segments
}
