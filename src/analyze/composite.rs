use super::normalize::round_to;
use crate::types::scoring::{MaturityAssessment, MaturityLevel, Score, ScoreCard, Signal, WeightTable};

pub const EXCELLENT_THRESHOLD: Score = 0.8;
pub const MATURE_THRESHOLD: Score = 0.6;
pub const DEVELOPING_THRESHOLD: Score = 0.4;

// Absorbs accumulated float error so an exact 0.8 average still reaches its tier.
const TIER_EPSILON: Score = 1e-9;

/// Weighted sum of the six signals, mapped onto a maturity tier.
///
/// Each signal is clamped to [0, 1] before weighting. The tier is chosen from
/// the unrounded sum; `final_score` is the sum rounded to 3 decimals.
pub fn composite(card: &ScoreCard, weights: &WeightTable) -> MaturityAssessment {
    let raw = Signal::ALL
        .iter()
        .map(|signal| card.get(*signal).clamp(0.0, 1.0) * weights.weight(*signal))
        .sum::<Score>()
        .clamp(0.0, 1.0);

    MaturityAssessment {
        final_score: round_to(raw, 3),
        maturity_level: maturity_level(raw),
    }
}

pub fn maturity_level(score: Score) -> MaturityLevel {
    if score + TIER_EPSILON >= EXCELLENT_THRESHOLD {
        MaturityLevel::Excellent
    } else if score + TIER_EPSILON >= MATURE_THRESHOLD {
        MaturityLevel::Mature
    } else if score + TIER_EPSILON >= DEVELOPING_THRESHOLD {
        MaturityLevel::Developing
    } else {
        MaturityLevel::Beginner
    }
}
