use serde::Serialize;

pub type Score = f64;

/// The six weighted inputs of the repository maturity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    DevelopmentVelocity,
    CollaborationIndex,
    CodeQuality,
    DocumentationMaturity,
    ProjectStructure,
    CommunityEngagement,
}

impl Signal {
    pub const ALL: [Signal; 6] = [
        Signal::DevelopmentVelocity,
        Signal::CollaborationIndex,
        Signal::CodeQuality,
        Signal::DocumentationMaturity,
        Signal::ProjectStructure,
        Signal::CommunityEngagement,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::DevelopmentVelocity => "development_velocity",
            Self::CollaborationIndex => "collaboration_index",
            Self::CodeQuality => "code_quality",
            Self::DocumentationMaturity => "documentation_maturity",
            Self::ProjectStructure => "project_structure",
            Self::CommunityEngagement => "community_engagement",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|signal| signal.key() == key)
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightTable([Score; 6]);

impl WeightTable {
    pub const DEFAULT: [Score; 6] = [0.25, 0.20, 0.20, 0.15, 0.10, 0.10];

    pub fn new(weights: [Score; 6]) -> Self {
        Self(weights)
    }

    pub fn weight(&self, signal: Signal) -> Score {
        self.0[signal.index()]
    }

    pub fn sum(&self) -> Score {
        self.0.iter().sum()
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// One bounded score per [`Signal`], ready for weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreCard {
    pub development_velocity: Score,
    pub collaboration_index: Score,
    pub code_quality: Score,
    pub documentation_maturity: Score,
    pub project_structure: Score,
    pub community_engagement: Score,
}

impl ScoreCard {
    #[cfg(test)]
    pub fn uniform(score: Score) -> Self {
        Self {
            development_velocity: score,
            collaboration_index: score,
            code_quality: score,
            documentation_maturity: score,
            project_structure: score,
            community_engagement: score,
        }
    }

    pub fn get(&self, signal: Signal) -> Score {
        match signal {
            Signal::DevelopmentVelocity => self.development_velocity,
            Signal::CollaborationIndex => self.collaboration_index,
            Signal::CodeQuality => self.code_quality,
            Signal::DocumentationMaturity => self.documentation_maturity,
            Signal::ProjectStructure => self.project_structure,
            Signal::CommunityEngagement => self.community_engagement,
        }
    }
}

/// Maturity tiers, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MaturityLevel {
    Beginner,
    Developing,
    Mature,
    Excellent,
}

impl MaturityLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Developing => "Developing",
            Self::Mature => "Mature",
            Self::Excellent => "Excellent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaturityAssessment {
    pub final_score: Score,
    pub maturity_level: MaturityLevel,
}

/// Commit-frequency alert levels, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Critical,
    High,
    Medium,
    Low,
    Normal,
    Good,
}

impl AlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::Good => "good",
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::Critical => "🚨",
            Self::High | Self::Medium => "⚠️",
            Self::Low => "📊",
            Self::Normal => "✅",
            Self::Good => "🎯",
        }
    }

    pub fn recommendations(self) -> &'static [&'static str] {
        match self {
            Self::Critical => &[
                "🚨 URGENT: Establish a daily commit routine",
                "📅 Set minimum weekly commit goals",
                "🤝 Consider pair programming to increase activity",
            ],
            Self::High => &[
                "⚠️ Improve consistency with more frequent commits",
                "📊 Set a goal of at least 1 commit per week",
                "🔄 Review your development workflow",
            ],
            Self::Medium => &[
                "📈 Gradually increase commit frequency",
                "⏰ Consider smaller, more frequent commits",
                "📝 Document your daily progress better",
            ],
            Self::Low => &[
                "✅ Keep the current frequency",
                "🎯 Consider even more frequent commits for better tracking",
                "📊 Keep monitoring your consistency",
            ],
            Self::Normal => &[
                "✅ Good commit frequency",
                "🎯 Keep the current consistency",
                "📈 Consider small adjustments to optimize",
            ],
            Self::Good => &[
                "🎯 Excellent commit frequency!",
                "✅ Keep up the current consistency",
                "🌟 Be an example for other developers",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyAssessment {
    pub commits_per_week: f64,
    pub weeks_total: u64,
    pub weeks_inactive: u64,
    pub alert_level: AlertLevel,
    pub message: String,
}

impl FrequencyAssessment {
    /// Share of the window, in percent, not estimated as inactive.
    pub fn activity_rate(&self) -> f64 {
        let active = self.weeks_total.saturating_sub(self.weeks_inactive);
        active as f64 / self.weeks_total.max(1) as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        assert!((WeightTable::default().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn signal_keys_round_trip() {
        for signal in Signal::ALL {
            assert_eq!(Signal::from_key(signal.key()), Some(signal));
        }
        assert_eq!(Signal::from_key("velocity"), None);
    }

    #[test]
    fn maturity_levels_are_ordered() {
        assert!(MaturityLevel::Beginner < MaturityLevel::Developing);
        assert!(MaturityLevel::Developing < MaturityLevel::Mature);
        assert!(MaturityLevel::Mature < MaturityLevel::Excellent);
    }

    #[test]
    fn alert_levels_are_ordered_by_severity() {
        assert!(AlertLevel::Critical < AlertLevel::High);
        assert!(AlertLevel::Low < AlertLevel::Normal);
        assert!(AlertLevel::Normal < AlertLevel::Good);
        assert_eq!(
            serde_json::to_string(&AlertLevel::Medium).expect("alert level should serialize"),
            "\"medium\""
        );
    }

    #[test]
    fn every_alert_level_has_three_recommendations() {
        for level in [
            AlertLevel::Critical,
            AlertLevel::High,
            AlertLevel::Medium,
            AlertLevel::Low,
            AlertLevel::Normal,
            AlertLevel::Good,
        ] {
            assert_eq!(level.recommendations().len(), 3);
        }
    }

    #[test]
    fn activity_rate_uses_active_weeks() {
        let assessment = FrequencyAssessment {
            commits_per_week: 0.2,
            weeks_total: 10,
            weeks_inactive: 8,
            alert_level: AlertLevel::High,
            message: String::new(),
        };
        assert!((assessment.activity_rate() - 20.0).abs() < 1e-9);
    }
}
