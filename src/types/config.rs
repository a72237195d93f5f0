use crate::error::AgileError;
use crate::types::scoring::{Signal, WeightTable};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_AI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_AI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgileConfig {
    pub weights: Option<HashMap<String, f64>>,
    pub ai: Option<AiConfig>,
    pub github: Option<GitHubConfig>,
    pub analysis: Option<AnalysisConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    pub api_url: Option<String>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub workers: Option<usize>,
    pub sample_size: Option<usize>,
    pub structure_depth: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiSettings {
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_AI_MODEL.to_string(),
            endpoint: DEFAULT_AI_ENDPOINT.to_string(),
            temperature: 0.3,
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GitHubSettings {
    pub api_url: String,
    pub per_page: u32,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            per_page: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSettings {
    pub workers: usize,
    pub sample_size: usize,
    pub structure_depth: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            sample_size: 20,
            structure_depth: 2,
        }
    }
}

impl AgileConfig {
    pub fn weights(&self) -> WeightTable {
        match &self.weights {
            Some(weights) => {
                let defaults = WeightTable::default();
                let mut table = WeightTable::DEFAULT;
                for (slot, signal) in table.iter_mut().zip(Signal::ALL) {
                    *slot = weights
                        .get(signal.key())
                        .copied()
                        .unwrap_or_else(|| defaults.weight(signal));
                }
                WeightTable::new(table)
            }
            None => WeightTable::default(),
        }
    }

    pub fn ai_settings(&self) -> AiSettings {
        let defaults = AiSettings::default();
        match &self.ai {
            Some(ai) => AiSettings {
                model: ai.model.clone().unwrap_or(defaults.model),
                endpoint: ai.endpoint.clone().unwrap_or(defaults.endpoint),
                temperature: ai.temperature.unwrap_or(defaults.temperature),
                timeout: ai
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
            },
            None => defaults,
        }
    }

    pub fn github_settings(&self) -> GitHubSettings {
        let defaults = GitHubSettings::default();
        match &self.github {
            Some(github) => GitHubSettings {
                api_url: github.api_url.clone().unwrap_or(defaults.api_url),
                per_page: github.per_page.unwrap_or(defaults.per_page),
            },
            None => defaults,
        }
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        let defaults = AnalysisSettings::default();
        match &self.analysis {
            Some(analysis) => AnalysisSettings {
                workers: analysis.workers.unwrap_or(defaults.workers),
                sample_size: analysis.sample_size.unwrap_or(defaults.sample_size),
                structure_depth: analysis
                    .structure_depth
                    .unwrap_or(defaults.structure_depth),
            },
            None => defaults,
        }
    }

    pub fn validate(&self) -> Result<(), AgileError> {
        if let Some(weights) = &self.weights {
            let unknown = weights
                .keys()
                .filter(|key| Signal::from_key(key).is_none())
                .cloned()
                .collect::<Vec<_>>();
            if !unknown.is_empty() {
                return Err(AgileError::ConfigParse(format!(
                    "weights contains unknown key(s): {}",
                    unknown.join(", ")
                )));
            }
        }

        let weights = self.weights();
        if Signal::ALL
            .iter()
            .any(|signal| !(0.0..=1.0).contains(&weights.weight(*signal)))
        {
            return Err(AgileError::ConfigParse(
                "weights values must be between 0.0 and 1.0".to_string(),
            ));
        }
        if (weights.sum() - 1.0).abs() > 0.001 {
            return Err(AgileError::ConfigParse(format!(
                "weights must sum to 1.0 (found {:.3})",
                weights.sum()
            )));
        }

        let ai = self.ai_settings();
        if !(0.0..=2.0).contains(&ai.temperature) {
            return Err(AgileError::ConfigParse(
                "ai.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if ai.timeout.is_zero() {
            return Err(AgileError::ConfigParse(
                "ai.timeout_secs must be greater than 0".to_string(),
            ));
        }

        let github = self.github_settings();
        if !(1..=100).contains(&github.per_page) {
            return Err(AgileError::ConfigParse(
                "github.per_page must be between 1 and 100".to_string(),
            ));
        }

        let analysis = self.analysis_settings();
        for (key, value) in [
            ("workers", analysis.workers),
            ("sample_size", analysis.sample_size),
            ("structure_depth", analysis.structure_depth),
        ] {
            if value == 0 {
                return Err(AgileError::ConfigParse(format!(
                    "analysis.{key} must be greater than 0"
                )));
            }
        }

        Ok(())
    }
}
