//! Configuration management for the resume matcher

use crate::error::{Result, ResumeMatcherError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Replaces the bundled lexicon when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon_path: Option<PathBuf>,
    pub scoring: ScoringConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: AtsWeights,
    /// Strong-verb occurrences that earn full action-verb credit
    pub action_verb_saturation: usize,
    /// Quantified achievements that earn full credit
    pub quantifiable_saturation: usize,
    pub keyword_boost_per_match: f32,
    pub keyword_boost_cap: f32,
    /// Largest n-gram fed into the TF-IDF vectors (1..=4)
    pub max_ngram: usize,
    /// Job mentions at which a missing skill becomes high priority
    pub high_priority_frequency: usize,
    pub strength_policy: StrengthPolicy,
    pub min_resume_words: usize,
    pub max_resume_words: usize,
}

/// Relative weight of each ATS sub-score. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtsWeights {
    pub keyword_coverage: f32,
    pub action_verbs: f32,
    pub quantifiable_achievements: f32,
    pub technical_skills: f32,
    pub formatting: f32,
    pub industry_alignment: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthPolicy {
    /// 1.0 when the skill is present in the resume, 0.0 otherwise
    Binary,
    /// Resume mentions relative to job mentions, capped at 1.0
    Graded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Trimmed characters a page needs before it counts as extracted
    pub min_page_chars: usize,
    /// Trimmed characters a recovered document needs before it is accepted
    pub min_document_chars: usize,
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

impl Default for AtsWeights {
    fn default() -> Self {
        Self {
            keyword_coverage: 0.30,
            action_verbs: 0.20,
            quantifiable_achievements: 0.18,
            technical_skills: 0.17,
            formatting: 0.10,
            industry_alignment: 0.05,
        }
    }
}

impl AtsWeights {
    pub fn entries(&self) -> [(&'static str, f32); 6] {
        [
            ("keyword_coverage", self.keyword_coverage),
            ("action_verbs", self.action_verbs),
            ("quantifiable_achievements", self.quantifiable_achievements),
            ("technical_skills", self.technical_skills),
            ("formatting", self.formatting),
            ("industry_alignment", self.industry_alignment),
        ]
    }

    pub fn total(&self) -> f32 {
        self.keyword_coverage
            + self.action_verbs
            + self.quantifiable_achievements
            + self.technical_skills
            + self.formatting
            + self.industry_alignment
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: AtsWeights::default(),
            action_verb_saturation: 10,
            quantifiable_saturation: 5,
            keyword_boost_per_match: 1.0,
            keyword_boost_cap: 15.0,
            max_ngram: 2,
            high_priority_frequency: 3,
            strength_policy: StrengthPolicy::Binary,
            min_resume_words: 150,
            max_resume_words: 1000,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_page_chars: 20,
            min_document_chars: 20,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lexicon_path: None,
            scoring: ScoringConfig::default(),
            extraction: ExtractionConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ResumeMatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeMatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-matcher")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        for (name, weight) in self.scoring.weights.entries() {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ResumeMatcherError::Configuration(format!(
                    "ATS weight {} must be between 0.0 and 1.0, got {}",
                    name, weight
                )));
            }
        }

        let total = self.scoring.weights.total();
        if (total - 1.0).abs() > 1e-3 {
            return Err(ResumeMatcherError::Configuration(format!(
                "ATS weights must sum to 1.0, got {:.3}",
                total
            )));
        }

        if !(1..=4).contains(&self.scoring.max_ngram) {
            return Err(ResumeMatcherError::Configuration(format!(
                "max_ngram must be between 1 and 4, got {}",
                self.scoring.max_ngram
            )));
        }

        if self.scoring.action_verb_saturation == 0 || self.scoring.quantifiable_saturation == 0 {
            return Err(ResumeMatcherError::Configuration(
                "saturation thresholds must be greater than zero".to_string(),
            ));
        }

        if self.scoring.keyword_boost_cap < 0.0 || self.scoring.keyword_boost_per_match < 0.0 {
            return Err(ResumeMatcherError::Configuration(
                "keyword boost values cannot be negative".to_string(),
            ));
        }

        if self.scoring.min_resume_words >= self.scoring.max_resume_words {
            return Err(ResumeMatcherError::Configuration(
                "min_resume_words must be below max_resume_words".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_weights_sum_to_one() {
        let config = Config::default();
        assert!((config.scoring.weights.total() - 1.0).abs() < 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        let mut config = Config::default();
        config.scoring.weights.keyword_coverage = 0.9;
        assert!(matches!(
            config.validate(),
            Err(ResumeMatcherError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_weights() {
        let mut config = Config::default();
        // still sums to 1.0
        config.scoring.weights.keyword_coverage = 1.30;
        config.scoring.weights.formatting = -0.90;
        assert!((config.scoring.weights.total() - 1.0).abs() < 1e-3);

        match config.validate() {
            Err(ResumeMatcherError::Configuration(message)) => {
                assert!(message.contains("keyword_coverage"));
            }
            other => panic!("expected configuration error, got {:?}", other),
        }

        config.scoring.weights.keyword_coverage = 0.30;
        config.scoring.weights.formatting = 0.0;
        config.scoring.weights.action_verbs = 0.30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_ngram_range() {
        let mut config = Config::default();
        config.scoring.max_ngram = 0;
        assert!(config.validate().is_err());
        config.scoring.max_ngram = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.scoring.strength_policy = StrengthPolicy::Graded;
        config.scoring.max_ngram = 3;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.scoring.strength_policy, StrengthPolicy::Graded);
        assert_eq!(loaded.scoring.max_ngram, 3);
        assert_eq!(loaded.scoring.weights, AtsWeights::default());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "scoring = 12").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ResumeMatcherError::Configuration(_))
        ));
    }
}
