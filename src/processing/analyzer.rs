//! Main analysis engine combining similarity, ATS scoring and skill gaps

use crate::config::Config;
use crate::error::Result;
use crate::input::text_extractor::{Document, ExtractionMethod, TextExtractor};
use crate::processing::ats_scorer::{AtsScore, AtsScorer};
use crate::processing::lexicon::Lexicon;
use crate::processing::recommendations::{generate_recommendations, Recommendation};
use crate::processing::similarity::{KeywordWeight, MatchScore, SimilarityEngine};
use crate::processing::skill_gap::{SkillGapAnalyzer, SkillGapReport};
use crate::processing::text_processor::TextProcessor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

pub const TOP_KEYWORDS: usize = 20;

/// Everything known about one resume measured against one job description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub match_score: MatchScore,
    pub ats_score: AtsScore,
    pub skill_gaps: SkillGapReport,
    pub recommendations: Vec<Recommendation>,

    /// Highest TF-IDF terms of each document
    pub resume_keywords: Vec<KeywordWeight>,
    pub job_keywords: Vec<KeywordWeight>,

    pub metadata: AnalysisMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub analyzed_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub resume_source: Option<String>,
    pub job_source: Option<String>,
    pub extraction_method: Option<ExtractionMethod>,
}

/// Main analysis engine that coordinates all analysis components.
///
/// Construction compiles the lexicon into matchers once; every analysis
/// after that only reads shared state, so one engine can serve concurrent
/// requests.
pub struct AnalysisEngine {
    processor: Arc<TextProcessor>,
    similarity: SimilarityEngine,
    ats_scorer: AtsScorer,
    skill_gaps: SkillGapAnalyzer,
    extractor: TextExtractor,
}

impl AnalysisEngine {
    /// Build an engine from configuration, loading the lexicon override if one is set
    pub fn new(config: &Config) -> Result<Self> {
        let lexicon = match &config.lexicon_path {
            Some(path) => {
                log::info!("Loading lexicon from {}", path.display());
                Lexicon::load(path)?
            }
            None => Lexicon::bundled()?,
        };
        Self::with_lexicon(config, lexicon)
    }

    pub fn with_lexicon(config: &Config, lexicon: Lexicon) -> Result<Self> {
        config.validate()?;

        let lexicon = Arc::new(lexicon);
        let processor = Arc::new(TextProcessor::new(lexicon.clone())?);

        Ok(Self {
            similarity: SimilarityEngine::new(&config.scoring),
            ats_scorer: AtsScorer::new(processor.clone(), &config.scoring)?,
            skill_gaps: SkillGapAnalyzer::new(&lexicon.taxonomy, &config.scoring)?,
            extractor: TextExtractor::new(&config.extraction),
            processor,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        self.processor.lexicon()
    }

    /// Match score of two texts on a 0-100 scale
    pub fn similarity(&self, resume_text: &str, job_text: &str) -> MatchScore {
        self.similarity.compare_texts(&self.processor, resume_text, job_text)
    }

    pub fn ats_score(&self, resume_text: &str, job_text: &str) -> AtsScore {
        self.ats_scorer.score(resume_text, job_text)
    }

    pub fn skill_gaps(&self, resume_text: &str, job_text: &str) -> SkillGapReport {
        let resume = self.processor.normalize(resume_text);
        self.skill_gaps.analyze_normalized(resume_text, &resume, job_text)
    }

    /// Run every scorer over already extracted text
    pub fn analyze(&self, resume_text: &str, job_text: &str) -> AnalysisResult {
        let start_time = Instant::now();

        let resume = self.processor.normalize(resume_text);
        let job = self.processor.normalize(job_text);

        let match_score = self.similarity.score(&resume, &job);
        let ats_score = self
            .ats_scorer
            .score_normalized(resume_text, &resume, job_text, &job);
        let skill_gaps = self.skill_gaps.analyze_normalized(resume_text, &resume, job_text);
        let recommendations = generate_recommendations(&match_score, &ats_score, &skill_gaps, &job);

        let resume_keywords = self.similarity.top_keywords(&resume, &job, TOP_KEYWORDS);
        let job_keywords = self.similarity.top_keywords(&job, &resume, TOP_KEYWORDS);

        log::info!(
            "Analysis complete: match {:.1}, ATS {:.1}, {} job skills",
            match_score.score,
            ats_score.composite,
            skill_gaps.all().count()
        );

        AnalysisResult {
            match_score,
            ats_score,
            skill_gaps,
            recommendations,
            resume_keywords,
            job_keywords,
            metadata: AnalysisMetadata {
                analyzed_at: Utc::now(),
                processing_time_ms: start_time.elapsed().as_millis() as u64,
                resume_source: None,
                job_source: None,
                extraction_method: None,
            },
        }
    }

    /// Extract the resume and analyze it; extraction failures are returned as errors
    pub fn analyze_document(&self, resume: &Document, job_text: &str) -> Result<AnalysisResult> {
        let extracted = self.extractor.extract(resume)?;

        let mut result = self.analyze(&extracted.text, job_text);
        result.metadata.resume_source = resume.name().map(str::to_string);
        result.metadata.extraction_method = Some(extracted.method);
        Ok(result)
    }
}
