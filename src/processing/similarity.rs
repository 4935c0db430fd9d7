//! TF-IDF cosine similarity between a resume and a job description
//!
//! Both documents together form the corpus, so a term's inverse document
//! frequency is 1.0 when it appears in both and roughly 1.405 when it
//! appears in only one. Vectors include every n-gram up to the configured
//! size.

use crate::config::ScoringConfig;
use crate::processing::text_processor::{NormalizedText, TextProcessor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of comparing a resume to a job description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchScore {
    /// Final score on a 0-100 scale
    pub score: f32,
    /// Cosine similarity on a 0-100 scale, before the keyword boost
    pub base_similarity: f32,
    pub keyword_boost: f32,
    /// Distinct job terms found verbatim in the resume
    pub matched_keywords: Vec<String>,
}

impl MatchScore {
    fn zero() -> Self {
        Self {
            score: 0.0,
            base_similarity: 0.0,
            keyword_boost: 0.0,
            matched_keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordWeight {
    pub term: String,
    pub weight: f32,
}

pub struct SimilarityEngine {
    max_ngram: usize,
    boost_per_match: f32,
    boost_cap: f32,
}

impl SimilarityEngine {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            max_ngram: config.max_ngram.clamp(1, 4),
            boost_per_match: config.keyword_boost_per_match,
            boost_cap: config.keyword_boost_cap,
        }
    }

    pub fn compare_texts(&self, processor: &TextProcessor, resume: &str, job: &str) -> MatchScore {
        self.score(&processor.normalize(resume), &processor.normalize(job))
    }

    pub fn score(&self, resume: &NormalizedText, job: &NormalizedText) -> MatchScore {
        if resume.is_empty() || job.is_empty() {
            return MatchScore::zero();
        }

        let resume_counts = ngram_counts(&resume.tokens, self.max_ngram);
        let job_counts = ngram_counts(&job.tokens, self.max_ngram);

        let cosine = cosine_similarity(&resume_counts, &job_counts);
        let base_similarity = round2((cosine.clamp(0.0, 1.0) * 100.0) as f32);

        // Intersection of distinct unigrams, so the boost is order-independent too
        let matched_keywords: Vec<String> = job
            .distinct_terms()
            .filter(|term| resume.contains(term))
            .map(str::to_string)
            .collect();

        let keyword_boost = (matched_keywords.len() as f32 * self.boost_per_match).min(self.boost_cap);
        let score = (base_similarity + keyword_boost).clamp(0.0, 100.0);

        log::debug!(
            "similarity: cosine={:.4} base={:.2} boost={:.1} matched={}",
            cosine,
            base_similarity,
            keyword_boost,
            matched_keywords.len()
        );

        MatchScore {
            score: round2(score),
            base_similarity,
            keyword_boost,
            matched_keywords,
        }
    }

    /// Highest-weighted terms of `target` when scored against `other`
    pub fn top_keywords(
        &self,
        target: &NormalizedText,
        other: &NormalizedText,
        limit: usize,
    ) -> Vec<KeywordWeight> {
        let target_counts = ngram_counts(&target.tokens, self.max_ngram);
        let other_counts = ngram_counts(&other.tokens, self.max_ngram);

        let mut keywords: Vec<KeywordWeight> = target_counts
            .iter()
            .map(|(term, &count)| {
                let df = 1 + usize::from(other_counts.contains_key(term));
                KeywordWeight {
                    term: term.clone(),
                    weight: (count as f64 * smoothed_idf(df, 2)) as f32,
                }
            })
            .collect();

        keywords.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.term.cmp(&b.term))
        });
        keywords.truncate(limit);
        keywords
    }
}

/// Term counts for every n-gram of length 1..=max_n
pub fn ngram_counts(tokens: &[String], max_n: usize) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();

    for n in 1..=max_n.max(1) {
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }

    counts
}

/// Smoothed IDF: ln((N + 1) / (df + 1)) + 1
fn smoothed_idf(df: usize, doc_count: usize) -> f64 {
    ((doc_count as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0
}

/// Cosine similarity of the TF-IDF vectors of two documents, where the two
/// documents are the whole corpus.
pub fn cosine_similarity(a: &BTreeMap<String, usize>, b: &BTreeMap<String, usize>) -> f64 {
    let vocabulary: BTreeSet<&String> = a.keys().chain(b.keys()).collect();

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for term in vocabulary {
        let count_a = a.get(term).copied().unwrap_or(0);
        let count_b = b.get(term).copied().unwrap_or(0);
        let df = usize::from(count_a > 0) + usize::from(count_b > 0);
        let idf = smoothed_idf(df, 2);

        let weight_a = count_a as f64 * idf;
        let weight_b = count_b as f64 * idf;

        dot += weight_a * weight_b;
        norm_a += weight_a * weight_a;
        norm_b += weight_b * weight_b;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::lexicon::Lexicon;
    use std::sync::Arc;

    fn fixtures() -> (TextProcessor, SimilarityEngine) {
        let processor = TextProcessor::new(Arc::new(Lexicon::bundled().unwrap())).unwrap();
        (processor, SimilarityEngine::new(&ScoringConfig::default()))
    }

    #[test]
    fn test_identical_texts_score_full_marks() {
        let (processor, engine) = fixtures();
        let text = "Senior Rust engineer building distributed storage systems with Tokio";

        let result = engine.compare_texts(&processor, text, text);
        assert_eq!(result.base_similarity, 100.0);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let (processor, engine) = fixtures();

        let result = engine.compare_texts(&processor, "", "Python developer");
        assert_eq!(result.score, 0.0);
        assert!(result.matched_keywords.is_empty());

        let result = engine.compare_texts(&processor, "Python developer", "the and of");
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_disjoint_texts_have_no_base_similarity() {
        let (processor, engine) = fixtures();

        let result = engine.compare_texts(&processor, "gardening pottery", "kubernetes terraform");
        assert_eq!(result.base_similarity, 0.0);
        assert_eq!(result.keyword_boost, 0.0);
    }

    #[test]
    fn test_base_similarity_is_symmetric() {
        let (processor, engine) = fixtures();
        let a = "Python developer with Django and PostgreSQL experience, built REST APIs";
        let b = "We need a Django developer who knows PostgreSQL, Docker and AWS";

        let ab = engine.compare_texts(&processor, a, b);
        let ba = engine.compare_texts(&processor, b, a);
        assert_eq!(ab.base_similarity, ba.base_similarity);
        assert_eq!(ab.score, ba.score);
    }

    #[test]
    fn test_keyword_boost_is_capped() {
        let processor = TextProcessor::new(Arc::new(Lexicon::bundled().unwrap())).unwrap();
        let config = ScoringConfig {
            keyword_boost_per_match: 2.0,
            keyword_boost_cap: 5.0,
            ..ScoringConfig::default()
        };
        let engine = SimilarityEngine::new(&config);

        let result = engine.compare_texts(
            &processor,
            "rust python java docker kafka",
            "python java docker kafka terraform",
        );
        assert_eq!(result.matched_keywords, vec!["docker", "java", "kafka", "python"]);
        assert_eq!(result.keyword_boost, 5.0);
        assert!(result.score <= 100.0);
    }

    #[test]
    fn test_ngram_counts() {
        let tokens: Vec<String> = ["machine", "learning", "machine", "learning"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let counts = ngram_counts(&tokens, 2);
        assert_eq!(counts.get("machine"), Some(&2));
        assert_eq!(counts.get("machine learning"), Some(&2));
        assert_eq!(counts.get("learning machine"), Some(&1));
    }

    #[test]
    fn test_top_keywords_prefers_distinctive_terms() {
        let (processor, engine) = fixtures();
        let job = processor.normalize("Kafka Kafka streaming engineer, engineer");
        let resume = processor.normalize("engineer");

        let top = engine.top_keywords(&job, &resume, 3);
        assert_eq!(top[0].term, "kafka");
        assert_eq!(top.len(), 3);
    }
}
