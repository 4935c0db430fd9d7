//! ATS (Applicant Tracking System) compatibility scoring
//!
//! Six heuristics are scored independently on a 0-100 scale and then
//! combined with the configured weights. Every heuristic is plain lexical
//! analysis over the extracted text.

use crate::config::{AtsWeights, ScoringConfig};
use crate::error::{Result, ResumeMatcherError};
use crate::processing::lexicon::{Lexicon, TermMatcher};
use crate::processing::text_processor::{is_bullet_marker, light_stem, NormalizedText, TextProcessor};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

const MAX_LISTED_MISSING: usize = 10;
const FALLBACK_INDUSTRY_TERMS: usize = 10;
const BULLET_RATIO_TARGET: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtsCategory {
    KeywordCoverage,
    ActionVerbs,
    QuantifiableAchievements,
    TechnicalSkills,
    Formatting,
    IndustryAlignment,
}

impl AtsCategory {
    pub const ALL: [AtsCategory; 6] = [
        AtsCategory::KeywordCoverage,
        AtsCategory::ActionVerbs,
        AtsCategory::QuantifiableAchievements,
        AtsCategory::TechnicalSkills,
        AtsCategory::Formatting,
        AtsCategory::IndustryAlignment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AtsCategory::KeywordCoverage => "Keyword Coverage",
            AtsCategory::ActionVerbs => "Action Verbs",
            AtsCategory::QuantifiableAchievements => "Quantifiable Achievements",
            AtsCategory::TechnicalSkills => "Technical Skills",
            AtsCategory::Formatting => "Formatting",
            AtsCategory::IndustryAlignment => "Industry Alignment",
        }
    }

    pub fn weight(&self, weights: &AtsWeights) -> f32 {
        match self {
            AtsCategory::KeywordCoverage => weights.keyword_coverage,
            AtsCategory::ActionVerbs => weights.action_verbs,
            AtsCategory::QuantifiableAchievements => weights.quantifiable_achievements,
            AtsCategory::TechnicalSkills => weights.technical_skills,
            AtsCategory::Formatting => weights.formatting,
            AtsCategory::IndustryAlignment => weights.industry_alignment,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubScore {
    pub category: AtsCategory,
    /// 0-100
    pub score: f32,
    pub weight: f32,
    pub details: Vec<String>,
}

impl SubScore {
    pub fn weighted(&self) -> f32 {
        self.score * self.weight
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsScore {
    /// Weighted sum of the sub-scores, 0-100
    pub composite: f32,
    pub sub_scores: Vec<SubScore>,
    pub matched_keywords: Vec<String>,
    /// Most frequent job terms absent from the resume, at most ten
    pub missing_keywords: Vec<String>,
    pub action_verb_count: usize,
    pub quantifier_count: usize,
    pub detected_industry: Option<String>,
    pub word_count: usize,
}

impl AtsScore {
    pub fn sub_score(&self, category: AtsCategory) -> Option<&SubScore> {
        self.sub_scores.iter().find(|s| s.category == category)
    }

    pub fn score_for(&self, category: AtsCategory) -> f32 {
        self.sub_score(category).map(|s| s.score).unwrap_or(0.0)
    }
}

struct KeywordCoverage {
    score: f32,
    matched: Vec<String>,
    missing: Vec<String>,
    details: Vec<String>,
}

struct Counted {
    score: f32,
    count: usize,
    details: Vec<String>,
}

struct IndustryFit {
    score: f32,
    industry: Option<String>,
    details: Vec<String>,
}

struct IndustryMatcher {
    name: String,
    terms: Vec<String>,
    matcher: TermMatcher,
}

pub struct AtsScorer {
    processor: Arc<TextProcessor>,
    config: ScoringConfig,
    verb_stems: HashSet<String>,
    skill_names: Vec<String>,
    skill_matcher: TermMatcher,
    industries: Vec<IndustryMatcher>,
    quantifier_regex: Regex,
}

impl AtsScorer {
    pub fn new(processor: Arc<TextProcessor>, config: &ScoringConfig) -> Result<Self> {
        let lexicon: &Lexicon = processor.lexicon();

        let verb_stems = lexicon
            .action_verbs
            .iter()
            .map(|verb| light_stem(verb).to_string())
            .collect();

        let technical: Vec<_> = lexicon.taxonomy.technical_skills().collect();
        let skill_names = technical.iter().map(|s| s.name.clone()).collect();
        let skill_matcher = TermMatcher::for_skills(technical.iter().copied())?;

        let industries = lexicon
            .industries
            .iter()
            .map(|profile| -> Result<IndustryMatcher> {
                Ok(IndustryMatcher {
                    name: profile.name.clone(),
                    terms: profile.terms.clone(),
                    matcher: TermMatcher::new(profile.terms.iter().map(|t| [t.as_str()]))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let quantifier_regex = Regex::new(
            r"(?i)[$€£]\s?\d[\d,]*(?:\.\d+)?(?:\s?[kmb]\b)?|\b\d+(?:\.\d+)?\s?%|\b\d[\d,]*(?:\.\d+)?\+?",
        )
        .map_err(|e| ResumeMatcherError::Processing(format!("Invalid quantifier regex: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            processor,
            verb_stems,
            skill_names,
            skill_matcher,
            industries,
            quantifier_regex,
        })
    }

    pub fn score(&self, resume_text: &str, job_text: &str) -> AtsScore {
        let resume = self.processor.normalize(resume_text);
        let job = self.processor.normalize(job_text);
        self.score_normalized(resume_text, &resume, job_text, &job)
    }

    /// Same as [`AtsScorer::score`] for callers that already normalized both texts
    pub fn score_normalized(
        &self,
        resume_text: &str,
        resume: &NormalizedText,
        job_text: &str,
        job: &NormalizedText,
    ) -> AtsScore {
        let resume_stems: HashSet<&str> = resume.distinct_terms().map(light_stem).collect();
        let coverage = self.keyword_coverage(resume, &resume_stems, job);

        // Nothing left after normalization scores zero across the board
        if resume.is_empty() {
            let sub_scores = AtsCategory::ALL
                .iter()
                .map(|&category| SubScore {
                    category,
                    score: 0.0,
                    weight: category.weight(&self.config.weights),
                    details: if category == AtsCategory::KeywordCoverage {
                        coverage.details.clone()
                    } else {
                        vec!["Resume has no scorable text".to_string()]
                    },
                })
                .collect();

            return AtsScore {
                composite: 0.0,
                sub_scores,
                matched_keywords: Vec::new(),
                missing_keywords: coverage.missing,
                action_verb_count: 0,
                quantifier_count: 0,
                detected_industry: None,
                word_count: self.processor.word_count(resume_text),
            };
        }

        let verbs = self.action_verbs(resume_text);
        let quantifiers = self.quantifiable_achievements(resume_text);
        let (technical_score, technical_details) = self.technical_skills(resume_text, job_text);
        let (formatting_score, formatting_details) = self.formatting(resume_text);
        let industry = self.industry_alignment(resume_text, &resume_stems, job_text, job);

        let weights = &self.config.weights;
        let sub_scores: Vec<SubScore> = [
            (AtsCategory::KeywordCoverage, coverage.score, coverage.details),
            (AtsCategory::ActionVerbs, verbs.score, verbs.details),
            (AtsCategory::QuantifiableAchievements, quantifiers.score, quantifiers.details),
            (AtsCategory::TechnicalSkills, technical_score, technical_details),
            (AtsCategory::Formatting, formatting_score, formatting_details),
            (AtsCategory::IndustryAlignment, industry.score, industry.details),
        ]
        .into_iter()
        .map(|(category, score, details)| SubScore {
            category,
            score: round2(score.clamp(0.0, 100.0)),
            weight: category.weight(weights),
            details,
        })
        .collect();

        let composite = sub_scores.iter().map(SubScore::weighted).sum::<f32>().clamp(0.0, 100.0);

        log::debug!(
            "ats: composite={:.2} [{}]",
            composite,
            sub_scores
                .iter()
                .map(|s| format!("{}={:.1}", s.category.label(), s.score))
                .collect::<Vec<_>>()
                .join(", ")
        );

        AtsScore {
            composite,
            sub_scores,
            matched_keywords: coverage.matched,
            missing_keywords: coverage.missing,
            action_verb_count: verbs.count,
            quantifier_count: quantifiers.count,
            detected_industry: industry.industry,
            word_count: self.processor.word_count(resume_text),
        }
    }

    fn keyword_coverage(
        &self,
        resume: &NormalizedText,
        resume_stems: &HashSet<&str>,
        job: &NormalizedText,
    ) -> KeywordCoverage {
        let mut matched = Vec::new();
        let mut missing: Vec<(&str, usize)> = Vec::new();

        for (term, &count) in &job.frequencies {
            if term.chars().all(|c| c.is_numeric()) {
                continue;
            }
            if resume.contains(term) || resume_stems.contains(light_stem(term)) {
                matched.push(term.clone());
            } else {
                missing.push((term.as_str(), count));
            }
        }

        let total = matched.len() + missing.len();
        if total == 0 {
            return KeywordCoverage {
                score: 0.0,
                matched,
                missing: Vec::new(),
                details: vec!["Job description has no scorable terms".to_string()],
            };
        }

        missing.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        let missing: Vec<String> = missing
            .into_iter()
            .take(MAX_LISTED_MISSING)
            .map(|(term, _)| term.to_string())
            .collect();

        let score = matched.len() as f32 / total as f32 * 100.0;
        let mut details = vec![format!("Matched {} of {} job terms", matched.len(), total)];
        if !missing.is_empty() {
            details.push(format!("Missing: {}", missing.join(", ")));
        }

        KeywordCoverage {
            score,
            matched,
            missing,
            details,
        }
    }

    fn action_verbs(&self, resume_text: &str) -> Counted {
        let statements = self.processor.split_statements(resume_text);
        if statements.is_empty() {
            return Counted {
                score: 0.0,
                count: 0,
                details: vec!["No statements found".to_string()],
            };
        }

        let mut instances = 0;
        let mut with_verb = 0;
        let mut found: Vec<String> = Vec::new();

        for statement in &statements {
            let normalized = self.processor.normalize(statement);
            let hits: Vec<&String> = normalized
                .tokens
                .iter()
                .filter(|token| self.verb_stems.contains(light_stem(token)))
                .collect();

            if !hits.is_empty() {
                with_verb += 1;
            }
            instances += hits.len();
            for hit in hits {
                if !found.contains(hit) {
                    found.push(hit.clone());
                }
            }
        }

        let fraction = with_verb as f32 / statements.len() as f32;
        let saturation = (instances as f32 / self.config.action_verb_saturation as f32).min(1.0);
        let score = 50.0 * fraction + 50.0 * saturation;

        let mut details = vec![format!(
            "{} of {} statements use a strong action verb ({} total)",
            with_verb,
            statements.len(),
            instances
        )];
        if !found.is_empty() {
            details.push(format!("Found: {}", found.join(", ")));
        }

        Counted {
            score,
            count: instances,
            details,
        }
    }

    fn quantifiable_achievements(&self, resume_text: &str) -> Counted {
        let cleaned = self.processor.strip_contact_info(resume_text);
        let found: Vec<&str> = self
            .quantifier_regex
            .find_iter(&cleaned)
            .map(|m| m.as_str().trim())
            .collect();

        let count = found.len();
        let score = (count as f32 / self.config.quantifiable_saturation as f32).min(1.0) * 100.0;

        let mut details = vec![format!("{} quantified results", count)];
        if !found.is_empty() {
            let examples: Vec<&str> = found.iter().take(5).copied().collect();
            details.push(format!("Examples: {}", examples.join(", ")));
        }

        Counted {
            score,
            count,
            details,
        }
    }

    fn technical_skills(&self, resume_text: &str, job_text: &str) -> (f32, Vec<String>) {
        let job_counts = self.skill_matcher.count(job_text);
        let resume_counts = self.skill_matcher.count(resume_text);

        let relevant: Vec<usize> = (0..job_counts.len()).filter(|&i| job_counts[i] > 0).collect();

        if relevant.is_empty() {
            return (0.0, vec!["Job names no known technical skills".to_string()]);
        }

        let (present, absent): (Vec<usize>, Vec<usize>) =
            relevant.iter().partition(|&&i| resume_counts[i] > 0);

        let score = present.len() as f32 / relevant.len() as f32 * 100.0;
        let mut details = vec![format!(
            "Found {} of {} technical skills named in the job",
            present.len(),
            relevant.len()
        )];
        if !absent.is_empty() {
            let names: Vec<&str> = absent.iter().map(|&i| self.skill_names[i].as_str()).collect();
            details.push(format!("Missing: {}", names.join(", ")));
        }

        (score, details)
    }

    fn formatting(&self, resume_text: &str) -> (f32, Vec<String>) {
        let lexicon = self.processor.lexicon();
        let lines: Vec<&str> = resume_text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

        let mut sections_found = Vec::new();
        let mut has_summary = false;
        for line in &lines {
            let cleaned = self.processor.clean(line);
            if cleaned.is_empty() || cleaned.split(' ').count() > 5 {
                continue;
            }
            let is_header = |phrases: &[String]| {
                phrases
                    .iter()
                    .any(|p| cleaned == *p || cleaned.starts_with(&format!("{} ", p)))
            };
            for (name, phrases) in [
                ("experience", &lexicon.sections.experience),
                ("education", &lexicon.sections.education),
                ("skills", &lexicon.sections.skills),
            ] {
                if is_header(phrases) && !sections_found.contains(&name) {
                    sections_found.push(name);
                }
            }
            has_summary |= is_header(&lexicon.sections.summary);
        }

        let section_points = 40.0 * sections_found.len() as f32 / 3.0;
        let has_contact = self.processor.has_contact_info(resume_text);
        let contact_points = if has_contact { 20.0 } else { 0.0 };

        let bullets = lines
            .iter()
            .filter(|l| l.starts_with(is_bullet_marker))
            .count();
        let bullet_ratio = if lines.is_empty() {
            0.0
        } else {
            bullets as f32 / lines.len() as f32
        };
        let bullet_points = 20.0 * (bullet_ratio / BULLET_RATIO_TARGET).min(1.0);

        let words = self.processor.word_count(resume_text);
        let (min_words, max_words) = (self.config.min_resume_words, self.config.max_resume_words);
        let length_points = if words == 0 {
            0.0
        } else if words < min_words {
            20.0 * words as f32 / min_words as f32
        } else if words > max_words {
            20.0 * max_words as f32 / words as f32
        } else {
            20.0
        };

        let mut details = Vec::new();
        if sections_found.is_empty() {
            details.push("No standard section headers found".to_string());
        } else {
            details.push(format!("Sections: {}", sections_found.join(", ")));
        }
        if has_summary {
            details.push("Summary section present".to_string());
        }
        details.push(if has_contact {
            "Contact information present".to_string()
        } else {
            "No email or phone number found".to_string()
        });
        details.push(format!("{} of {} lines are bullet points", bullets, lines.len()));
        details.push(format!(
            "{} words (recommended {}-{})",
            words, min_words, max_words
        ));

        (
            section_points + contact_points + bullet_points + length_points,
            details,
        )
    }

    fn industry_alignment(
        &self,
        resume_text: &str,
        resume_stems: &HashSet<&str>,
        job_text: &str,
        job: &NormalizedText,
    ) -> IndustryFit {
        if job.is_empty() {
            return IndustryFit {
                score: 0.0,
                industry: None,
                details: vec!["Job description is empty".to_string()],
            };
        }

        let mut best: Option<(&IndustryMatcher, Vec<usize>)> = None;
        for industry in &self.industries {
            let counts = industry.matcher.count(job_text);
            let hits = counts.iter().filter(|&&c| c > 0).count();
            let best_hits = best
                .as_ref()
                .map(|(_, c)| c.iter().filter(|&&c| c > 0).count())
                .unwrap_or(0);
            if hits > best_hits {
                best = Some((industry, counts));
            }
        }

        if let Some((industry, job_counts)) = best {
            let resume_counts = industry.matcher.count(resume_text);
            let relevant: Vec<usize> = (0..job_counts.len()).filter(|&i| job_counts[i] > 0).collect();
            let present: Vec<&str> = relevant
                .iter()
                .filter(|&&i| resume_counts[i] > 0)
                .map(|&i| industry.terms[i].as_str())
                .collect();

            let score = present.len() as f32 / relevant.len() as f32 * 100.0;
            let mut details = vec![
                format!("Detected industry: {}", industry.name),
                format!("{} of {} industry terms covered", present.len(), relevant.len()),
            ];
            if !present.is_empty() {
                details.push(format!("Covered: {}", present.join(", ")));
            }

            return IndustryFit {
                score,
                industry: Some(industry.name.clone()),
                details,
            };
        }

        // No profile fits; the job's own most frequent terms form the cluster
        let mut frequent: Vec<(&String, &usize)> = job
            .frequencies
            .iter()
            .filter(|(term, _)| !term.chars().all(|c| c.is_numeric()))
            .collect();
        frequent.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        frequent.truncate(FALLBACK_INDUSTRY_TERMS);

        if frequent.is_empty() {
            return IndustryFit {
                score: 0.0,
                industry: None,
                details: vec!["No industry terms found in job description".to_string()],
            };
        }

        let covered = frequent
            .iter()
            .filter(|(term, _)| resume_stems.contains(light_stem(term)))
            .count();

        IndustryFit {
            score: covered as f32 / frequent.len() as f32 * 100.0,
            industry: None,
            details: vec![
                "No known industry profile matched".to_string(),
                format!("{} of {} dominant job terms covered", covered, frequent.len()),
            ],
        }
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> AtsScorer {
        let lexicon = Arc::new(Lexicon::bundled().unwrap());
        let processor = Arc::new(TextProcessor::new(lexicon).unwrap());
        AtsScorer::new(processor, &ScoringConfig::default()).unwrap()
    }

    const RESUME: &str = "Jane Doe\njane@example.com | (555) 123-4567\n\nSummary\nBackend engineer.\n\nExperience\n• Led migration of 12 services to Kubernetes, cutting costs by 30%\n• Built Python APIs serving $2M in annual revenue\n• Mentored 4 junior developers\n\nEducation\nBSc Computer Science\n\nSkills\nPython, Docker, Kubernetes, PostgreSQL";

    #[test]
    fn test_composite_is_weighted_sum() {
        let scorer = scorer();
        let result = scorer.score(RESUME, "Python engineer with Kubernetes and AWS experience");

        let expected: f32 = result.sub_scores.iter().map(|s| s.score * s.weight).sum();
        assert!((result.composite - expected).abs() < 1e-3);
        assert_eq!(result.sub_scores.len(), 6);
    }

    #[test]
    fn test_empty_resume_scores_zero() {
        let scorer = scorer();
        let result = scorer.score("", "Python developer with AWS experience");

        assert_eq!(result.composite, 0.0);
        assert!(result.sub_scores.iter().all(|s| s.score == 0.0));
        assert!(!result.missing_keywords.is_empty());
    }

    #[test]
    fn test_stopword_only_resume_scores_zero() {
        let scorer = scorer();
        let result = scorer.score("The and of, to.", "Python developer with AWS and Docker experience");

        assert_eq!(result.composite, 0.0);
        assert!(result.sub_scores.iter().all(|s| s.score == 0.0));
        assert_eq!(result.sub_scores.len(), 6);
        assert!(result.missing_keywords.contains(&"python".to_string()));
    }

    #[test]
    fn test_job_without_known_skills_gives_no_technical_credit() {
        let scorer = scorer();
        let resume = "Python Rust Docker Kubernetes AWS engineer";

        for job in ["", "Friendly barista for our downtown cafe"] {
            let result = scorer.score(resume, job);
            assert_eq!(result.score_for(AtsCategory::TechnicalSkills), 0.0);
            let details = &result.sub_score(AtsCategory::TechnicalSkills).unwrap().details;
            assert_eq!(details, &vec!["Job names no known technical skills".to_string()]);
        }
    }

    #[test]
    fn test_keyword_coverage_accepts_inflections_only() {
        let scorer = scorer();

        let result = scorer.score("Deployed services and uses Terraform", "deploy use");
        assert_eq!(result.score_for(AtsCategory::KeywordCoverage), 100.0);

        // a shared prefix is not an inflection
        let result = scorer.score("Power user of spreadsheets", "use");
        assert_eq!(result.score_for(AtsCategory::KeywordCoverage), 0.0);
        assert_eq!(result.missing_keywords, vec!["use".to_string()]);
    }

    #[test]
    fn test_quantifiers_ignore_contact_numbers() {
        let scorer = scorer();
        let result = scorer.score(RESUME, "Python engineer");

        // 12, 30%, $2M, 4
        assert_eq!(result.quantifier_count, 4);
        assert_eq!(result.score_for(AtsCategory::QuantifiableAchievements), 80.0);
    }

    #[test]
    fn test_formatting_detects_sections_and_bullets() {
        let scorer = scorer();
        let result = scorer.score(RESUME, "Python engineer");
        let formatting = result.sub_score(AtsCategory::Formatting).unwrap();

        assert!(formatting.details.iter().any(|d| d == "Sections: experience, education, skills"));
        assert!(formatting.details.iter().any(|d| d == "Summary section present"));
        assert!(formatting.details.iter().any(|d| d == "Contact information present"));
        // headers, contact and bullets all full; length is short
        assert!(formatting.score > 80.0 && formatting.score < 100.0);
    }

    #[test]
    fn test_technical_skills_restricted_to_job() {
        let scorer = scorer();
        let result = scorer.score(RESUME, "Python and AWS developer");

        assert_eq!(result.score_for(AtsCategory::TechnicalSkills), 50.0);
        let details = &result.sub_score(AtsCategory::TechnicalSkills).unwrap().details;
        assert!(details.iter().any(|d| d == "Missing: AWS"));
    }

    #[test]
    fn test_java_does_not_match_javascript() {
        let scorer = scorer();
        let result = scorer.score("Senior JavaScript developer", "Java developer");

        assert_eq!(result.score_for(AtsCategory::TechnicalSkills), 0.0);
        assert!(result.missing_keywords.contains(&"java".to_string()));
    }

    #[test]
    fn test_industry_detection() {
        let scorer = scorer();
        let result = scorer.score(RESUME, "Software engineer on an agile team doing code review");

        assert_eq!(result.detected_industry.as_deref(), Some("Software Development"));
        let industry = result.score_for(AtsCategory::IndustryAlignment);
        assert!(industry > 0.0 && industry < 100.0);
    }

    #[test]
    fn test_action_verbs_counted_per_statement() {
        let scorer = scorer();
        let result = scorer.score("Led the team.\nWrote documents.", "Team lead");

        assert_eq!(result.action_verb_count, 1);
        // half the statements, 1 of 10 instances
        assert_eq!(result.score_for(AtsCategory::ActionVerbs), 30.0);
    }
}
