//! Rule-based improvement advice derived from the scores

use crate::processing::ats_scorer::{AtsCategory, AtsScore};
use crate::processing::similarity::MatchScore;
use crate::processing::skill_gap::{Priority, SkillGapReport};
use crate::processing::text_processor::NormalizedText;
use serde::{Deserialize, Serialize};

pub const MIN_RECOMMENDATIONS: usize = 4;
pub const MAX_RECOMMENDATIONS: usize = 6;

/// Scores below this trigger corrective advice
const ATTENTION_THRESHOLD: f32 = 70.0;
const FEW_ACTION_VERBS: usize = 5;
const FEW_QUANTIFIERS: usize = 3;
const LISTED_KEYWORDS: usize = 3;
const LISTED_SKILLS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationKind {
    SkillGap,
    Keywords,
    Content,
    ActionVerbs,
    Quantification,
    Formatting,
    Polish,
    Industry,
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl Recommendation {
    fn new(kind: RecommendationKind, priority: Priority, title: &str, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.into(),
            priority,
        }
    }
}

/// Between four and six recommendations, most urgent first
pub fn generate_recommendations(
    match_score: &MatchScore,
    ats: &AtsScore,
    gaps: &SkillGapReport,
    job: &NormalizedText,
) -> Vec<Recommendation> {
    use RecommendationKind::*;

    let mut recommendations = Vec::new();

    let mut urgent: Vec<_> = gaps.missing().filter(|s| s.priority >= Priority::Medium).collect();
    urgent.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(b.job_frequency.cmp(&a.job_frequency))
    });
    let urgent_skills: Vec<&str> = urgent
        .iter()
        .take(LISTED_SKILLS)
        .map(|s| s.skill.as_str())
        .collect();
    if !urgent_skills.is_empty() {
        recommendations.push(Recommendation::new(
            SkillGap,
            Priority::High,
            "Close Skill Gaps",
            format!(
                "The job asks for skills your resume does not show: {}",
                urgent_skills.join(", ")
            ),
        ));
    }

    if match_score.score < ATTENTION_THRESHOLD {
        if !ats.missing_keywords.is_empty() {
            let listed: Vec<&str> = ats
                .missing_keywords
                .iter()
                .take(LISTED_KEYWORDS)
                .map(String::as_str)
                .collect();
            recommendations.push(Recommendation::new(
                Keywords,
                Priority::High,
                "Add Key Terms",
                format!("Include these important keywords: {}", listed.join(", ")),
            ));
        }
        recommendations.push(Recommendation::new(
            Content,
            Priority::Medium,
            "Skills Alignment",
            "Review the job requirements and highlight matching experience more prominently",
        ));
        recommendations.push(Recommendation::new(
            Content,
            Priority::Medium,
            "Content Optimization",
            "Rewrite role descriptions to mirror the language of the target job",
        ));
    }

    if ats.composite < ATTENTION_THRESHOLD {
        if ats.action_verb_count < FEW_ACTION_VERBS {
            recommendations.push(Recommendation::new(
                ActionVerbs,
                Priority::High,
                "Action Verbs",
                "Open bullet points with strong verbs such as 'spearheaded', 'orchestrated' or 'delivered'",
            ));
        }
        if ats.quantifier_count < FEW_QUANTIFIERS {
            recommendations.push(Recommendation::new(
                Quantification,
                Priority::High,
                "Quantify Results",
                "Add specific numbers, percentages or dollar amounts to show impact",
            ));
        }
        if ats.score_for(AtsCategory::Formatting) < ATTENTION_THRESHOLD {
            recommendations.push(Recommendation::new(
                Formatting,
                Priority::Medium,
                "Format Improvement",
                "Use clear section headers, bullet points and visible contact details",
            ));
        }
    }

    if match_score.score >= ATTENTION_THRESHOLD && ats.composite >= ATTENTION_THRESHOLD {
        recommendations.extend([
            Recommendation::new(
                Polish,
                Priority::Low,
                "Excellent Foundation",
                "Your resume shows strong alignment with the job requirements",
            ),
            Recommendation::new(
                Polish,
                Priority::Low,
                "Fine-Tuning",
                "Tailor your professional summary to this specific role",
            ),
            Recommendation::new(
                Polish,
                Priority::Low,
                "Profile Sync",
                "Make sure your online professional profiles match the resume's key points",
            ),
            Recommendation::new(
                Polish,
                Priority::Low,
                "Cover Letter",
                "Write a cover letter that tells the story behind your strongest results",
            ),
        ]);
    }

    // The industry tip always survives truncation
    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
    recommendations.truncate(MAX_RECOMMENDATIONS - 1);
    recommendations.push(industry_tip(job));
    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));

    for (title, description) in GENERAL_TIPS {
        if recommendations.len() >= MIN_RECOMMENDATIONS {
            break;
        }
        if recommendations.iter().all(|r| r.title != title) {
            recommendations.push(Recommendation::new(General, Priority::Low, title, description));
        }
    }

    recommendations
}

const GENERAL_TIPS: [(&str, &str); 5] = [
    ("Professional Summary", "Open with a focused two or three line summary"),
    ("Education Relevance", "Highlight relevant coursework, certifications or training"),
    ("Keyword Density", "Work job-specific terms naturally into every section"),
    ("Recent Experience", "Emphasize your most recent and relevant work"),
    ("Achievement Focus", "Turn job duties into accomplishment statements"),
];

fn industry_tip(job: &NormalizedText) -> Recommendation {
    let (title, description) = if job.contains("software") || job.contains("developer") {
        (
            "Tech Focus",
            "Highlight programming languages, frameworks and technical projects",
        )
    } else if job.contains("marketing") {
        (
            "Marketing Metrics",
            "Include campaign results, conversion rates and ROI improvements",
        )
    } else if job.contains("sales") {
        (
            "Sales Numbers",
            "Emphasize quota attainment, revenue generated and client acquisition",
        )
    } else {
        (
            "Industry Alignment",
            "Research the industry's terminology and use it where it honestly applies",
        )
    };

    Recommendation::new(RecommendationKind::Industry, Priority::Medium, title, description)
}
