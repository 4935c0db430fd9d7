//! Report summary derived from an analysis result

use crate::processing::analyzer::AnalysisResult;
use crate::processing::skill_gap::Priority;
use serde::{Deserialize, Serialize};

const STRENGTH_THRESHOLD: f32 = 70.0;
const WEAKNESS_THRESHOLD: f32 = 50.0;

/// Verdict band for a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreBand {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ScoreBand {
    pub fn from_score(score: f32) -> Self {
        if score >= 80.0 {
            ScoreBand::Excellent
        } else if score >= 60.0 {
            ScoreBand::Good
        } else if score >= 40.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "EXCELLENT",
            ScoreBand::Good => "GOOD",
            ScoreBand::Fair => "FAIR",
            ScoreBand::Poor => "POOR",
        }
    }
}

/// Executive summary with key findings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub match_band: ScoreBand,
    pub ats_band: ScoreBand,
    /// One-line verdict
    pub verdict: String,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
}

impl ReportSummary {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let match_band = ScoreBand::from_score(result.match_score.score);
        let ats_band = ScoreBand::from_score(result.ats_score.composite);

        let verdict = match match_band {
            ScoreBand::Excellent => "Excellent match - your resume aligns closely with this job",
            ScoreBand::Good => "Good match - a few targeted changes will strengthen it",
            ScoreBand::Fair => "Fair match - significant tailoring is recommended",
            ScoreBand::Poor => "Poor match - the resume needs substantial rework for this role",
        }
        .to_string();

        let mut strengths = Vec::new();
        let mut improvement_areas = Vec::new();

        for sub_score in &result.ats_score.sub_scores {
            let label = sub_score.category.label();
            if sub_score.score >= STRENGTH_THRESHOLD {
                strengths.push(format!("{} ({:.0}/100)", label, sub_score.score));
            } else if sub_score.score < WEAKNESS_THRESHOLD {
                improvement_areas.push(format!("{} ({:.0}/100)", label, sub_score.score));
            }
        }

        let matched = result.skill_gaps.matched_count();
        if matched > 0 {
            strengths.push(format!(
                "{} of {} requested skills present",
                matched,
                result.skill_gaps.all().count()
            ));
        }

        let critical: Vec<&str> = result
            .skill_gaps
            .missing()
            .filter(|s| s.priority == Priority::High)
            .map(|s| s.skill.as_str())
            .collect();
        if !critical.is_empty() {
            improvement_areas.push(format!("High-priority skills missing: {}", critical.join(", ")));
        }

        Self {
            match_band,
            ats_band,
            verdict,
            strengths,
            improvement_areas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::processing::analyzer::AnalysisEngine;

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(95.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(80.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(79.9), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(40.0), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(0.0), ScoreBand::Poor);
    }

    #[test]
    fn test_summary_flags_missing_high_priority_skills() {
        let engine = AnalysisEngine::new(&Config::default()).unwrap();
        let result = engine.analyze(
            "Python developer",
            "Kubernetes engineer. Kubernetes daily. Kubernetes on call. Python a plus.",
        );

        let summary = ReportSummary::from_result(&result);
        assert!(summary
            .improvement_areas
            .iter()
            .any(|a| a == "High-priority skills missing: Kubernetes"));
        assert!(summary.strengths.iter().any(|s| s == "1 of 2 requested skills present"));
    }
}
