//! Skill gap analysis against the skill taxonomy

use crate::config::{ScoringConfig, StrengthPolicy};
use crate::error::Result;
use crate::processing::lexicon::{SkillTaxonomy, TermMatcher};
use crate::processing::text_processor::NormalizedText;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub category: String,
    pub in_job: bool,
    pub in_resume: bool,
    /// Mentions of the skill or any synonym in the job description
    pub job_frequency: usize,
    pub resume_frequency: usize,
    /// 0.0-1.0, see [`StrengthPolicy`]
    pub strength: f32,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<SkillGap>,
}

/// Skills the job asks for, grouped by taxonomy category.
///
/// Groups keep taxonomy order and are never empty. Within a group skills are
/// ordered by priority (high first) and then by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillGapReport {
    pub groups: Vec<SkillGroup>,
}

impl SkillGapReport {
    pub fn all(&self) -> impl Iterator<Item = &SkillGap> {
        self.groups.iter().flat_map(|g| g.skills.iter())
    }

    pub fn missing(&self) -> impl Iterator<Item = &SkillGap> {
        self.all().filter(|s| !s.in_resume)
    }

    pub fn matched_count(&self) -> usize {
        self.all().filter(|s| s.in_resume).count()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

struct IndexedSkill {
    name: String,
    category: usize,
}

pub struct SkillGapAnalyzer {
    category_names: Vec<String>,
    skills: Vec<IndexedSkill>,
    matcher: TermMatcher,
    high_priority_frequency: usize,
    strength_policy: StrengthPolicy,
}

impl SkillGapAnalyzer {
    pub fn new(taxonomy: &SkillTaxonomy, config: &ScoringConfig) -> Result<Self> {
        let category_names = taxonomy.categories.iter().map(|c| c.name.clone()).collect();

        let skills = taxonomy
            .categories
            .iter()
            .enumerate()
            .flat_map(|(index, category)| {
                category.skills.iter().map(move |skill| IndexedSkill {
                    name: skill.name.clone(),
                    category: index,
                })
            })
            .collect();

        let matcher = TermMatcher::for_skills(taxonomy.categories.iter().flat_map(|c| c.skills.iter()))?;

        Ok(Self {
            category_names,
            skills,
            matcher,
            high_priority_frequency: config.high_priority_frequency.max(1),
            strength_policy: config.strength_policy,
        })
    }

    /// An empty resume has nothing to compare against and yields an empty report
    pub fn analyze(&self, resume_text: &str, job_text: &str) -> SkillGapReport {
        if resume_text.trim().is_empty() {
            return SkillGapReport::default();
        }
        self.analyze_raw(resume_text, job_text)
    }

    /// Same as [`SkillGapAnalyzer::analyze`], treating a resume with no
    /// terms left after normalization as empty
    pub fn analyze_normalized(
        &self,
        resume_text: &str,
        resume: &NormalizedText,
        job_text: &str,
    ) -> SkillGapReport {
        if resume.is_empty() {
            return SkillGapReport::default();
        }
        self.analyze_raw(resume_text, job_text)
    }

    fn analyze_raw(&self, resume_text: &str, job_text: &str) -> SkillGapReport {
        let job_counts = self.matcher.count(job_text);
        let resume_counts = self.matcher.count(resume_text);

        let mut groups: Vec<SkillGroup> = self
            .category_names
            .iter()
            .map(|name| SkillGroup {
                category: name.clone(),
                skills: Vec::new(),
            })
            .collect();

        for (index, skill) in self.skills.iter().enumerate() {
            let job_frequency = job_counts[index];
            if job_frequency == 0 {
                continue;
            }

            let resume_frequency = resume_counts[index];
            let in_resume = resume_frequency > 0;

            groups[skill.category].skills.push(SkillGap {
                skill: skill.name.clone(),
                category: self.category_names[skill.category].clone(),
                in_job: true,
                in_resume,
                job_frequency,
                resume_frequency,
                strength: self.strength(resume_frequency, job_frequency),
                priority: self.priority(job_frequency, in_resume),
            });
        }

        for group in &mut groups {
            group
                .skills
                .sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.skill.cmp(&b.skill)));
        }
        groups.retain(|g| !g.skills.is_empty());

        log::debug!(
            "skill gap: {} job skills in {} categories",
            groups.iter().map(|g| g.skills.len()).sum::<usize>(),
            groups.len()
        );

        SkillGapReport { groups }
    }

    fn priority(&self, job_frequency: usize, in_resume: bool) -> Priority {
        if in_resume {
            Priority::Low
        } else if job_frequency >= self.high_priority_frequency {
            Priority::High
        } else {
            Priority::Medium
        }
    }

    fn strength(&self, resume_frequency: usize, job_frequency: usize) -> f32 {
        match self.strength_policy {
            StrengthPolicy::Binary => {
                if resume_frequency > 0 {
                    1.0
                } else {
                    0.0
                }
            }
            StrengthPolicy::Graded => (resume_frequency as f32 / job_frequency.max(1) as f32).min(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::lexicon::Lexicon;
    use crate::processing::text_processor::TextProcessor;
    use std::sync::Arc;

    fn analyzer(policy: StrengthPolicy) -> SkillGapAnalyzer {
        let lexicon = Lexicon::bundled().unwrap();
        let config = ScoringConfig {
            strength_policy: policy,
            ..ScoringConfig::default()
        };
        SkillGapAnalyzer::new(&lexicon.taxonomy, &config).unwrap()
    }

    #[test]
    fn test_only_job_skills_are_reported() {
        let analyzer = analyzer(StrengthPolicy::Binary);
        let report = analyzer.analyze("Python, Rust, Docker and Terraform", "Python and Docker");

        let names: Vec<&str> = report.all().map(|s| s.skill.as_str()).collect();
        assert!(names.contains(&"Python"));
        assert!(names.contains(&"Docker"));
        assert!(!names.contains(&"Rust"));
        assert!(report.all().all(|s| s.in_job));
    }

    #[test]
    fn test_priorities() {
        let analyzer = analyzer(StrengthPolicy::Binary);
        let job = "Kubernetes required. Kubernetes operators. Kubernetes at scale. AWS and Python.";
        let report = analyzer.analyze("Python developer", job);

        let find = |name: &str| report.all().find(|s| s.skill == name).unwrap().clone();
        assert_eq!(find("Kubernetes").priority, Priority::High);
        assert_eq!(find("Kubernetes").job_frequency, 3);
        assert_eq!(find("AWS").priority, Priority::Medium);
        assert_eq!(find("Python").priority, Priority::Low);
        assert_eq!(find("Python").strength, 1.0);
        assert_eq!(find("AWS").strength, 0.0);
    }

    #[test]
    fn test_groups_are_sorted() {
        let analyzer = analyzer(StrengthPolicy::Binary);
        let job = "Docker Docker Docker, AWS, Terraform, Linux, Git";
        let report = analyzer.analyze("Git and Linux", job);

        let cloud = report
            .groups
            .iter()
            .find(|g| g.category == "Cloud & DevOps")
            .unwrap();
        let order: Vec<&str> = cloud.skills.iter().map(|s| s.skill.as_str()).collect();
        assert_eq!(order, vec!["Docker", "AWS", "Terraform", "Git", "Linux"]);
    }

    #[test]
    fn test_synonyms_count_towards_skill() {
        let analyzer = analyzer(StrengthPolicy::Binary);
        let report = analyzer.analyze("Ran k8s clusters", "Kubernetes and K8s experience");

        let kubernetes = report.all().find(|s| s.skill == "Kubernetes").unwrap();
        assert_eq!(kubernetes.job_frequency, 2);
        assert!(kubernetes.in_resume);
    }

    #[test]
    fn test_java_and_javascript_are_distinct() {
        let analyzer = analyzer(StrengthPolicy::Binary);
        let report = analyzer.analyze("JavaScript and TypeScript", "Java backend engineer");

        let java = report.all().find(|s| s.skill == "Java").unwrap();
        assert!(!java.in_resume);
        assert!(report.all().all(|s| s.skill != "JavaScript"));
    }

    #[test]
    fn test_graded_strength() {
        let analyzer = analyzer(StrengthPolicy::Graded);
        let report = analyzer.analyze("Python", "Python, Python and more Python, AWS");

        let python = report.all().find(|s| s.skill == "Python").unwrap();
        assert!((python.strength - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_job_yields_empty_report() {
        let analyzer = analyzer(StrengthPolicy::Binary);
        assert!(analyzer.analyze("Python and Rust", "").is_empty());
    }

    #[test]
    fn test_stopword_only_resume_yields_empty_report() {
        let lexicon = Arc::new(Lexicon::bundled().unwrap());
        let processor = TextProcessor::new(lexicon).unwrap();
        let analyzer = analyzer(StrengthPolicy::Binary);

        let resume = "The and of, to.";
        let report = analyzer.analyze_normalized(resume, &processor.normalize(resume), "Python developer with AWS");
        assert!(report.is_empty());
    }

    #[test]
    fn test_empty_resume_yields_empty_report() {
        let analyzer = analyzer(StrengthPolicy::Binary);
        assert!(analyzer.analyze("  \n", "Python developer with AWS").is_empty());
    }
}
