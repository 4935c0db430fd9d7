//! Word lists and skill taxonomy shared by every scoring component
//!
//! The bundled lexicon is compiled into the binary. A different one can be
//! supplied as a TOML file with the same layout as `default_lexicon.toml`.

use crate::error::{Result, ResumeMatcherError};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

const BUNDLED_LEXICON: &str = include_str!("default_lexicon.toml");

#[derive(Debug, Deserialize)]
struct LexiconFile {
    stopwords: Vec<String>,
    action_verbs: Vec<String>,
    sections: SectionHeaders,
    #[serde(default)]
    industries: Vec<IndustryProfile>,
    categories: Vec<CategoryEntry>,
    #[serde(default)]
    synonyms: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct CategoryEntry {
    name: String,
    #[serde(default = "default_technical")]
    technical: bool,
    skills: Vec<String>,
}

fn default_technical() -> bool {
    true
}

/// Header phrases that mark the standard resume sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionHeaders {
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub skills: Vec<String>,
    #[serde(default)]
    pub summary: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryProfile {
    pub name: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Skill {
    /// Display name as written in the taxonomy
    pub name: String,
    /// Lowercase surface forms: the name itself followed by its synonyms
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillCategory {
    pub name: String,
    pub technical: bool,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillTaxonomy {
    pub categories: Vec<SkillCategory>,
}

impl SkillTaxonomy {
    pub fn skill_count(&self) -> usize {
        self.categories.iter().map(|c| c.skills.len()).sum()
    }

    /// Skills from every category flagged as technical, in taxonomy order
    pub fn technical_skills(&self) -> impl Iterator<Item = &Skill> {
        self.categories
            .iter()
            .filter(|c| c.technical)
            .flat_map(|c| c.skills.iter())
    }
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    pub stopwords: HashSet<String>,
    pub action_verbs: Vec<String>,
    pub sections: SectionHeaders,
    pub industries: Vec<IndustryProfile>,
    pub taxonomy: SkillTaxonomy,
}

impl Lexicon {
    /// The lexicon shipped with the crate
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_LEXICON)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: LexiconFile = toml::from_str(content)
            .map_err(|e| ResumeMatcherError::Lexicon(format!("Failed to parse lexicon: {}", e)))?;

        let stopwords = file.stopwords.iter().map(|w| normalize_entry(w)).collect();
        let action_verbs = file.action_verbs.iter().map(|w| normalize_entry(w)).collect();

        let sections = SectionHeaders {
            experience: normalize_all(&file.sections.experience),
            education: normalize_all(&file.sections.education),
            skills: normalize_all(&file.sections.skills),
            summary: normalize_all(&file.sections.summary),
        };

        let industries = file
            .industries
            .into_iter()
            .map(|profile| IndustryProfile {
                terms: normalize_all(&profile.terms),
                name: profile.name,
            })
            .collect();

        let taxonomy = build_taxonomy(file.categories, file.synonyms)?;

        Ok(Self {
            stopwords,
            action_verbs,
            sections,
            industries,
            taxonomy,
        })
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }
}

fn normalize_entry(entry: &str) -> String {
    entry.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn normalize_all(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|e| normalize_entry(e))
        .filter(|e| !e.is_empty())
        .collect()
}

fn build_taxonomy(
    categories: Vec<CategoryEntry>,
    mut synonyms: BTreeMap<String, Vec<String>>,
) -> Result<SkillTaxonomy> {
    if categories.is_empty() {
        return Err(ResumeMatcherError::Lexicon(
            "taxonomy must define at least one category".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut built = Vec::with_capacity(categories.len());

    for category in categories {
        let mut skills = Vec::with_capacity(category.skills.len());
        for name in category.skills {
            let name = name.trim().to_string();
            let key = normalize_entry(&name);
            if key.is_empty() {
                return Err(ResumeMatcherError::Lexicon(format!(
                    "empty skill name in category '{}'",
                    category.name
                )));
            }
            if !seen.insert(key.clone()) {
                return Err(ResumeMatcherError::Lexicon(format!("duplicate skill '{}'", name)));
            }

            let mut patterns = vec![key];
            for synonym in synonyms.remove(&name).unwrap_or_default() {
                let synonym = normalize_entry(&synonym);
                if !synonym.is_empty() && !patterns.contains(&synonym) {
                    patterns.push(synonym);
                }
            }

            skills.push(Skill { name, patterns });
        }

        built.push(SkillCategory {
            name: category.name,
            technical: category.technical,
            skills,
        });
    }

    if let Some(orphan) = synonyms.keys().next() {
        return Err(ResumeMatcherError::Lexicon(format!(
            "synonyms given for unknown skill '{}'",
            orphan
        )));
    }

    Ok(SkillTaxonomy { categories: built })
}

/// Whole-word phrase counter over a fixed set of term groups.
///
/// Each group is a list of lowercase surface forms that count as the same
/// term (a skill and its synonyms, say). A hit only counts when the
/// characters on either side of it are not alphanumeric, so `java` never
/// matches inside `javascript`.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    automaton: AhoCorasick,
    pattern_group: Vec<usize>,
    group_count: usize,
}

impl TermMatcher {
    pub fn new<G>(groups: G) -> Result<Self>
    where
        G: IntoIterator,
        G::Item: IntoIterator,
        <G::Item as IntoIterator>::Item: AsRef<str>,
    {
        let mut patterns = Vec::new();
        let mut pattern_group = Vec::new();
        let mut group_count = 0;

        for (index, group) in groups.into_iter().enumerate() {
            group_count = index + 1;
            for pattern in group {
                let pattern = pattern.as_ref().to_lowercase();
                if !pattern.is_empty() {
                    patterns.push(pattern);
                    pattern_group.push(index);
                }
            }
        }

        let automaton = AhoCorasick::builder()
            .build(&patterns)
            .map_err(|e| ResumeMatcherError::Lexicon(format!("Failed to build term matcher: {}", e)))?;

        Ok(Self {
            automaton,
            pattern_group,
            group_count,
        })
    }

    pub fn for_skills<'a, I>(skills: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Skill>,
    {
        Self::new(skills.into_iter().map(|s| s.patterns.iter()))
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Occurrences per group. Overlapping hits within one group count once,
    /// preferring the longest surface form.
    pub fn count(&self, text: &str) -> Vec<usize> {
        let lowered = text.to_lowercase();
        let mut spans: Vec<Vec<(usize, usize)>> = vec![Vec::new(); self.group_count];

        for mat in self.automaton.find_overlapping_iter(&lowered) {
            if is_word_boundary(&lowered, mat.start(), mat.end()) {
                let group = self.pattern_group[mat.pattern().as_usize()];
                spans[group].push((mat.start(), mat.end()));
            }
        }

        spans
            .into_iter()
            .map(|mut group_spans| {
                group_spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
                let mut last_end = 0;
                let mut hits = 0;
                for (start, end) in group_spans {
                    if start >= last_end {
                        hits += 1;
                        last_end = end;
                    }
                }
                hits
            })
            .collect()
    }
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}
