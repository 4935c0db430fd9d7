//! Text processing and normalization

use crate::error::{Result, ResumeMatcherError};
use crate::processing::lexicon::Lexicon;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

pub struct TextProcessor {
    lexicon: Arc<Lexicon>,
    email_regex: Regex,
    phone_regex: Regex,
}

/// Lowercased, stopword-free tokens of a document, in reading order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedText {
    pub tokens: Vec<String>,
    pub frequencies: BTreeMap<String, usize>,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.frequencies.contains_key(term)
    }

    /// Distinct terms in alphabetical order
    pub fn distinct_terms(&self) -> impl Iterator<Item = &str> {
        self.frequencies.keys().map(String::as_str)
    }
}

impl TextProcessor {
    pub fn new(lexicon: Arc<Lexicon>) -> Result<Self> {
        let email_regex = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
            .map_err(|e| ResumeMatcherError::Processing(format!("Invalid email regex: {}", e)))?;

        let phone_regex = Regex::new(r"(?:\+?\d{1,3}[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b")
            .map_err(|e| ResumeMatcherError::Processing(format!("Invalid phone regex: {}", e)))?;

        Ok(Self {
            lexicon,
            email_regex,
            phone_regex,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Lowercase, strip everything but letters, digits, whitespace and
    /// hyphens, then collapse whitespace.
    pub fn clean(&self, text: &str) -> String {
        let stripped: String = text
            .to_lowercase()
            .chars()
            .map(normalize_char)
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { ' ' })
            .collect();

        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn normalize(&self, text: &str) -> NormalizedText {
        let tokens: Vec<String> = self
            .clean(text)
            .split(' ')
            .map(|token| token.trim_matches('-'))
            .filter(|token| !token.is_empty() && !self.lexicon.is_stopword(token))
            .map(str::to_string)
            .collect();

        let mut frequencies = BTreeMap::new();
        for token in &tokens {
            *frequencies.entry(token.clone()).or_insert(0) += 1;
        }

        NormalizedText { tokens, frequencies }
    }

    /// Lines and sentences a recruiter would read as separate statements
    pub fn split_statements(&self, text: &str) -> Vec<String> {
        text.lines()
            .flat_map(|line| line.unicode_sentences())
            .map(|s| s.trim().trim_start_matches(is_bullet_marker).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn word_count(&self, text: &str) -> usize {
        text.unicode_words().count()
    }

    pub fn has_contact_info(&self, text: &str) -> bool {
        self.email_regex.is_match(text) || self.phone_regex.is_match(text)
    }

    /// Blank out emails and phone numbers so their digits are not read as metrics
    pub fn strip_contact_info(&self, text: &str) -> String {
        let without_email = self.email_regex.replace_all(text, " ");
        self.phone_regex.replace_all(&without_email, " ").into_owned()
    }
}

/// Crude inflection folding used when comparing single words:
/// `experienced` and `experience` both fold to `experienc`.
pub fn light_stem(word: &str) -> &str {
    const SUFFIXES: [&str; 6] = ["ings", "ing", "ed", "es", "s", "e"];

    for suffix in SUFFIXES {
        if suffix == "s" && word.ends_with("ss") {
            continue;
        }
        if let Some(stem) = word.strip_suffix(suffix) {
            if stem.chars().count() >= 3 {
                return stem;
            }
        }
    }

    word
}

pub(crate) fn is_bullet_marker(c: char) -> bool {
    matches!(c, '-' | '*' | '•' | '·' | '▪' | '◦' | '‣' | '●' | '○' | '■' | '□' | '➢' | '►')
}

fn normalize_char(c: char) -> char {
    match c {
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => '-',
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> TextProcessor {
        TextProcessor::new(Arc::new(Lexicon::bundled().unwrap())).unwrap()
    }

    #[test]
    fn test_normalize_strips_punctuation_and_stopwords() {
        let processor = processor();
        let normalized = processor.normalize("Built the REST API, in Rust! (and tested it)");

        assert_eq!(normalized.tokens, vec!["built", "rest", "api", "rust", "tested"]);
        assert_eq!(normalized.frequencies.get("rust"), Some(&1));
    }

    #[test]
    fn test_normalize_keeps_inner_hyphens() {
        let processor = processor();
        let normalized = processor.normalize("Full-stack developer - remote -- part-time");

        assert_eq!(normalized.tokens, vec!["full-stack", "developer", "remote", "part-time"]);
    }

    #[test]
    fn test_normalize_counts_repeats() {
        let processor = processor();
        let normalized = processor.normalize("Python python PYTHON developer");

        assert_eq!(normalized.frequencies.get("python"), Some(&3));
        assert_eq!(normalized.tokens.len(), 4);
    }

    #[test]
    fn test_normalize_empty_and_stopword_only_text() {
        let processor = processor();
        assert!(processor.normalize("").is_empty());
        assert!(processor.normalize("   \n\t ").is_empty());
        assert!(processor.normalize("the and of, to!").is_empty());
    }

    #[test]
    fn test_clean_folds_dashes() {
        let processor = processor();
        assert_eq!(processor.clean("Front\u{2013}end   &  Back"), "front-end back");
    }

    #[test]
    fn test_split_statements_handles_bullets() {
        let processor = processor();
        let statements = processor.split_statements("• Led a team of 5.\n- Improved latency. Shipped v2\n\n");

        assert_eq!(statements, vec!["Led a team of 5.", "Improved latency.", "Shipped v2"]);
    }

    #[test]
    fn test_contact_info_detection() {
        let processor = processor();
        assert!(processor.has_contact_info("Reach me at jane.doe@example.com"));
        assert!(processor.has_contact_info("Phone: (555) 123-4567"));
        assert!(!processor.has_contact_info("No contact details here"));
    }

    #[test]
    fn test_light_stem() {
        assert_eq!(light_stem("experienced"), light_stem("experience"));
        assert_eq!(light_stem("developers"), "developer");
        assert_eq!(light_stem("processes"), light_stem("process"));
        assert_eq!(light_stem("uses"), "use");
        assert_eq!(light_stem("led"), "led");
        assert_ne!(light_stem("developer"), light_stem("developed"));
    }
}
