//! Output formatters for console, JSON and Markdown reports

use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use crate::output::report::{ReportSummary, ScoreBand};
use crate::processing::analyzer::AnalysisResult;
use crate::processing::skill_gap::{Priority, SkillGap};
use colored::{Color, Colorize};
use std::path::Path;

const KEYWORD_PREVIEW: usize = 10;

/// Trait for rendering an analysis result
pub trait OutputFormatter {
    fn format_report(&self, result: &AnalysisResult) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors and rich presentation
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for API integration and structured data
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for documentation and reports
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            3 => "▒",
            _ => "░",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            3 => Color::Yellow,
            _ => Color::White,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f32) -> String {
        let band = ScoreBand::from_score(score);
        let color = match band {
            ScoreBand::Excellent => Color::Green,
            ScoreBand::Good => Color::BrightGreen,
            ScoreBand::Fair => Color::Yellow,
            ScoreBand::Poor => Color::BrightRed,
        };

        if self.use_colors {
            format!("[{}]", band.label().color(color).bold())
        } else {
            format!("[{}]", band.label())
        }
    }

    fn format_priority_icon(&self, priority: Priority) -> String {
        let (icon, text_icon) = match priority {
            Priority::High => ("⚠️", "[!]"),
            Priority::Medium => ("📋", "[-]"),
            Priority::Low => ("💡", "[+]"),
        };

        if self.use_colors {
            format!("{} ", icon)
        } else {
            format!("{} ", text_icon)
        }
    }

    fn format_skill(&self, gap: &SkillGap) -> String {
        if gap.in_resume {
            format!("  {} {}\n", self.colorize("✓", Color::Green), gap.skill)
        } else {
            format!(
                "  {} {} {}\n",
                self.colorize("✗", Color::Red),
                gap.skill,
                self.colorize(&format!("({} priority)", gap.priority.label()), Color::BrightBlack)
            )
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, result: &AnalysisResult) -> Result<String> {
        let summary = ReportSummary::from_result(result);
        let mut output = String::new();

        output.push_str(&self.format_header("📊 RESUME MATCH ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            result.metadata.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            result.metadata.processing_time_ms
        ));

        output.push_str(&self.format_header("Executive Summary", 2));
        output.push_str(&format!(
            "Match Score: {:.1}% {}\n",
            result.match_score.score,
            self.format_score_badge(result.match_score.score)
        ));
        output.push_str(&format!(
            "ATS Score:   {:.1}% {}\n",
            result.ats_score.composite,
            self.format_score_badge(result.ats_score.composite)
        ));
        output.push_str(&format!("Verdict: {}\n", self.colorize(&summary.verdict, Color::Cyan)));

        output.push_str(&self.format_header("ATS Breakdown", 3));
        for sub_score in &result.ats_score.sub_scores {
            output.push_str(&format!(
                "  {:<26} {:>6.1}  (weight {:.0}%)\n",
                sub_score.category.label(),
                sub_score.score,
                sub_score.weight * 100.0
            ));
            if self.detailed {
                for detail in &sub_score.details {
                    output.push_str(&format!("      {}\n", self.colorize(detail, Color::BrightBlack)));
                }
            }
        }

        if !summary.strengths.is_empty() {
            output.push_str(&self.format_header("✅ Key Strengths", 3));
            for strength in &summary.strengths {
                output.push_str(&format!("  • {}\n", self.colorize(strength, Color::Green)));
            }
        }

        if !summary.improvement_areas.is_empty() {
            output.push_str(&self.format_header("🎯 Improvement Areas", 3));
            for area in &summary.improvement_areas {
                output.push_str(&format!("  • {}\n", self.colorize(area, Color::Yellow)));
            }
        }

        if !result.skill_gaps.is_empty() {
            output.push_str(&self.format_header("Skill Gaps", 2));
            for group in &result.skill_gaps.groups {
                output.push_str(&format!("{}\n", self.colorize(&group.category, Color::Cyan)));
                for gap in &group.skills {
                    output.push_str(&self.format_skill(gap));
                }
            }
        }

        output.push_str(&self.format_header("📋 Recommendations", 2));
        for (i, rec) in result.recommendations.iter().enumerate() {
            output.push_str(&format!(
                "{}. {}{}\n",
                i + 1,
                self.format_priority_icon(rec.priority),
                self.colorize(&rec.title, Color::White)
            ));
            output.push_str(&format!("   {}\n", rec.description));
        }

        if self.detailed {
            output.push_str(&self.format_header("Keywords", 3));
            if !result.match_score.matched_keywords.is_empty() {
                output.push_str(&format!(
                    "Shared:  {}\n",
                    self.colorize(&result.match_score.matched_keywords.join(", "), Color::Green)
                ));
            }
            if !result.ats_score.missing_keywords.is_empty() {
                output.push_str(&format!(
                    "Missing: {}\n",
                    self.colorize(&result.ats_score.missing_keywords.join(", "), Color::Red)
                ));
            }
            let job_terms: Vec<&str> = result
                .job_keywords
                .iter()
                .take(KEYWORD_PREVIEW)
                .map(|k| k.term.as_str())
                .collect();
            if !job_terms.is_empty() {
                output.push_str(&format!("Top job terms: {}\n", job_terms.join(", ")));
            }

            output.push_str(&self.format_header("Metadata", 4));
            output.push_str(&format!(
                "Similarity: {:.1} base + {:.1} keyword boost\n",
                result.match_score.base_similarity, result.match_score.keyword_boost
            ));
            output.push_str(&format!("Resume words: {}\n", result.ats_score.word_count));
            if let Some(industry) = &result.ats_score.detected_industry {
                output.push_str(&format!("Detected industry: {}\n", industry));
            }
            if let Some(method) = result.metadata.extraction_method {
                output.push_str(&format!("Extraction: {}\n", method.label()));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, result: &AnalysisResult) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(result)?)
        } else {
            Ok(serde_json::to_string(result)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_score_badge(score: f32) -> &'static str {
        match ScoreBand::from_score(score) {
            ScoreBand::Excellent => "🟢 Excellent",
            ScoreBand::Good => "🔵 Good",
            ScoreBand::Fair => "🟡 Fair",
            ScoreBand::Poor => "🔴 Poor",
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, result: &AnalysisResult) -> Result<String> {
        let summary = ReportSummary::from_result(result);
        let mut output = String::new();

        output.push_str("# 📊 Resume Match Analysis Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n",
                result.metadata.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC"),
                result.metadata.processing_time_ms
            ));
            if let Some(resume) = &result.metadata.resume_source {
                output.push_str(&format!("**Resume:** `{}`", resume));
                if let Some(job) = &result.metadata.job_source {
                    output.push_str(&format!(" | **Job:** `{}`", job));
                }
                output.push('\n');
            }
            output.push('\n');
        }

        output.push_str("## Executive Summary\n\n");
        output.push_str(&format!(
            "**Match Score:** {:.1}% {}\n\n",
            result.match_score.score,
            Self::markdown_score_badge(result.match_score.score)
        ));
        output.push_str(&format!(
            "**ATS Score:** {:.1}% {}\n\n",
            result.ats_score.composite,
            Self::markdown_score_badge(result.ats_score.composite)
        ));
        output.push_str(&format!("**Verdict:** {}\n\n", summary.verdict));

        output.push_str("### ATS Breakdown\n\n");
        output.push_str("| Category | Score | Weight |\n");
        output.push_str("|----------|-------|--------|\n");
        for sub_score in &result.ats_score.sub_scores {
            output.push_str(&format!(
                "| {} | {:.1} | {:.0}% |\n",
                sub_score.category.label(),
                sub_score.score,
                sub_score.weight * 100.0
            ));
        }
        output.push('\n');

        if !summary.strengths.is_empty() {
            output.push_str("## ✅ Key Strengths\n\n");
            for strength in &summary.strengths {
                output.push_str(&format!("- {}\n", strength));
            }
            output.push('\n');
        }

        if !summary.improvement_areas.is_empty() {
            output.push_str("## 🎯 Areas for Improvement\n\n");
            for area in &summary.improvement_areas {
                output.push_str(&format!("- {}\n", area));
            }
            output.push('\n');
        }

        if !result.skill_gaps.is_empty() {
            output.push_str("## Skill Gaps\n\n");
            output.push_str("| Skill | Category | In Resume | Job Mentions | Priority |\n");
            output.push_str("|-------|----------|-----------|--------------|----------|\n");
            for gap in result.skill_gaps.all() {
                output.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    gap.skill,
                    gap.category,
                    if gap.in_resume { "✅" } else { "❌" },
                    gap.job_frequency,
                    gap.priority.label()
                ));
            }
            output.push('\n');
        }

        output.push_str("## 📋 Recommendations\n\n");
        for (i, rec) in result.recommendations.iter().enumerate() {
            output.push_str(&format!(
                "### {}. {} ({})\n\n{}\n\n",
                i + 1,
                rec.title,
                rec.priority.label(),
                rec.description
            ));
        }

        if !result.ats_score.missing_keywords.is_empty() {
            output.push_str("## Missing Keywords\n\n");
            output.push_str(&format!("`{}`\n\n", result.ats_score.missing_keywords.join("`, `")));
        }

        output.push_str("---\n\n");
        output.push_str(&format!(
            "*Generated by Resume Matcher v{}*\n",
            env!("CARGO_PKG_VERSION")
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::with_options(config.color_output, config.detailed, true, true)
    }

    pub fn generate_report(&self, result: &AnalysisResult, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(result),
            OutputFormat::Json => self.json_formatter.format_report(result),
            OutputFormat::Markdown => self.markdown_formatter.format_report(result),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_analysis{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_analysis{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_analysis{}.md", base_name, timestamp_suffix),
    }
}
