//! DOCX text extraction
//!
//! A DOCX file is a zip archive; the body lives in `word/document.xml`.
//! Paragraph text and table cell text are read in document order. Cells of
//! one row are joined with tabs, rows and paragraphs end with newlines.

use crate::error::{Result, ResumeMatcherError};
use regex::Regex;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";
pub const DOCX_STRATEGY: &str = "docx-xml";

pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let xml = read_document_part(bytes).map_err(|e| {
        log::warn!("docx: {}", e);
        extraction_failed()
    })?;

    let text = render_document_xml(&xml)?;
    if text.trim().is_empty() {
        return Err(extraction_failed());
    }

    Ok(text)
}

fn extraction_failed() -> ResumeMatcherError {
    ResumeMatcherError::ExtractionFailed {
        format: "docx".to_string(),
        attempted_strategies: vec![DOCX_STRATEGY.to_string()],
    }
}

fn read_document_part(bytes: &[u8]) -> std::result::Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| e.to_string())?;

    let mut xml = String::new();
    part.read_to_string(&mut xml).map_err(|e| e.to_string())?;
    Ok(xml)
}

fn render_document_xml(xml: &str) -> Result<String> {
    let tag_regex = Regex::new(r#"<(/?)([A-Za-z0-9_:.-]+)(?:[^>"']|"[^"]*"|'[^']*')*?(/?)>"#)
        .map_err(|e| ResumeMatcherError::Processing(format!("Invalid tag regex: {}", e)))?;

    let mut text = String::new();
    let mut in_text_run = false;
    let mut cursor = 0;

    for captures in tag_regex.captures_iter(xml) {
        let Some(whole) = captures.get(0) else { continue };

        if in_text_run {
            text.push_str(&unescape_xml(&xml[cursor..whole.start()]));
        }
        cursor = whole.end();

        let closing = !captures[1].is_empty();
        let self_closing = !captures[3].is_empty();

        match (&captures[2], closing) {
            ("w:t", false) => in_text_run = !self_closing,
            ("w:t", true) => in_text_run = false,
            ("w:tab", false) => text.push('\t'),
            ("w:br", false) | ("w:cr", false) => text.push('\n'),
            ("w:p", true) => text.push('\n'),
            ("w:tc", true) => {
                // cell paragraphs already ended the line; separate cells instead
                if text.ends_with('\n') {
                    text.pop();
                }
                text.push('\t');
            }
            ("w:tr", true) => {
                if text.ends_with('\t') {
                    text.pop();
                }
                text.push('\n');
            }
            _ => {}
        }
    }

    Ok(text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn unescape_xml(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };

        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };

        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&tail[..=semi]),
        }
        rest = &tail[semi + 1..];
    }

    out.push_str(rest);
    out
}
