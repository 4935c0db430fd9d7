//! Text extraction from uploaded documents

use crate::config::ExtractionConfig;
use crate::error::{Result, ResumeMatcherError};
use crate::input::docx::extract_docx_text;
use crate::input::file_detector::DocumentFormat;
use crate::input::pdf::PdfExtractor;
use pulldown_cmark::{Event, Parser, Tag};
use serde::{Deserialize, Serialize};

/// Which extraction path produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    PdfLayout,
    PdfContentStream,
    PdfObjectText,
    PdfPartialRecovery,
    DocxXml,
    PlainText,
    Markdown,
}

impl ExtractionMethod {
    pub fn label(&self) -> &'static str {
        match self {
            ExtractionMethod::PdfLayout => "pdf-layout",
            ExtractionMethod::PdfContentStream => "pdf-content-stream",
            ExtractionMethod::PdfObjectText => "pdf-object-text",
            ExtractionMethod::PdfPartialRecovery => "pdf-partial-recovery",
            ExtractionMethod::DocxXml => "docx-xml",
            ExtractionMethod::PlainText => "plain-text",
            ExtractionMethod::Markdown => "markdown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionMethod,
    pub page_count: Option<usize>,
}

/// Raw bytes of an uploaded document together with its declared format
#[derive(Debug, Clone)]
pub struct Document {
    bytes: Vec<u8>,
    format: DocumentFormat,
    name: Option<String>,
}

impl Document {
    pub fn new(bytes: Vec<u8>, format: DocumentFormat) -> Result<Self> {
        if bytes.is_empty() {
            return Err(ResumeMatcherError::InvalidInput(format!(
                "empty {} document",
                format
            )));
        }

        Ok(Self {
            bytes,
            format,
            name: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub struct TextExtractor {
    pdf: PdfExtractor,
    max_file_size: usize,
}

impl TextExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            pdf: PdfExtractor::new(config.min_page_chars, config.min_document_chars),
            max_file_size: config.max_file_size,
        }
    }

    pub fn with_pdf_extractor(mut self, pdf: PdfExtractor) -> Self {
        self.pdf = pdf;
        self
    }

    /// Non-empty text, or `ExtractionFailed` naming every strategy tried
    pub fn extract(&self, document: &Document) -> Result<ExtractedText> {
        if document.len() > self.max_file_size {
            return Err(ResumeMatcherError::InvalidInput(format!(
                "{} is {} bytes, the limit is {} bytes",
                document.name().unwrap_or("document"),
                document.len(),
                self.max_file_size
            )));
        }

        log::debug!(
            "extracting {} ({} bytes, {})",
            document.name().unwrap_or("document"),
            document.len(),
            document.format()
        );

        let extracted = match document.format() {
            DocumentFormat::Pdf => self.pdf.extract(document.bytes())?,
            DocumentFormat::Docx => ExtractedText {
                text: extract_docx_text(document.bytes())?,
                method: ExtractionMethod::DocxXml,
                page_count: None,
            },
            DocumentFormat::PlainText => ExtractedText {
                text: decode_text(document.bytes()),
                method: ExtractionMethod::PlainText,
                page_count: None,
            },
            DocumentFormat::Markdown => ExtractedText {
                text: markdown_to_text(&decode_text(document.bytes())),
                method: ExtractionMethod::Markdown,
                page_count: None,
            },
        };

        if extracted.text.trim().is_empty() {
            return Err(ResumeMatcherError::ExtractionFailed {
                format: document.format().label().to_string(),
                attempted_strategies: vec![extracted.method.label().to_string()],
            });
        }

        log::info!(
            "extracted {} characters via {}",
            extracted.text.chars().count(),
            extracted.method.label()
        );
        Ok(extracted)
    }
}

/// UTF-8 with a leading byte order mark dropped; invalid sequences are replaced
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Plain text of a markdown document. List items keep a bullet so the
/// formatting heuristics still see them.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak => text.push(' '),
            Event::HardBreak => text.push('\n'),
            Event::Start(Tag::Item) => text.push_str("• "),
            Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(..))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_)) => {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::docx::tests::{build_docx, paragraph};

    fn extractor() -> TextExtractor {
        TextExtractor::new(&ExtractionConfig::default())
    }

    #[test]
    fn test_plain_text() {
        let doc = Document::new(b"\xEF\xBB\xBFJane Doe\nRust engineer".to_vec(), DocumentFormat::PlainText).unwrap();
        let result = extractor().extract(&doc).unwrap();

        assert_eq!(result.text, "Jane Doe\nRust engineer");
        assert_eq!(result.method, ExtractionMethod::PlainText);
    }

    #[test]
    fn test_whitespace_only_text_fails() {
        let doc = Document::new(b"  \n\t ".to_vec(), DocumentFormat::PlainText).unwrap();
        assert!(matches!(
            extractor().extract(&doc),
            Err(ResumeMatcherError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_empty_document_rejected() {
        assert!(matches!(
            Document::new(Vec::new(), DocumentFormat::Pdf),
            Err(ResumeMatcherError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_size_limit() {
        let config = ExtractionConfig {
            max_file_size: 8,
            ..ExtractionConfig::default()
        };
        let doc = Document::new(b"far more than eight bytes".to_vec(), DocumentFormat::PlainText)
            .unwrap()
            .with_name("resume.txt");

        match TextExtractor::new(&config).extract(&doc) {
            Err(ResumeMatcherError::InvalidInput(message)) => assert!(message.contains("resume.txt")),
            other => panic!("expected size error, got {:?}", other),
        }
    }

    #[test]
    fn test_markdown_rendering() {
        let markdown = "# Jane Doe\n\n## Experience\n\n- Led **platform** team\n- Cut costs by 30%\n\nUses `tokio` daily.";
        let text = markdown_to_text(markdown);

        assert_eq!(
            text,
            "Jane Doe\nExperience\n• Led platform team\n• Cut costs by 30%\nUses tokio daily."
        );
    }

    #[test]
    fn test_docx_dispatch() {
        let docx = build_docx(&paragraph("Platform engineer"));
        let doc = Document::new(docx, DocumentFormat::Docx).unwrap();
        let result = extractor().extract(&doc).unwrap();

        assert_eq!(result.text, "Platform engineer");
        assert_eq!(result.method, ExtractionMethod::DocxXml);
    }
}
