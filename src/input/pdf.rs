//! PDF text extraction with ordered fallback strategies
//!
//! Each strategy produces one string per page. The first strategy for which
//! more than half of the pages carry real text wins. When none does, the
//! best page from any strategy is kept so a partially readable document
//! still yields something.

use crate::error::{Result, ResumeMatcherError};
use crate::input::text_extractor::{ExtractedText, ExtractionMethod};
use lopdf::content::Content;
use lopdf::Object;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// TJ displacements beyond this (thousandths of an em) read as a word gap
const TJ_SPACE_THRESHOLD: f64 = 200.0;

pub trait PdfStrategy: Send + Sync {
    fn method(&self) -> ExtractionMethod;

    /// Text of every page, in page order
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// Layout-aware extraction through `pdf-extract`
pub struct LayoutStrategy;

impl PdfStrategy for LayoutStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::PdfLayout
    }

    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ResumeMatcherError::Processing(format!("pdf-extract: {}", e)))
    }
}

/// Reads the string operands of the text-showing operators straight from
/// each page's content stream
pub struct ContentStreamStrategy;

impl PdfStrategy for ContentStreamStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::PdfContentStream
    }

    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let doc = load_document(bytes)?;

        doc.get_pages()
            .into_values()
            .map(|page_id| -> Result<String> {
                let data = doc
                    .get_page_content(page_id)
                    .map_err(|e| ResumeMatcherError::Processing(format!("page content: {}", e)))?;
                let content = Content::decode(&data)
                    .map_err(|e| ResumeMatcherError::Processing(format!("content stream: {}", e)))?;
                Ok(render_operations(&content))
            })
            .collect()
    }
}

/// Per-page text through lopdf's own font-aware extractor
pub struct ObjectTextStrategy;

impl PdfStrategy for ObjectTextStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::PdfObjectText
    }

    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let doc = load_document(bytes)?;

        doc.get_pages()
            .into_keys()
            .map(|page_number| {
                doc.extract_text(&[page_number])
                    .map_err(|e| ResumeMatcherError::Processing(format!("lopdf: {}", e)))
            })
            .collect()
    }
}

fn load_document(bytes: &[u8]) -> Result<lopdf::Document> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| ResumeMatcherError::Processing(format!("lopdf load: {}", e)))?;
    if doc.is_encrypted() {
        return Err(ResumeMatcherError::Processing("document is encrypted".to_string()));
    }
    Ok(doc)
}

fn render_operations(content: &Content) -> String {
    let mut text = String::new();

    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tj" | "'" | "\"" => {
                if matches!(operation.operator.as_str(), "'" | "\"") {
                    push_break(&mut text, '\n');
                }
                if let Some(Object::String(bytes, _)) = operation.operands.last() {
                    text.push_str(&decode_pdf_string(bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operation.operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
                            Object::Integer(n) if (*n as f64) < -TJ_SPACE_THRESHOLD => {
                                push_break(&mut text, ' ')
                            }
                            Object::Real(r) if f64::from(*r) < -TJ_SPACE_THRESHOLD => {
                                push_break(&mut text, ' ')
                            }
                            _ => {}
                        }
                    }
                }
            }
            "Td" | "TD" | "T*" | "Tm" | "ET" => push_break(&mut text, '\n'),
            _ => {}
        }
    }

    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_break(text: &mut String, separator: char) {
    if !text.is_empty() && !text.ends_with(char::is_whitespace) {
        text.push(separator);
    }
}

/// UTF-16BE when the string carries a byte order mark, Latin-1 otherwise
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    bytes.iter().map(|&b| b as char).collect()
}

pub struct PdfExtractor {
    strategies: Vec<Box<dyn PdfStrategy>>,
    min_page_chars: usize,
    min_document_chars: usize,
}

impl PdfExtractor {
    pub fn new(min_page_chars: usize, min_document_chars: usize) -> Self {
        Self::with_strategies(
            vec![
                Box::new(LayoutStrategy),
                Box::new(ContentStreamStrategy),
                Box::new(ObjectTextStrategy),
            ],
            min_page_chars,
            min_document_chars,
        )
    }

    pub fn with_strategies(
        strategies: Vec<Box<dyn PdfStrategy>>,
        min_page_chars: usize,
        min_document_chars: usize,
    ) -> Self {
        Self {
            strategies,
            min_page_chars,
            min_document_chars,
        }
    }

    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractedText> {
        let mut attempted = Vec::with_capacity(self.strategies.len());
        let mut partial: Vec<Vec<String>> = Vec::new();

        for strategy in &self.strategies {
            let method = strategy.method();
            attempted.push(method.label().to_string());

            let pages = match catch_unwind(AssertUnwindSafe(|| strategy.extract_pages(bytes))) {
                Ok(Ok(pages)) => pages,
                Ok(Err(e)) => {
                    log::warn!("{} extraction failed: {}", method.label(), e);
                    continue;
                }
                Err(_) => {
                    log::warn!("{} extraction panicked", method.label());
                    continue;
                }
            };

            let usable = pages.iter().filter(|p| self.is_usable(p)).count();
            log::debug!(
                "{}: {} of {} pages usable",
                method.label(),
                usable,
                pages.len()
            );

            if !pages.is_empty() && usable * 2 > pages.len() {
                return Ok(ExtractedText {
                    text: join_pages(pages.iter().map(String::as_str)),
                    method,
                    page_count: Some(pages.len()),
                });
            }

            partial.push(pages);
        }

        let page_count = partial.iter().map(Vec::len).max().unwrap_or(0);
        let recovered = join_pages((0..page_count).map(|index| {
            partial
                .iter()
                .filter_map(|pages| pages.get(index))
                .map(|page| page.trim())
                .max_by_key(|page| page.chars().count())
                .unwrap_or("")
        }));

        if recovered.chars().count() >= self.min_document_chars.max(1) {
            log::info!("recovered partial PDF text from {} strategies", partial.len());
            return Ok(ExtractedText {
                text: recovered,
                method: ExtractionMethod::PdfPartialRecovery,
                page_count: Some(page_count),
            });
        }

        Err(ResumeMatcherError::ExtractionFailed {
            format: "pdf".to_string(),
            attempted_strategies: attempted,
        })
    }

    fn is_usable(&self, page: &str) -> bool {
        page.trim().chars().count() >= self.min_page_chars
    }
}

fn join_pages<'a>(pages: impl Iterator<Item = &'a str>) -> String {
    pages
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedStrategy {
        method: ExtractionMethod,
        pages: Vec<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl PdfStrategy for FixedStrategy {
        fn method(&self) -> ExtractionMethod {
            self.method
        }

        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages.iter().map(|p| p.to_string()).collect())
        }
    }

    struct FailingStrategy;

    impl PdfStrategy for FailingStrategy {
        fn method(&self) -> ExtractionMethod {
            ExtractionMethod::PdfLayout
        }

        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>> {
            Err(ResumeMatcherError::Processing("broken xref".to_string()))
        }
    }

    struct PanickingStrategy;

    impl PdfStrategy for PanickingStrategy {
        fn method(&self) -> ExtractionMethod {
            ExtractionMethod::PdfLayout
        }

        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>> {
            panic!("unsupported font encoding")
        }
    }

    const GOOD: &str = "Senior engineer with ten years of Rust";

    fn fixed(method: ExtractionMethod, pages: Vec<&'static str>) -> (Box<dyn PdfStrategy>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(FixedStrategy {
                method,
                pages,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    #[test]
    fn test_first_majority_strategy_wins() {
        let (first, _) = fixed(ExtractionMethod::PdfLayout, vec![GOOD, "", ""]);
        let (second, _) = fixed(ExtractionMethod::PdfContentStream, vec![GOOD, GOOD, ""]);
        let (third, third_calls) = fixed(ExtractionMethod::PdfObjectText, vec![GOOD, GOOD, GOOD]);

        let extractor = PdfExtractor::with_strategies(vec![first, second, third], 20, 20);
        let result = extractor.extract(b"%PDF").unwrap();

        assert_eq!(result.method, ExtractionMethod::PdfContentStream);
        assert_eq!(result.page_count, Some(3));
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exactly_half_is_not_a_majority() {
        let (first, _) = fixed(ExtractionMethod::PdfLayout, vec![GOOD, ""]);
        let (second, _) = fixed(ExtractionMethod::PdfContentStream, vec![GOOD, GOOD]);

        let extractor = PdfExtractor::with_strategies(vec![first, second], 20, 20);
        let result = extractor.extract(b"%PDF").unwrap();

        assert_eq!(result.method, ExtractionMethod::PdfContentStream);
    }

    #[test]
    fn test_errors_and_panics_fall_through() {
        let (last, _) = fixed(ExtractionMethod::PdfObjectText, vec![GOOD]);
        let extractor = PdfExtractor::with_strategies(
            vec![Box::new(FailingStrategy), Box::new(PanickingStrategy), last],
            20,
            20,
        );

        let result = extractor.extract(b"%PDF").unwrap();
        assert_eq!(result.method, ExtractionMethod::PdfObjectText);
        assert_eq!(result.text, GOOD);
    }

    #[test]
    fn test_partial_recovery_takes_best_page() {
        let (first, _) = fixed(
            ExtractionMethod::PdfLayout,
            vec!["Page one has plenty of readable text", "", "", ""],
        );
        let (second, _) = fixed(
            ExtractionMethod::PdfContentStream,
            vec!["", "Page two only shows up here", "", ""],
        );

        let extractor = PdfExtractor::with_strategies(vec![first, second], 20, 20);
        let result = extractor.extract(b"%PDF").unwrap();

        assert_eq!(result.method, ExtractionMethod::PdfPartialRecovery);
        assert_eq!(
            result.text,
            "Page one has plenty of readable text\n\nPage two only shows up here"
        );
    }

    #[test]
    fn test_all_empty_is_extraction_failure() {
        let (first, _) = fixed(ExtractionMethod::PdfLayout, vec!["", " "]);
        let extractor =
            PdfExtractor::with_strategies(vec![first, Box::new(FailingStrategy)], 20, 20);

        match extractor.extract(b"%PDF") {
            Err(ResumeMatcherError::ExtractionFailed {
                format,
                attempted_strategies,
            }) => {
                assert_eq!(format, "pdf");
                assert_eq!(attempted_strategies.len(), 2);
            }
            other => panic!("expected extraction failure, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_bytes_fail_cleanly() {
        let extractor = PdfExtractor::new(20, 20);
        let result = extractor.extract(b"this is not a pdf at all");

        assert!(matches!(
            result,
            Err(ResumeMatcherError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_decode_pdf_string() {
        assert_eq!(decode_pdf_string(b"Caf\xe9"), "Café");
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x52, 0x00, 0x75]), "Ru");
    }
}
