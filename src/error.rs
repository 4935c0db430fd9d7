//! Error handling for the resume matcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Text extraction failed for {format} document (tried: {})", attempted_strategies.join(", "))]
    ExtractionFailed {
        format: String,
        attempted_strategies: Vec<String>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Lexicon error: {0}")]
    Lexicon(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ResumeMatcherError>;

impl ResumeMatcherError {
    /// Whether the caller should ask the user for a different upload.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, ResumeMatcherError::ExtractionFailed { .. })
    }
}

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for ResumeMatcherError {
    fn from(err: anyhow::Error) -> Self {
        ResumeMatcherError::Processing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_failed_message_lists_strategies() {
        let err = ResumeMatcherError::ExtractionFailed {
            format: "pdf".to_string(),
            attempted_strategies: vec!["pdf-layout".to_string(), "pdf-content-stream".to_string()],
        };

        let message = err.to_string();
        assert!(message.contains("pdf document"));
        assert!(message.contains("pdf-layout, pdf-content-stream"));
        assert!(err.is_extraction_failure());
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: ResumeMatcherError = anyhow::anyhow!("matcher exploded").into();
        assert!(matches!(err, ResumeMatcherError::Processing(ref m) if m == "matcher exploded"));
        assert!(!err.is_extraction_failure());
    }
}
