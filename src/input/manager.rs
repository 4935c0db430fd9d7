//! Input manager for loading documents from disk

use crate::config::ExtractionConfig;
use crate::error::{Result, ResumeMatcherError};
use crate::input::file_detector::DocumentFormat;
use crate::input::text_extractor::{Document, ExtractedText, TextExtractor};
use log::info;
use std::path::Path;
use tokio::fs;

pub struct InputManager {
    extractor: TextExtractor,
    max_file_size: usize,
}

impl InputManager {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            extractor: TextExtractor::new(config),
            max_file_size: config.max_file_size,
        }
    }

    /// Read a file, detect its format from the extension and extract its text
    pub async fn load(&self, path: &Path) -> Result<ExtractedText> {
        let document = self.read_document(path).await?;
        info!("Extracting {} text from: {}", document.format(), path.display());
        self.extractor.extract(&document)
    }

    pub async fn read_document(&self, path: &Path) -> Result<Document> {
        if !path.exists() {
            return Err(ResumeMatcherError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let format = DocumentFormat::from_path(path)?;

        let metadata = fs::metadata(path).await?;
        if metadata.len() > self.max_file_size as u64 {
            return Err(ResumeMatcherError::InvalidInput(format!(
                "{} is {} bytes, the limit is {} bytes",
                path.display(),
                metadata.len(),
                self.max_file_size
            )));
        }

        let bytes = fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Document::new(bytes, format)?.with_name(name))
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::text_extractor::ExtractionMethod;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_markdown_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("resume.md");
        std::fs::write(&path, "# Jane Doe\n\n- Built Rust services").unwrap();

        let manager = InputManager::new(&ExtractionConfig::default());
        let extracted = manager.load(&path).await.unwrap();

        assert_eq!(extracted.method, ExtractionMethod::Markdown);
        assert!(extracted.text.contains("• Built Rust services"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let manager = InputManager::new(&ExtractionConfig::default());
        let result = manager.load(Path::new("/definitely/not/here.txt")).await;

        assert!(matches!(result, Err(ResumeMatcherError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("resume.odt");
        std::fs::write(&path, "content").unwrap();

        let manager = InputManager::new(&ExtractionConfig::default());
        assert!(matches!(
            manager.load(&path).await,
            Err(ResumeMatcherError::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("resume.txt");
        std::fs::write(&path, "x".repeat(64)).unwrap();

        let config = ExtractionConfig {
            max_file_size: 32,
            ..ExtractionConfig::default()
        };
        let manager = InputManager::new(&config);
        assert!(matches!(
            manager.load(&path).await,
            Err(ResumeMatcherError::InvalidInput(_))
        ));
    }
}
