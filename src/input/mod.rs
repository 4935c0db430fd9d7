//! Input processing module
//! Handles format detection, text extraction, and loading documents from disk

pub mod docx;
pub mod file_detector;
pub mod manager;
pub mod pdf;
pub mod text_extractor;

pub use file_detector::DocumentFormat;
pub use manager::InputManager;
pub use text_extractor::{Document, ExtractedText, ExtractionMethod, TextExtractor};
