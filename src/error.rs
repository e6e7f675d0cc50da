//! Error types for the artwork PDF engine
//!
//! Per-element failures (`ElementEmbed`, `ConversionTool`, `PdfParse`,
//! `InvalidColor`) are contained by the generator: the offending element is
//! skipped with a warning and the document is still produced. Only
//! `Generation` is fatal for a request.

use thiserror::Error;

/// Custom error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Element embedding failed: {0}")]
    ElementEmbed(String),

    #[error("Conversion tool unavailable: {0}")]
    ConversionTool(String),

    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    #[error("PDF generation error: {0}")]
    Generation(#[from] std::io::Error),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Whether this error aborts the whole document or only the element
    /// currently being embedded.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Generation(_))
    }
}

impl From<lopdf::Error> for EngineError {
    fn from(err: lopdf::Error) -> Self {
        EngineError::PdfParse(err.to_string())
    }
}
