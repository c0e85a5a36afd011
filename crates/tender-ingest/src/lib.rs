use std::path::Path;

use thiserror::Error;

pub mod capabilities;
pub mod extractor;

// Re-export domain types for convenience
pub use tender_core::{AnalysisResult, BackendError, TenderRecord};
pub use capabilities::{Capabilities, OcrSettings};
pub use extractor::{ExtractOptions, PageSource, extract_text};
pub use tender_parsing::FieldParser;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("{0}")]
    Backend(#[from] BackendError),
    #[error("PDF support not available (build tender-ingest with the `pdf` feature)")]
    NoPdfSupport,
}

/// Extract text from a PDF and parse its tender fields.
///
/// Pipeline:
/// 1. Acquire text page by page (native text, OCR fallback)
/// 2. Parse title, reference, organization, and closing date
/// 3. Keep a short leading snippet of the text for display
pub fn analyze_file(
    path: &Path,
    options: &ExtractOptions,
    capabilities: &Capabilities,
) -> Result<AnalysisResult, IngestError> {
    analyze_file_with(path, options, capabilities, &FieldParser::new())
}

/// [`analyze_file`] with a caller-configured field parser.
pub fn analyze_file_with(
    path: &Path,
    options: &ExtractOptions,
    capabilities: &Capabilities,
    parser: &FieldParser,
) -> Result<AnalysisResult, IngestError> {
    let text = extract_text(path, options, capabilities)?;
    let parsed = parser.parse(&text);
    Ok(AnalysisResult::new(
        path.display().to_string(),
        parsed,
        &text,
    ))
}
