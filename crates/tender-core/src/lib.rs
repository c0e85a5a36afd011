use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
pub mod ocr;

// Re-export for convenience
pub use backend::{BackendError, PageImage, PdfBackend, PdfDocument};
pub use ocr::{OcrEngine, OcrError};

/// Number of characters of extracted text kept in [`AnalysisResult::text_snippet`].
pub const SNIPPET_CHARS: usize = 200;

/// Default rasterization resolution for OCR.
pub const DEFAULT_DPI: u32 = 200;

/// The heuristic fields parsed out of a tender document.
///
/// Every field is always present when serialized; a field the parser could
/// not find serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderRecord {
    pub title: Option<String>,
    pub reference: Option<String>,
    pub organization: Option<String>,
    pub closing_date: Option<String>,
}

impl TenderRecord {
    /// Field names and values in report order.
    pub fn fields(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("title", self.title.as_deref()),
            ("reference", self.reference.as_deref()),
            ("organization", self.organization.as_deref()),
            ("closing_date", self.closing_date.as_deref()),
        ]
    }
}

/// Result of analyzing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub path: String,
    pub parsed: TenderRecord,
    pub text_snippet: String,
}

impl AnalysisResult {
    pub fn new(path: impl Into<String>, parsed: TenderRecord, text: &str) -> Self {
        Self {
            path: path.into(),
            parsed,
            text_snippet: text.chars().take(SNIPPET_CHARS).collect(),
        }
    }
}
