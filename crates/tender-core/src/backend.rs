use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("failed to render page {page}: {message}")]
    RenderError { page: usize, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A rasterized page, PNG-encoded.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Trait for PDF backends.
///
/// A backend only knows how to open a file; everything page-level goes
/// through the returned [`PdfDocument`]. The native-text/OCR policy that
/// decides which page operation to call lives in `tender_ingest`.
pub trait PdfBackend: Send + Sync {
    /// Open a PDF file for page-level access.
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError>;
}

/// An opened PDF document. Dropping it releases the underlying handle.
pub trait PdfDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> Result<usize, BackendError>;

    /// Text embedded in the page's content stream (zero-based index).
    fn page_text(&self, index: usize) -> Result<String, BackendError>;

    /// Rasterize the page at `dpi` dots per inch.
    fn render_page(&self, index: usize, dpi: u32) -> Result<PageImage, BackendError>;
}
