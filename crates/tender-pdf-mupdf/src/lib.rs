use std::path::Path;

use mupdf::pixmap::ImageFormat;
use mupdf::{Colorspace, Document, Matrix, Page, TextPageFlags};

use tender_core::{BackendError, PageImage, PdfBackend, PdfDocument};

/// PDF user space is 72 units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the parsing and OCR code paths do not
/// transitively depend on it.
#[derive(Debug, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        Ok(Box::new(MupdfDocument { document }))
    }
}

/// An open MuPDF document.
pub struct MupdfDocument {
    document: Document,
}

impl MupdfDocument {
    fn load_page(&self, index: usize) -> Result<Page, BackendError> {
        let page_no = i32::try_from(index)
            .map_err(|_| BackendError::ExtractionError(format!("page index {index} out of range")))?;
        self.document
            .load_page(page_no)
            .map_err(|e| BackendError::ExtractionError(e.to_string()))
    }
}

impl PdfDocument for MupdfDocument {
    fn page_count(&self) -> Result<usize, BackendError> {
        let count = self
            .document
            .page_count()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        let page = self.load_page(index)?;
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        // Block/line iteration matches PyMuPDF's plain-text output: one
        // line of output per text line, blocks in reading order.
        let mut page_text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                page_text.push_str(&line_text);
                page_text.push('\n');
            }
        }
        Ok(page_text)
    }

    fn render_page(&self, index: usize, dpi: u32) -> Result<PageImage, BackendError> {
        let render_err = |message: String| BackendError::RenderError {
            page: index,
            message,
        };

        let page = self.load_page(index)?;
        let scale = dpi as f32 / POINTS_PER_INCH;
        let matrix = Matrix::new_scale(scale, scale);
        let pixmap = page
            .to_pixmap(&matrix, &Colorspace::device_rgb(), false, false)
            .map_err(|e| render_err(e.to_string()))?;

        let mut png = Vec::new();
        pixmap
            .write_to(&mut png, ImageFormat::PNG)
            .map_err(|e| render_err(e.to_string()))?;

        tracing::trace!(
            page = index,
            dpi,
            width = pixmap.width(),
            height = pixmap.height(),
            bytes = png.len(),
            "rendered page"
        );

        Ok(PageImage {
            png,
            width: pixmap.width(),
            height: pixmap.height(),
        })
    }
}
