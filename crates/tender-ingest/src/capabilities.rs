use tender_core::{OcrEngine, PdfBackend};

/// OCR settings used when probing for an engine.
#[derive(Debug, Clone)]
pub struct OcrSettings {
    /// Tesseract executable, looked up on `PATH` if not absolute.
    pub tesseract_cmd: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".to_string(),
        }
    }
}

/// The optional collaborators available to the extraction pipeline.
///
/// A missing PDF backend is a setup error; a missing OCR engine means pages
/// without native text contribute empty text.
#[derive(Default)]
pub struct Capabilities {
    pub pdf: Option<Box<dyn PdfBackend>>,
    pub ocr: Option<Box<dyn OcrEngine>>,
}

impl Capabilities {
    pub fn new(pdf: Option<Box<dyn PdfBackend>>, ocr: Option<Box<dyn OcrEngine>>) -> Self {
        Self { pdf, ocr }
    }

    /// Fill in whatever this build and host provide: the MuPDF backend when
    /// the `pdf` feature is on, and Tesseract when the `ocr` feature is on
    /// and the configured executable answers `--version`.
    pub fn detect(settings: &OcrSettings) -> Self {
        Self {
            pdf: detect_pdf(),
            ocr: detect_ocr(settings),
        }
    }

    pub fn has_pdf(&self) -> bool {
        self.pdf.is_some()
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("pdf", &self.has_pdf())
            .field("ocr", &self.ocr.as_ref().map(|e| e.name()))
            .finish()
    }
}

#[cfg(feature = "pdf")]
fn detect_pdf() -> Option<Box<dyn PdfBackend>> {
    Some(Box::new(tender_pdf_mupdf::MupdfBackend::new()))
}

#[cfg(not(feature = "pdf"))]
fn detect_pdf() -> Option<Box<dyn PdfBackend>> {
    None
}

#[cfg(feature = "ocr")]
fn detect_ocr(settings: &OcrSettings) -> Option<Box<dyn OcrEngine>> {
    match tender_ocr::TesseractEngine::detect(&settings.tesseract_cmd) {
        Ok(engine) => Some(Box::new(engine)),
        Err(e) => {
            tracing::info!(error = %e, "OCR unavailable, image-only pages will be empty");
            None
        }
    }
}

#[cfg(not(feature = "ocr"))]
fn detect_ocr(_settings: &OcrSettings) -> Option<Box<dyn OcrEngine>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_capabilities() {
        let caps = Capabilities::default();
        assert!(!caps.has_pdf());
        assert!(!caps.has_ocr());
        assert_eq!(format!("{caps:?}"), "Capabilities { pdf: false, ocr: None }");
    }

    #[test]
    fn detect_with_missing_tesseract_has_no_ocr() {
        let caps = Capabilities::detect(&OcrSettings {
            tesseract_cmd: "/nonexistent/tesseract-binary".to_string(),
        });
        assert!(!caps.has_ocr());
        assert_eq!(caps.has_pdf(), cfg!(feature = "pdf"));
    }
}
