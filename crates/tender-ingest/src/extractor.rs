use std::path::Path;

use tender_core::{DEFAULT_DPI, OcrEngine, PdfDocument};

use crate::IngestError;
use crate::capabilities::Capabilities;

/// Options for text acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// OCR every page, ignoring native text.
    pub force_ocr: bool,
    /// Resolution used when rasterizing a page for OCR.
    pub dpi: u32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            force_ocr: false,
            dpi: DEFAULT_DPI,
        }
    }
}

/// Where a page's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    Native,
    Ocr,
    /// Neither native text nor OCR produced anything usable.
    Empty,
}

/// Extract the text of every page of a PDF, newline-joined in page order.
///
/// Pages with non-blank native text use it verbatim; the rest (or all pages
/// when `force_ocr` is set) are rasterized and OCR'd. Per-page failures
/// degrade to empty text. Only a missing PDF backend or a document that
/// cannot be opened fails the call.
pub fn extract_text(
    path: &Path,
    options: &ExtractOptions,
    capabilities: &Capabilities,
) -> Result<String, IngestError> {
    let backend = capabilities.pdf.as_deref().ok_or(IngestError::NoPdfSupport)?;

    let document = backend.open(path)?;
    let page_count = document.page_count()?;

    tracing::info!(
        path = %path.display(),
        pages = page_count,
        dpi = options.dpi,
        force_ocr = options.force_ocr,
        ocr = capabilities.has_ocr(),
        "extracting text"
    );

    let pages_text: Vec<String> = (0..page_count)
        .map(|index| {
            let (text, source) =
                extract_page(&*document, index, options, capabilities.ocr.as_deref());
            tracing::debug!(page = index + 1, source = ?source, chars = text.len(), "page done");
            text
        })
        .collect();

    Ok(pages_text.join("\n"))
}

/// Apply the native-text/OCR policy to one page.
fn extract_page(
    document: &dyn PdfDocument,
    index: usize,
    options: &ExtractOptions,
    ocr: Option<&dyn OcrEngine>,
) -> (String, PageSource) {
    if !options.force_ocr {
        let text = document.page_text(index).unwrap_or_else(|e| {
            tracing::debug!(page = index + 1, error = %e, "native text extraction failed");
            String::new()
        });
        if !text.trim().is_empty() {
            return (text, PageSource::Native);
        }
    }

    let Some(engine) = ocr else {
        return (String::new(), PageSource::Empty);
    };

    let recognized = document
        .render_page(index, options.dpi)
        .map_err(|e| e.to_string())
        .and_then(|image| engine.recognize(&image).map_err(|e| e.to_string()));

    match recognized {
        Ok(text) => (text, PageSource::Ocr),
        Err(error) => {
            tracing::warn!(
                page = index + 1,
                engine = engine.name(),
                error = %error,
                "OCR failed, page left empty"
            );
            (String::new(), PageSource::Empty)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tender_core::{BackendError, OcrError, PageImage, PdfBackend};

    use super::*;

    /// What a mock page does when asked for native text.
    #[derive(Clone)]
    enum MockPage {
        Text(&'static str),
        Blank,
        TextError,
        RenderError,
    }

    /// Shared log of the calls made against a mock document.
    type CallLog = Rc<RefCell<Vec<String>>>;

    struct MockDocument {
        pages: Vec<MockPage>,
        calls: CallLog,
    }

    impl PdfDocument for MockDocument {
        fn page_count(&self) -> Result<usize, BackendError> {
            Ok(self.pages.len())
        }

        fn page_text(&self, index: usize) -> Result<String, BackendError> {
            self.calls.borrow_mut().push(format!("text:{index}"));
            match &self.pages[index] {
                MockPage::Text(t) => Ok(t.to_string()),
                MockPage::Blank | MockPage::RenderError => Ok("  \n ".to_string()),
                MockPage::TextError => Err(BackendError::ExtractionError("broken".into())),
            }
        }

        fn render_page(&self, index: usize, dpi: u32) -> Result<PageImage, BackendError> {
            self.calls.borrow_mut().push(format!("render:{index}@{dpi}"));
            match &self.pages[index] {
                MockPage::RenderError => Err(BackendError::RenderError {
                    page: index,
                    message: "no pixmap".into(),
                }),
                _ => Ok(PageImage {
                    png: vec![index as u8],
                    width: 10,
                    height: 10,
                }),
            }
        }
    }

    /// Hands out a fresh [`MockDocument`] per open.
    struct MockBackend {
        pages: Vec<MockPage>,
        fail_open: bool,
    }

    impl MockBackend {
        fn new(pages: Vec<MockPage>) -> Self {
            Self {
                pages,
                fail_open: false,
            }
        }
    }

    impl PdfBackend for MockBackend {
        fn open(&self, _path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
            if self.fail_open {
                return Err(BackendError::OpenError("not a PDF".into()));
            }
            Ok(Box::new(MockDocument {
                pages: self.pages.clone(),
                calls: Rc::new(RefCell::new(Vec::new())),
            }))
        }
    }

    /// OCR engine that echoes the page index encoded in the image bytes.
    struct EchoOcr;

    impl OcrEngine for EchoOcr {
        fn name(&self) -> &str {
            "echo"
        }

        fn recognize(&self, image: &PageImage) -> Result<String, OcrError> {
            Ok(format!("ocr page {}", image.png[0]))
        }
    }

    struct FailingOcr;

    impl OcrEngine for FailingOcr {
        fn name(&self) -> &str {
            "failing"
        }

        fn recognize(&self, _image: &PageImage) -> Result<String, OcrError> {
            Err(OcrError::Failed {
                status: "exit status: 1".into(),
                stderr: "boom".into(),
            })
        }
    }

    fn with_backend(backend: MockBackend, ocr: Option<Box<dyn OcrEngine>>) -> Capabilities {
        Capabilities::new(Some(Box::new(backend)), ocr)
    }

    fn run(caps: &Capabilities, options: ExtractOptions) -> Result<String, IngestError> {
        extract_text(Path::new("tender.pdf"), &options, caps)
    }

    #[test]
    fn native_text_used_verbatim() {
        let caps = with_backend(
            MockBackend::new(vec![MockPage::Text("  one  \n"), MockPage::Text("two")]),
            Some(Box::new(EchoOcr)),
        );
        assert_eq!(
            run(&caps, ExtractOptions::default()).unwrap(),
            "  one  \n\ntwo"
        );
    }

    #[test]
    fn blank_page_falls_back_to_ocr() {
        let caps = with_backend(
            MockBackend::new(vec![MockPage::Text("one"), MockPage::Blank]),
            Some(Box::new(EchoOcr)),
        );
        assert_eq!(
            run(&caps, ExtractOptions::default()).unwrap(),
            "one\nocr page 1"
        );
    }

    #[test]
    fn text_error_falls_back_to_ocr() {
        let caps = with_backend(
            MockBackend::new(vec![MockPage::TextError]),
            Some(Box::new(EchoOcr)),
        );
        assert_eq!(run(&caps, ExtractOptions::default()).unwrap(), "ocr page 0");
    }

    #[test]
    fn force_ocr_skips_native_text() {
        let doc = MockDocument {
            pages: vec![MockPage::Text("native"), MockPage::Text("native")],
            calls: Rc::new(RefCell::new(Vec::new())),
        };
        let options = ExtractOptions {
            force_ocr: true,
            dpi: 300,
        };
        let pages: Vec<_> = (0..2)
            .map(|i| extract_page(&doc, i, &options, Some(&EchoOcr)))
            .collect();
        assert_eq!(
            pages,
            [
                ("ocr page 0".to_string(), PageSource::Ocr),
                ("ocr page 1".to_string(), PageSource::Ocr),
            ]
        );
        assert_eq!(*doc.calls.borrow(), ["render:0@300", "render:1@300"]);
    }

    #[test]
    fn native_page_is_not_rendered() {
        let doc = MockDocument {
            pages: vec![MockPage::Text("native")],
            calls: Rc::new(RefCell::new(Vec::new())),
        };
        let (text, source) = extract_page(&doc, 0, &ExtractOptions::default(), Some(&EchoOcr));
        assert_eq!((text.as_str(), source), ("native", PageSource::Native));
        assert_eq!(*doc.calls.borrow(), ["text:0"]);
    }

    #[test]
    fn missing_ocr_gives_empty_page() {
        let caps = with_backend(
            MockBackend::new(vec![MockPage::Blank, MockPage::Text("two")]),
            None,
        );
        assert_eq!(run(&caps, ExtractOptions::default()).unwrap(), "\ntwo");
    }

    #[test]
    fn ocr_failure_gives_empty_page() {
        let caps = with_backend(
            MockBackend::new(vec![MockPage::Blank, MockPage::Text("two")]),
            Some(Box::new(FailingOcr)),
        );
        assert_eq!(run(&caps, ExtractOptions::default()).unwrap(), "\ntwo");
    }

    #[test]
    fn render_failure_gives_empty_page() {
        let caps = with_backend(
            MockBackend::new(vec![MockPage::Text("one"), MockPage::RenderError]),
            Some(Box::new(EchoOcr)),
        );
        assert_eq!(run(&caps, ExtractOptions::default()).unwrap(), "one\n");
    }

    #[test]
    fn missing_pdf_backend_is_setup_error() {
        let caps = Capabilities::new(None, Some(Box::new(EchoOcr)));
        let err = run(&caps, ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::NoPdfSupport));
    }

    #[test]
    fn open_failure_propagates() {
        let mut backend = MockBackend::new(vec![]);
        backend.fail_open = true;
        let caps = with_backend(backend, None);
        let err = run(&caps, ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::Backend(BackendError::OpenError(_))));
    }

    #[test]
    fn empty_document_gives_empty_text() {
        let caps = with_backend(MockBackend::new(vec![]), Some(Box::new(EchoOcr)));
        assert_eq!(run(&caps, ExtractOptions::default()).unwrap(), "");
    }
}
