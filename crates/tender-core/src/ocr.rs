use thiserror::Error;

use crate::backend::PageImage;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine not available: {0}")]
    Unavailable(String),
    #[error("failed to run OCR engine: {0}")]
    Spawn(String),
    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for optical character recognition engines.
pub trait OcrEngine: Send + Sync {
    /// Short engine name, used in logs.
    fn name(&self) -> &str;

    /// Recognize the text in a rasterized page.
    fn recognize(&self, image: &PageImage) -> Result<String, OcrError>;
}
