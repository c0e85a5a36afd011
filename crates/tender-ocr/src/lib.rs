use std::io::Write;
use std::path::Path;
use std::process::Command;

use tender_core::{OcrEngine, OcrError, PageImage};

/// Executable looked up on `PATH` when no command is configured.
pub const DEFAULT_TESSERACT_CMD: &str = "tesseract";

/// OCR through the `tesseract` command-line tool.
///
/// Each page image is written to a temporary PNG and recognized with
/// `tesseract <image> stdout`; the temp file is removed when recognition
/// returns.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: String,
    version: String,
}

impl TesseractEngine {
    /// Probe `command --version` and return an engine if it runs.
    pub fn detect(command: &str) -> Result<Self, OcrError> {
        let output = Command::new(command)
            .arg("--version")
            .output()
            .map_err(|e| OcrError::Unavailable(format!("{command}: {e}")))?;

        if !output.status.success() {
            return Err(OcrError::Unavailable(format!(
                "{command} --version exited with {}",
                output.status
            )));
        }

        // Older releases print the banner on stderr
        let version = first_line(&output.stdout)
            .or_else(|| first_line(&output.stderr))
            .unwrap_or_else(|| "unknown version".to_string());

        tracing::debug!(command, version = %version, "found tesseract");

        Ok(Self {
            command: command.to_string(),
            version,
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn recognize_file(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .output()
            .map_err(|e| OcrError::Spawn(format!("{}: {e}", self.command)))?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &PageImage) -> Result<String, OcrError> {
        let mut file = tempfile::Builder::new()
            .prefix("tender-page-")
            .suffix(".png")
            .tempfile()?;
        file.write_all(&image.png)?;
        file.flush()?;

        let text = self.recognize_file(file.path())?;
        tracing::debug!(
            width = image.width,
            height = image.height,
            chars = text.chars().count(),
            "tesseract recognized page"
        );
        Ok(text)
    }
}

fn first_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
