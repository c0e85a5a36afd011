use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub ocr: Option<OcrConfig>,
    pub display: Option<DisplayConfig>,
    pub parsing: Option<PatternConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub dpi: Option<u32>,
    pub force_ocr: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrConfig {
    pub tesseract_cmd: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub json: Option<bool>,
    pub color: Option<bool>,
}

/// Replacement field patterns. Each pattern must capture the value in
/// group 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternConfig {
    pub title_pattern: Option<String>,
    pub reference_pattern: Option<String>,
    pub organization_pattern: Option<String>,
    pub closing_date_pattern: Option<String>,
    pub min_fallback_title_chars: Option<usize>,
}

/// Name of the per-directory config file.
pub const LOCAL_CONFIG_NAME: &str = ".tender-analyzer.toml";

/// Platform config directory path: `<config_dir>/tender-analyzer/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tender-analyzer").join("config.toml"))
}

/// Load config by cascading CWD `.tender-analyzer.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(LOCAL_CONFIG_NAME));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        extraction: Some(ExtractionConfig {
            dpi: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.dpi)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.dpi)),
            force_ocr: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.force_ocr)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.force_ocr)),
        }),
        ocr: Some(OcrConfig {
            tesseract_cmd: overlay
                .ocr
                .as_ref()
                .and_then(|o| o.tesseract_cmd.clone())
                .or_else(|| base.ocr.as_ref().and_then(|o| o.tesseract_cmd.clone())),
        }),
        display: Some(DisplayConfig {
            json: overlay
                .display
                .as_ref()
                .and_then(|d| d.json)
                .or_else(|| base.display.as_ref().and_then(|d| d.json)),
            color: overlay
                .display
                .as_ref()
                .and_then(|d| d.color)
                .or_else(|| base.display.as_ref().and_then(|d| d.color)),
        }),
        parsing: Some(merge_patterns(
            base.parsing.unwrap_or_default(),
            overlay.parsing.unwrap_or_default(),
        )),
    }
}

fn merge_patterns(base: PatternConfig, overlay: PatternConfig) -> PatternConfig {
    PatternConfig {
        title_pattern: overlay.title_pattern.or(base.title_pattern),
        reference_pattern: overlay.reference_pattern.or(base.reference_pattern),
        organization_pattern: overlay.organization_pattern.or(base.organization_pattern),
        closing_date_pattern: overlay.closing_date_pattern.or(base.closing_date_pattern),
        min_fallback_title_chars: overlay
            .min_fallback_title_chars
            .or(base.min_fallback_title_chars),
    }
}
