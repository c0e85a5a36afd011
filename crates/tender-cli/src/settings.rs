use tender_core::DEFAULT_DPI;
use tender_core::config_file::ConfigFile;
use tender_parsing::{FieldParser, ParsingConfigBuilder, ParsingError};

const DEFAULT_TESSERACT_CMD: &str = "tesseract";

/// One source of settings. `None` means "not set here, ask the next source".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    pub json: Option<bool>,
    pub force_ocr: Option<bool>,
    pub dpi: Option<u32>,
    pub tesseract_cmd: Option<String>,
    pub color: Option<bool>,
}

impl Layer {
    /// Values from `self` win; gaps are filled from `fallback`.
    pub fn or(self, fallback: Layer) -> Layer {
        Layer {
            json: self.json.or(fallback.json),
            force_ocr: self.force_ocr.or(fallback.force_ocr),
            dpi: self.dpi.or(fallback.dpi),
            tesseract_cmd: self.tesseract_cmd.or(fallback.tesseract_cmd),
            color: self.color.or(fallback.color),
        }
    }

    /// Read `TENDER_DPI`, `TENDER_FORCE_OCR`, `TESSERACT_CMD` and `NO_COLOR`
    /// through `lookup`. Unparseable values are ignored.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Layer {
        Layer {
            json: None,
            force_ocr: lookup("TENDER_FORCE_OCR").and_then(|v| parse_bool(&v)),
            dpi: lookup("TENDER_DPI")
                .and_then(|v| v.trim().parse().ok())
                .filter(|dpi| *dpi > 0),
            tesseract_cmd: lookup("TESSERACT_CMD").filter(|v| !v.trim().is_empty()),
            color: lookup("NO_COLOR")
                .filter(|v| !v.is_empty())
                .map(|_| false),
        }
    }

    pub fn from_env() -> Layer {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn from_config(config: &ConfigFile) -> Layer {
        let extraction = config.extraction.as_ref();
        let display = config.display.as_ref();
        Layer {
            json: display.and_then(|d| d.json),
            force_ocr: extraction.and_then(|e| e.force_ocr),
            dpi: extraction.and_then(|e| e.dpi).filter(|dpi| *dpi > 0),
            tesseract_cmd: config.ocr.as_ref().and_then(|o| o.tesseract_cmd.clone()),
            color: display.and_then(|d| d.color),
        }
    }
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub json: bool,
    pub force_ocr: bool,
    pub dpi: u32,
    pub tesseract_cmd: String,
    pub color: bool,
}

impl Settings {
    /// Resolve configuration: CLI flags > env vars > config file > defaults.
    ///
    /// Colors additionally require stdout to be a terminal.
    pub fn resolve(cli: Layer, env: Layer, file: Layer, stdout_is_tty: bool) -> Settings {
        let merged = cli.or(env).or(file);
        Settings {
            json: merged.json.unwrap_or(false),
            force_ocr: merged.force_ocr.unwrap_or(false),
            dpi: merged.dpi.unwrap_or(DEFAULT_DPI),
            tesseract_cmd: merged
                .tesseract_cmd
                .unwrap_or_else(|| DEFAULT_TESSERACT_CMD.to_string()),
            color: stdout_is_tty && merged.color.unwrap_or(true),
        }
    }
}

/// Build the field parser, applying any `[parsing]` overrides from the
/// config file. Invalid patterns are reported, not skipped.
pub fn field_parser(config: &ConfigFile) -> Result<FieldParser, ParsingError> {
    let Some(patterns) = config.parsing.as_ref() else {
        return Ok(FieldParser::new());
    };

    let mut builder = ParsingConfigBuilder::new();
    if let Some(p) = &patterns.title_pattern {
        builder = builder.title_regex(p);
    }
    if let Some(p) = &patterns.reference_pattern {
        builder = builder.reference_regex(p);
    }
    if let Some(p) = &patterns.organization_pattern {
        builder = builder.organization_regex(p);
    }
    if let Some(p) = &patterns.closing_date_pattern {
        builder = builder.closing_date_regex(p);
    }
    if let Some(n) = patterns.min_fallback_title_chars {
        builder = builder.min_fallback_title_chars(n);
    }
    Ok(FieldParser::with_config(builder.build()?))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
