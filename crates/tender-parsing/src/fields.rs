use once_cell::sync::Lazy;
use regex::Regex;

use tender_core::TenderRecord;

use crate::config::ParsingConfig;
use crate::date::normalize_date;

// Each label may be followed by up to five separator characters (colon,
// dash, or whitespace) before the captured value.

static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(?:Tender(?:\s+Title)?|Title|Project)[:\-\s]{0,5}(.+)$").unwrap()
});

static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)(?:Reference|Ref|Tender\s+No\.?|Tender\s+ID)[:\-\s]{0,5}([A-Z0-9\-_/]+)")
        .unwrap()
});

static ORGANIZATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^(?:Issued\s+By|Issuing\s+Organization|Organization|Procurement\s+Entity|Issued\s+To)[:\-\s]{0,5}(.+)$",
    )
    .unwrap()
});

static CLOSING_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)(?:Closing\s+Date|Deadline|Bid\s+Submission\s+Deadline|Submission\s+Deadline)[:\-\s]{0,5}(.+)$",
    )
    .unwrap()
});

/// Split text into lines on every universal-newline boundary.
///
/// Unlike [`str::lines`], this also breaks on `\r`, vertical tab, form feed
/// (Tesseract ends each page with `\x0c`), the file/group/record separators,
/// NEL, and the Unicode line/paragraph separators. A `\r\n` pair yields an
/// extra empty line, which every caller skips anyway.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| {
        matches!(
            c,
            '\n' | '\r'
                | '\u{0b}'
                | '\u{0c}'
                | '\u{1c}'
                | '\u{1d}'
                | '\u{1e}'
                | '\u{85}'
                | '\u{2028}'
                | '\u{2029}'
        )
    })
}

/// Collapse text to its non-blank lines, each trimmed, newline-joined.
pub fn collapse_blank_lines(text: &str) -> String {
    split_lines(text)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First match of `re` in `text`, capture group 1 trimmed.
pub fn first_match(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    caps.get(1).map(|m| m.as_str().trim().to_string())
}

/// Heuristic parser that turns extracted document text into a [`TenderRecord`].
#[derive(Debug, Clone, Default)]
pub struct FieldParser {
    config: ParsingConfig,
}

impl FieldParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    fn title_re(&self) -> &Regex {
        self.config.title_re.as_ref().unwrap_or(&*TITLE_RE)
    }

    fn reference_re(&self) -> &Regex {
        self.config.reference_re.as_ref().unwrap_or(&*REFERENCE_RE)
    }

    fn organization_re(&self) -> &Regex {
        self.config
            .organization_re
            .as_ref()
            .unwrap_or(&*ORGANIZATION_RE)
    }

    fn closing_date_re(&self) -> &Regex {
        self.config
            .closing_date_re
            .as_ref()
            .unwrap_or(&*CLOSING_DATE_RE)
    }

    /// Parse the four tender fields out of `text`.
    ///
    /// Label searches run on the collapsed view (trimmed non-blank lines);
    /// the title fallback scans the original lines.
    pub fn parse(&self, text: &str) -> TenderRecord {
        let full = collapse_blank_lines(text);

        let title = first_match(self.title_re(), &full).or_else(|| self.fallback_title(text));
        let reference = first_match(self.reference_re(), &full);
        let organization = first_match(self.organization_re(), &full);
        let raw_date = first_match(self.closing_date_re(), &full);

        tracing::debug!(
            title = title.is_some(),
            reference = reference.is_some(),
            organization = organization.is_some(),
            closing_date = raw_date.is_some(),
            "parsed tender fields"
        );

        TenderRecord {
            title,
            reference,
            organization,
            closing_date: normalize_date(raw_date.as_deref()),
        }
    }

    /// First trimmed line longer than the configured minimum that starts
    /// with an uppercase letter.
    pub fn fallback_title(&self, text: &str) -> Option<String> {
        let min = self.config.min_fallback_title_chars;
        split_lines(text)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .find(|l| {
                l.chars().count() > min && l.chars().next().is_some_and(char::is_uppercase)
            })
            .map(str::to_string)
    }
}

/// Parse tender fields with the default patterns.
pub fn parse_tender_text(text: &str) -> TenderRecord {
    static DEFAULT_PARSER: Lazy<FieldParser> = Lazy::new(FieldParser::new);
    DEFAULT_PARSER.parse(text)
}
