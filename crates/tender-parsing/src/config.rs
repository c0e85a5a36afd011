use regex::Regex;

use crate::ParsingError;

/// Default minimum length (in characters) of a fallback title line.
pub const DEFAULT_MIN_FALLBACK_TITLE_CHARS: usize = 10;

/// Configuration for the field parser.
///
/// All regex fields are `Option<Regex>`; `None` means "use the built-in
/// default". Use [`ParsingConfigBuilder`] to construct with string patterns.
/// A custom pattern must have the field value in capture group 1.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    pub(crate) title_re: Option<Regex>,
    pub(crate) reference_re: Option<Regex>,
    pub(crate) organization_re: Option<Regex>,
    pub(crate) closing_date_re: Option<Regex>,
    /// A fallback title line must be strictly longer than this.
    pub(crate) min_fallback_title_chars: usize,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            title_re: None,
            reference_re: None,
            organization_re: None,
            closing_date_re: None,
            min_fallback_title_chars: DEFAULT_MIN_FALLBACK_TITLE_CHARS,
        }
    }
}

impl ParsingConfig {
    pub fn min_fallback_title_chars(&self) -> usize {
        self.min_fallback_title_chars
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled in [`build()`](Self::build).
/// Fails fast with [`ParsingError::InvalidPattern`] if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    title_re: Option<String>,
    reference_re: Option<String>,
    organization_re: Option<String>,
    closing_date_re: Option<String>,
    min_fallback_title_chars: Option<usize>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_regex(mut self, pattern: &str) -> Self {
        self.title_re = Some(pattern.to_string());
        self
    }

    pub fn reference_regex(mut self, pattern: &str) -> Self {
        self.reference_re = Some(pattern.to_string());
        self
    }

    pub fn organization_regex(mut self, pattern: &str) -> Self {
        self.organization_re = Some(pattern.to_string());
        self
    }

    pub fn closing_date_regex(mut self, pattern: &str) -> Self {
        self.closing_date_re = Some(pattern.to_string());
        self
    }

    pub fn min_fallback_title_chars(mut self, n: usize) -> Self {
        self.min_fallback_title_chars = Some(n);
        self
    }

    /// Compile all string patterns and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, ParsingError> {
        let compile = |opt: Option<String>| -> Result<Option<Regex>, ParsingError> {
            Ok(opt.map(|p| Regex::new(&p)).transpose()?)
        };

        Ok(ParsingConfig {
            title_re: compile(self.title_re)?,
            reference_re: compile(self.reference_re)?,
            organization_re: compile(self.organization_re)?,
            closing_date_re: compile(self.closing_date_re)?,
            min_fallback_title_chars: self
                .min_fallback_title_chars
                .unwrap_or(DEFAULT_MIN_FALLBACK_TITLE_CHARS),
        })
    }
}
