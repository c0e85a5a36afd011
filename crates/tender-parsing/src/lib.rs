use thiserror::Error;

pub mod config;
pub mod date;
pub mod fields;
#[cfg(feature = "dates")]
pub mod fuzzy_date;

pub use config::{ParsingConfig, ParsingConfigBuilder};
pub use date::normalize_date;
pub use fields::{FieldParser, parse_tender_text};
// Re-export domain types from core (canonical definitions live there)
pub use tender_core::TenderRecord;

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("invalid field pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
