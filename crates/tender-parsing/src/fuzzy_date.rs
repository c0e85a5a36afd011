//! Fuzzy date reading for free-form closing dates.
//!
//! Pulls a calendar date (and optionally a time and UTC offset) out of
//! strings like `"Tuesday, 30th September 2025 at 11:00 AM (local time)"`,
//! skipping any words it does not recognize.

use chrono::{
    Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("no month found in {0:?}")]
    NoMonth(String),
    #[error("conflicting months {first} and {second}")]
    ConflictingMonth { first: u32, second: u32 },
    #[error("invalid calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("invalid time {hour:02}:{minute:02}:{second:02}")]
    InvalidTime { hour: u32, minute: u32, second: u32 },
    #[error("invalid UTC offset {0:?}")]
    InvalidOffset(String),
}

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        (?P<date>[0-9]{1,4}[/.\-][0-9]{1,2}[/.\-][0-9]{1,4})
        | (?P<time>[0-9]{1,2}(?::[0-9]{2}(?::[0-9]{2})?|\.[0-9]{2}))(?:\s*(?P<offset>[+\-][0-9]{2}:?[0-9]{2}))?
        | (?P<num>[0-9]+)(?:st|nd|rd|th)?
        | (?P<word>[a-z]+)
        ",
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Three numeric parts of a `-`, `/` or `.` separated date, as written.
    Date([String; 3]),
    Time {
        hour: u32,
        minute: u32,
        second: u32,
        offset: Option<String>,
    },
    Number { value: u32, digits: usize },
    Word(String),
}

fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| token_from(&caps))
        .collect()
}

fn token_from(caps: &Captures<'_>) -> Option<Token> {
    if let Some(m) = caps.name("date") {
        let mut parts = m.as_str().split(['/', '.', '-']).map(str::to_string);
        let a = parts.next()?;
        let b = parts.next()?;
        let c = parts.next()?;
        return Some(Token::Date([a, b, c]));
    }
    if let Some(m) = caps.name("time") {
        let mut parts = m.as_str().split([':', '.']).map(|p| p.parse::<u32>().ok());
        let hour = parts.next()??;
        let minute = parts.next()??;
        let second = parts.next().flatten().unwrap_or(0);
        let offset = caps.name("offset").map(|o| o.as_str().to_string());
        return Some(Token::Time {
            hour,
            minute,
            second,
            offset,
        });
    }
    if let Some(m) = caps.name("num") {
        let value = m.as_str().parse().ok()?;
        return Some(Token::Number {
            value,
            digits: m.as_str().len(),
        });
    }
    caps.name("word")
        .map(|m| Token::Word(m.as_str().to_lowercase()))
}

fn month_from_word(word: &str) -> Option<u32> {
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(word))
        .map(|i| i as u32 + 1)
}

/// Two-digit years below 70 land in the 2000s, the rest in the 1900s.
fn expand_year(value: u32, digits: usize) -> i32 {
    let value = value as i32;
    if digits > 2 {
        value
    } else if value < 70 {
        2000 + value
    } else {
        1900 + value
    }
}

/// Parse `+03:00`, `-0530` and friends.
fn parse_offset(raw: &str) -> Result<FixedOffset, DateParseError> {
    let invalid = || DateParseError::InvalidOffset(raw.to_string());
    let sign = if raw.starts_with('-') { -1 } else { 1 };
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 4 {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[derive(Debug, Default)]
struct Fields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    pm: Option<bool>,
    offset: Option<FixedOffset>,
}

impl Fields {
    fn set_date(&mut self, year: i32, month: u32, day: u32) {
        self.year.get_or_insert(year);
        self.month.get_or_insert(month);
        self.day.get_or_insert(day);
    }

    fn apply_date_parts(&mut self, parts: &[String; 3]) {
        let Some(nums) = parts
            .iter()
            .map(|p| p.parse::<u32>().ok())
            .collect::<Option<Vec<_>>>()
        else {
            return;
        };
        if parts[0].len() == 4 {
            self.set_date(nums[0] as i32, nums[1], nums[2]);
        } else {
            let year = expand_year(nums[2], parts[2].len());
            // Month first, unless the first part can only be a day
            if nums[0] > 12 {
                self.set_date(year, nums[1], nums[0]);
            } else {
                self.set_date(year, nums[0], nums[1]);
            }
        }
    }

    fn apply_number(&mut self, value: u32, digits: usize, next: Option<&Token>) {
        let before_meridiem = matches!(
            next,
            Some(Token::Word(w)) if matches!(w.as_str(), "am" | "pm" | "noon" | "midnight")
        );
        if before_meridiem && value <= 12 && self.hour.is_none() {
            self.hour = Some(value);
            self.minute = Some(0);
            return;
        }
        if digits == 8 {
            if self.year.is_none() {
                let (y, md) = (value / 10_000, value % 10_000);
                self.set_date(y as i32, md / 100, md % 100);
            }
        } else if digits == 4 || value > 31 {
            self.year.get_or_insert(value as i32);
        } else if value >= 1 && self.day.is_none() {
            self.day = Some(value);
        } else if self.year.is_none() {
            self.year = Some(expand_year(value, digits));
        }
    }

    fn apply_word(&mut self, word: &str) -> Result<(), DateParseError> {
        match word {
            "am" => self.pm = Some(false),
            "pm" => self.pm = Some(true),
            "utc" | "gmt" | "z" => {
                self.offset.get_or_insert(Utc.fix());
            }
            "noon" => {
                if matches!(self.hour, None | Some(12)) {
                    self.hour = Some(12);
                    self.minute.get_or_insert(0);
                    self.pm = None;
                }
            }
            "midnight" => {
                if matches!(self.hour, None | Some(12)) {
                    self.hour = Some(0);
                    self.minute.get_or_insert(0);
                    self.pm = None;
                }
            }
            _ => {
                if let Some(month) = month_from_word(word) {
                    match self.month {
                        None => self.month = Some(month),
                        Some(first) if first != month => {
                            return Err(DateParseError::ConflictingMonth {
                                first,
                                second: month,
                            });
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn hour_24(&self) -> u32 {
        let hour = self.hour.unwrap_or(0);
        match self.pm {
            Some(true) if hour < 12 => hour + 12,
            Some(false) if hour == 12 => 0,
            _ => hour,
        }
    }
}

/// Read a date out of free-form text and render it as ISO-8601.
///
/// The result is `YYYY-MM-DDTHH:MM:SS`, with a `±HH:MM` suffix when the text
/// carried an offset or a UTC marker. A month is required, and two different
/// month words (as in "may be submitted until 30 September") are rejected.
/// A missing year defaults to the current year and a missing day to the
/// first of the month, never today's day of the month.
/// Times may be written `HH:MM[:SS]` or `HH.MM`.
pub fn parse_fuzzy(text: &str) -> Result<String, DateParseError> {
    let tokens = tokenize(text);
    let mut fields = Fields::default();

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Date(parts) => fields.apply_date_parts(parts),
            Token::Time {
                hour,
                minute,
                second,
                offset,
            } => {
                if fields.hour.is_none() {
                    fields.hour = Some(*hour);
                    fields.minute = Some(*minute);
                    fields.second = Some(*second);
                }
                if let Some(raw) = offset {
                    fields.offset = Some(parse_offset(raw)?);
                }
            }
            Token::Number { value, digits } => {
                fields.apply_number(*value, *digits, tokens.get(i + 1));
            }
            Token::Word(word) => fields.apply_word(word)?,
        }
    }

    let month = fields
        .month
        .ok_or_else(|| DateParseError::NoMonth(text.to_string()))?;
    let year = fields.year.unwrap_or_else(|| Local::now().year());
    let day = fields.day.unwrap_or(1);

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(DateParseError::InvalidDate { year, month, day })?;

    let (hour, minute, second) = (
        fields.hour_24(),
        fields.minute.unwrap_or(0),
        fields.second.unwrap_or(0),
    );
    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or(DateParseError::InvalidTime {
        hour,
        minute,
        second,
    })?;

    let naive = NaiveDateTime::new(date, time);
    match fields.offset {
        Some(offset) => match offset.from_local_datetime(&naive).single() {
            Some(dt) => Ok(dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()),
            None => Ok(naive.format("%Y-%m-%dT%H:%M:%S").to_string()),
        },
        None => Ok(naive.format("%Y-%m-%dT%H:%M:%S").to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_month_year() {
        assert_eq!(
            parse_fuzzy("30 September 2025").unwrap(),
            "2025-09-30T00:00:00"
        );
    }

    #[test]
    fn test_month_day_year() {
        assert_eq!(
            parse_fuzzy("September 30, 2025").unwrap(),
            "2025-09-30T00:00:00"
        );
    }

    #[test]
    fn test_abbreviated_month_and_ordinal() {
        assert_eq!(parse_fuzzy("1st Sept 2025").unwrap(), "2025-09-01T00:00:00");
        assert_eq!(parse_fuzzy("Oct 3rd, 2025").unwrap(), "2025-10-03T00:00:00");
    }

    #[test]
    fn test_fuzzy_words_and_time() {
        assert_eq!(
            parse_fuzzy("Tuesday, 30th September 2025 at 11:00 AM (local time)").unwrap(),
            "2025-09-30T11:00:00"
        );
    }

    #[test]
    fn test_pm_time() {
        assert_eq!(
            parse_fuzzy("15 January 2026, 2:30 pm").unwrap(),
            "2026-01-15T14:30:00"
        );
    }

    #[test]
    fn test_bare_hour_with_meridiem() {
        assert_eq!(
            parse_fuzzy("5 pm on 10 March 2026").unwrap(),
            "2026-03-10T17:00:00"
        );
    }

    #[test]
    fn test_twelve_am_is_midnight() {
        assert_eq!(
            parse_fuzzy("1 June 2026 12:00 am").unwrap(),
            "2026-06-01T00:00:00"
        );
    }

    #[test]
    fn test_noon() {
        assert_eq!(
            parse_fuzzy("12 noon, 4 May 2026").unwrap(),
            "2026-05-04T12:00:00"
        );
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(parse_fuzzy("2025-09-30").unwrap(), "2025-09-30T00:00:00");
    }

    #[test]
    fn test_iso_datetime_utc() {
        assert_eq!(
            parse_fuzzy("2025-09-30T17:00:00Z").unwrap(),
            "2025-09-30T17:00:00+00:00"
        );
    }

    #[test]
    fn test_numeric_offset() {
        assert_eq!(
            parse_fuzzy("30/09/2025 10:00 +03:00").unwrap(),
            "2025-09-30T10:00:00+03:00"
        );
        assert_eq!(
            parse_fuzzy("30/09/2025 10:00 -0530").unwrap(),
            "2025-09-30T10:00:00-05:30"
        );
    }

    #[test]
    fn test_slash_date_day_first_when_unambiguous() {
        assert_eq!(parse_fuzzy("30/09/2025").unwrap(), "2025-09-30T00:00:00");
    }

    #[test]
    fn test_slash_date_month_first_when_ambiguous() {
        assert_eq!(parse_fuzzy("09/10/2025").unwrap(), "2025-09-10T00:00:00");
    }

    #[test]
    fn test_dotted_date_two_digit_year() {
        assert_eq!(parse_fuzzy("31.12.25").unwrap(), "2025-12-31T00:00:00");
    }

    #[test]
    fn test_dashed_month_name() {
        assert_eq!(parse_fuzzy("30-Sep-2025").unwrap(), "2025-09-30T00:00:00");
    }

    #[test]
    fn test_compact_date() {
        assert_eq!(parse_fuzzy("20250930").unwrap(), "2025-09-30T00:00:00");
    }

    #[test]
    fn test_missing_day_defaults_to_first() {
        assert_eq!(parse_fuzzy("September 2025").unwrap(), "2025-09-01T00:00:00");
    }

    #[test]
    fn test_missing_year_uses_current_year() {
        let expected = format!("{}-09-30T00:00:00", Local::now().year());
        assert_eq!(parse_fuzzy("30 September").unwrap(), expected);
    }

    #[test]
    fn test_no_month_is_error() {
        assert!(matches!(
            parse_fuzzy("as soon as possible"),
            Err(DateParseError::NoMonth(_))
        ));
        assert!(matches!(parse_fuzzy("2025"), Err(DateParseError::NoMonth(_))));
    }

    #[test]
    fn test_invalid_calendar_date() {
        assert_eq!(
            parse_fuzzy("31 February 2026"),
            Err(DateParseError::InvalidDate {
                year: 2026,
                month: 2,
                day: 31
            })
        );
    }

    #[test]
    fn test_invalid_time() {
        assert!(matches!(
            parse_fuzzy("1 May 2026 25:00"),
            Err(DateParseError::InvalidTime { .. })
        ));
    }

    #[test]
    fn test_second_month_word_is_rejected() {
        assert_eq!(
            parse_fuzzy("Bids may be submitted until 30 September 2025"),
            Err(DateParseError::ConflictingMonth {
                first: 5,
                second: 9
            })
        );
    }

    #[test]
    fn test_repeated_month_is_accepted() {
        assert_eq!(
            parse_fuzzy("30/09/2025 (30 September 2025)").unwrap(),
            "2025-09-30T00:00:00"
        );
    }

    #[test]
    fn test_dotted_time() {
        assert_eq!(
            parse_fuzzy("30/09/2025 at 10.00am").unwrap(),
            "2025-09-30T10:00:00"
        );
        assert_eq!(
            parse_fuzzy("14.30 hrs, 1 October 2025").unwrap(),
            "2025-10-01T14:30:00"
        );
    }

    #[test]
    fn test_dotted_date_is_not_a_time() {
        assert_eq!(parse_fuzzy("30.09.2025").unwrap(), "2025-09-30T00:00:00");
    }

    #[test]
    fn test_month_from_word() {
        assert_eq!(month_from_word("sep"), Some(9));
        assert_eq!(month_from_word("sept"), Some(9));
        assert_eq!(month_from_word("may"), Some(5));
        assert_eq!(month_from_word("ma"), None);
        assert_eq!(month_from_word("monday"), None);
    }
}
