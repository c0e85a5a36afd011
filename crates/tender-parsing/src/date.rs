/// Normalize a captured closing date to ISO-8601.
///
/// `None` and empty input yield `None`. When the `dates` feature is off, or
/// the text cannot be read as a date, the raw string comes back unchanged.
pub fn normalize_date(raw: Option<&str>) -> Option<String> {
    let raw = raw.filter(|s| !s.is_empty())?;

    #[cfg(feature = "dates")]
    {
        match crate::fuzzy_date::parse_fuzzy(raw) {
            Ok(iso) => return Some(iso),
            Err(e) => tracing::debug!(raw, error = %e, "closing date left unnormalized"),
        }
    }

    Some(raw.to_string())
}
