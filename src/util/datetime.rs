use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};

/// Parses a feed date-time.
///
/// Accepts, in order: RFC 3339 (Atom, W3CDTF with time), RFC 2822 (RSS 2.0),
/// W3CDTF without seconds (`2000-01-01T12:00+00:00`) and W3CDTF date-only
/// values (`2024-01-31`, read as midnight UTC).
/// Surrounding whitespace is ignored. Returns `None` for anything else.
pub fn parse_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Formats a date-time as RFC 3339, keeping its offset.
pub fn format_datetime(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339() {
        let dt = parse_datetime("2024-03-01T10:20:30+09:00").unwrap();
        assert_eq!(format_datetime(&dt), "2024-03-01T10:20:30+09:00");
    }

    #[test]
    fn test_rfc3339_fractional_seconds_kept() {
        let dt = parse_datetime("2024-03-01T10:20:30.25Z").unwrap();
        assert_eq!(format_datetime(&dt), "2024-03-01T10:20:30.250+00:00");
    }

    #[test]
    fn test_rfc2822() {
        let dt = parse_datetime("Sun, 19 May 2002 15:21:36 GMT").unwrap();
        assert_eq!(format_datetime(&dt), "2002-05-19T15:21:36+00:00");
    }

    #[test]
    fn test_minutes_only() {
        let dt = parse_datetime("2000-01-01T12:00+00:00").unwrap();
        assert_eq!(format_datetime(&dt), "2000-01-01T12:00:00+00:00");
    }

    #[test]
    fn test_date_only() {
        let dt = parse_datetime("  2024-01-31 ").unwrap();
        assert_eq!(format_datetime(&dt), "2024-01-31T00:00:00+00:00");
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("2024-13-45").is_none());
    }

    #[test]
    fn test_round_trip_through_format() {
        let dt = parse_datetime("2001-02-03T04:05:06-07:00").unwrap();
        assert_eq!(parse_datetime(&format_datetime(&dt)), Some(dt));
    }
}
