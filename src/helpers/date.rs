//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Parse a frontmatter date string in the formats authors actually write
///
/// Offsets are normalised to UTC so ordering does not depend on the local
/// timezone of the build machine.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let offset_formats = ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"];
    for fmt in offset_formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Current wall-clock time as an ISO 8601 string with millisecond precision
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date() {
        let dt = parse_date("2024-06-01").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-06-01 00:00");
    }

    #[test]
    fn test_parse_datetime_variants() {
        assert!(parse_date("2024-01-15 10:30:00").is_some());
        assert!(parse_date("2024/01/15").is_some());
        assert!(parse_date("2024-01-15T10:30:00").is_some());
        assert!(parse_date("January 15, 2024").is_some());
    }

    #[test]
    fn test_parse_rfc3339_normalises_offset() {
        let dt = parse_date("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "08:30");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_date("someday").is_none());
        assert!(parse_date("2024-13-45").is_none());
    }

    #[test]
    fn test_now_iso_shape() {
        let now = now_iso();
        assert!(now.ends_with('Z'));
        assert!(parse_date(&now).is_some());
    }
}
