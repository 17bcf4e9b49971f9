//! Date coercion for statement and transaction date strings.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

// ISO-8601 calendar date (extended or basic), optionally followed by a time
// of day (hour, minute, second, fraction; colons optional) and a UTC offset.
static ISO_DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<y>\d{4})(?:-(?P<m>\d{2})-(?P<d>\d{2})|(?P<mb>\d{2})(?P<db>\d{2}))",
        r"(?:[T ](?P<hh>\d{2})(?::?(?P<mm>\d{2})(?::?(?P<ss>\d{2})(?:[.,]\d{1,9})?)?)?",
        r"(?:Z|[+-](?P<oh>\d{2})(?::?(?P<om>\d{2}))?)?)?$"
    ))
    .expect("iso datetime regex")
});

/// Parse a statement date into a calendar date.
///
/// Accepts ISO-8601 dates (`2024-01-15`, `20240115`) and datetimes with or
/// without seconds, fraction and offset (`2024-01-15T10:30Z`,
/// `2024-01-15 10:30`, `2024-01-15T10`, `2024-01-15T23:30:00-06:00`). The
/// date is the one written in the string; an offset is validated but does
/// not shift it. Anything else, including the empty string, is `None`.
pub fn parse_statement_date(s: &str) -> Option<NaiveDate> {
    let caps = ISO_DATETIME_RE.captures(s)?;
    let num = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    let year: i32 = caps["y"].parse().ok()?;
    let month = num("m").or_else(|| num("mb"))?;
    let day = num("d").or_else(|| num("db"))?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    if let Some(hour) = num("hh") {
        NaiveTime::from_hms_opt(hour, num("mm").unwrap_or(0), num("ss").unwrap_or(0))?;
    }
    if let Some(off_h) = num("oh") {
        if off_h >= 24 || num("om").unwrap_or(0) >= 60 {
            return None;
        }
    }

    Some(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_zulu_and_plain_date_agree() {
        assert_eq!(parse_statement_date("2024-01-15T00:00:00Z"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_statement_date("2024-01-15"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_offset_keeps_local_date() {
        assert_eq!(
            parse_statement_date("2024-01-15T23:30:00-06:00"),
            Some(ymd(2024, 1, 15))
        );
    }

    #[test]
    fn test_naive_datetimes() {
        assert_eq!(parse_statement_date("2024-03-02T10:15:00"), Some(ymd(2024, 3, 2)));
        assert_eq!(parse_statement_date("2024-03-02 10:15:00.250"), Some(ymd(2024, 3, 2)));
    }

    #[test]
    fn test_offset_datetimes_without_seconds() {
        assert_eq!(parse_statement_date("2024-01-15T10:30+05:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_statement_date("2024-01-15T10:30Z"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_statement_date("2024-01-15T10:30+0530"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_short_time_forms() {
        assert_eq!(parse_statement_date("2024-01-15 10:30"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_statement_date("2024-01-15T10"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_statement_date("2024-01-15 10:30:00+00:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_statement_date("2024-01-15T10:30:00.123456Z"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_basic_format() {
        assert_eq!(parse_statement_date("20240115"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_statement_date("20240115T1030"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_invalid_time_or_offset_is_none() {
        assert_eq!(parse_statement_date("2024-01-15T25:00"), None);
        assert_eq!(parse_statement_date("2024-01-15T10:61"), None);
        assert_eq!(parse_statement_date("2024-01-15T10:30+24:00"), None);
        assert_eq!(parse_statement_date("2024-01-15T"), None);
        assert_eq!(parse_statement_date("2024-01-15 extra"), None);
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_statement_date("not-a-date"), None);
        assert_eq!(parse_statement_date("01/15/2024"), None);
        assert_eq!(parse_statement_date("2024-02-30"), None);
        assert_eq!(parse_statement_date(""), None);
    }
}
