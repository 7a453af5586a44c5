use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an ISO-8601 timestamp, accepting either the `T` or a space
/// separator and an optional fractional-seconds part.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parses a calendar date, from either a bare `YYYY-MM-DD` or a full
/// timestamp (whose time part is discarded).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

/// Inclusive range start: a bare date means the first instant of that day.
pub fn parse_range_start(s: &str) -> Option<NaiveDateTime> {
    parse_datetime(s).or_else(|| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(start_of_day)
    })
}

/// Inclusive range end: a bare date means the last instant of that day, so
/// `start_date=2024-01-01&end_date=2024-01-01` covers the whole calendar day.
pub fn parse_range_end(s: &str) -> Option<NaiveDateTime> {
    parse_datetime(s).or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(end_of_day))
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    // Microsecond precision keeps the bound inside the day for MySQL
    // DATETIME comparisons.
    date.and_hms_micro_opt(23, 59, 59, 999_999)
        .expect("valid clock time")
}

/// `[00:00:00, 23:59:59.999999]` bounds of a calendar day.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    (start_of_day(date), end_of_day(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_separators() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-01-01T09:30:00"), Some(expected));
        assert_eq!(parse_datetime("2024-01-01 09:30:00"), Some(expected));
    }

    #[test]
    fn parses_fractional_seconds() {
        let dt = parse_datetime("2024-01-01T09:30:00.250").unwrap();
        assert_eq!(dt.format("%H:%M:%S%.3f").to_string(), "09:30:00.250");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_datetime("not-a-date"), None);
        assert_eq!(parse_range_start("2024-13-01"), None);
    }

    #[test]
    fn bare_date_expands_to_day_bounds() {
        let start = parse_range_start("2024-01-01").unwrap();
        let end = parse_range_end("2024-01-01").unwrap();
        assert_eq!(start.to_string(), "2024-01-01 00:00:00");
        assert_eq!(end.format("%Y-%m-%d %H:%M:%S%.6f").to_string(), "2024-01-01 23:59:59.999999");
        assert!(start < end);
    }

    #[test]
    fn explicit_timestamps_pass_through() {
        assert_eq!(
            parse_range_end("2024-01-01T12:00:00").unwrap().to_string(),
            "2024-01-01 12:00:00"
        );
    }

    #[test]
    fn date_accepts_full_timestamps() {
        assert_eq!(
            parse_date("2024-01-02T08:00:00"),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(parse_date("2024-01-02"), NaiveDate::from_ymd_opt(2024, 1, 2));
    }
}
