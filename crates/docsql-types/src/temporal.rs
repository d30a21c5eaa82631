//! Temporal literal parsing and canonical rendering
//!
//! `Date`/`Time`/`DateTime` are civil (timezone-naive) values; `Timestamp`
//! is an instant anchored to the Unix epoch. String literals parse here with
//! semantic-check failures that name the offending value and the expected
//! shape. Fractional seconds carry microsecond precision.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::error::{ExprError, ExprResult};

/// Parse a `yyyy-MM-dd` date literal
pub fn parse_date(s: &str) -> ExprResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        ExprError::semantic_check(format!(
            "date:{s} in unsupported format, please use 'yyyy-MM-dd'"
        ))
    })
}

/// Parse a `HH:mm:ss[.SSSSSS]` or `HH:mm` time literal
pub fn parse_time(s: &str) -> ExprResult<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| {
            ExprError::semantic_check(format!(
                "time:{s} in unsupported format, please use 'HH:mm:ss[.SSSSSS]'"
            ))
        })
}

/// Parse a `yyyy-MM-dd HH:mm:ss[.SSSSSS]` or `yyyy-MM-dd` datetime literal
pub fn parse_datetime(s: &str) -> ExprResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|_| {
            ExprError::semantic_check(format!(
                "datetime:{s} in unsupported format, please use 'yyyy-MM-dd HH:mm:ss[.SSSSSS]'"
            ))
        })
}

/// Parse a timestamp literal; the wall clock is interpreted as UTC
pub fn parse_timestamp(s: &str) -> ExprResult<DateTime<Utc>> {
    parse_datetime(s)
        .map(|dt| dt.and_utc())
        .map_err(|_| {
            ExprError::semantic_check(format!(
                "timestamp:{s} in unsupported format, please use 'yyyy-MM-dd HH:mm:ss[.SSSSSS]'"
            ))
        })
}

/// Canonical `HH:mm:ss[.SSSSSS]` rendering, fraction omitted when zero
pub fn format_time(t: NaiveTime) -> String {
    let micros = t.nanosecond() / 1_000;
    if micros == 0 {
        t.format("%H:%M:%S").to_string()
    } else {
        format!("{}.{micros:06}", t.format("%H:%M:%S"))
    }
}

/// Canonical `yyyy-MM-dd HH:mm:ss[.SSSSSS]` rendering
pub fn format_datetime(dt: NaiveDateTime) -> String {
    format!("{} {}", dt.format("%Y-%m-%d"), format_time(dt.time()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_roundtrip() {
        let d = parse_date("2020-09-16").unwrap();
        assert_eq!(d.to_string(), "2020-09-16");
    }

    #[test]
    fn test_parse_date_rejects_invalid_calendar_day() {
        let err = parse_date("2020-02-30").unwrap_err();
        assert!(err.to_string().contains("2020-02-30"));
    }

    #[test]
    fn test_parse_time_with_fraction() {
        let t = parse_time("10:20:30.123456").unwrap();
        assert_eq!(format_time(t), "10:20:30.123456");
        let t = parse_time("10:20:30").unwrap();
        assert_eq!(format_time(t), "10:20:30");
    }

    #[test]
    fn test_parse_datetime_date_only_is_midnight() {
        let dt = parse_datetime("2020-09-16").unwrap();
        assert_eq!(format_datetime(dt), "2020-09-16 00:00:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_date("16/09/2020").is_err());
        assert!(parse_time("25:00:00").is_err());
        assert!(parse_datetime("yesterday").is_err());
    }
}
