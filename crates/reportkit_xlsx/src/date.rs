//! Named date patterns and Excel serial date conversion.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{ReportError, Result};

/// Date/time text patterns shared by report callers and cell rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumDatePattern {
    /// `1964-08-25`
    DateDash,
    /// `08/25/1964`
    DateSlash,
    /// `1964-08-25 13:45:00`
    DateTimeDash,
    /// `1964-08-25T13:45:00`
    Iso8601,
    /// `08/25/1964 13:45:00`
    Timestamp,
}

impl EnumDatePattern {
    /// `chrono` format string.
    pub fn format_str(self) -> &'static str {
        match self {
            Self::DateDash => "%Y-%m-%d",
            Self::DateSlash => "%m/%d/%Y",
            Self::DateTimeDash => "%Y-%m-%d %H:%M:%S",
            Self::Iso8601 => "%Y-%m-%dT%H:%M:%S",
            Self::Timestamp => "%m/%d/%Y %H:%M:%S",
        }
    }

    /// Excel number format rendering the same layout.
    pub fn excel_num_format(self) -> &'static str {
        match self {
            Self::DateDash => "yyyy-mm-dd",
            Self::DateSlash => "mm/dd/yyyy",
            Self::DateTimeDash => "yyyy-mm-dd hh:mm:ss",
            Self::Iso8601 => "yyyy-mm-dd\"T\"hh:mm:ss",
            Self::Timestamp => "mm/dd/yyyy hh:mm:ss",
        }
    }

    /// Pattern carries a time of day.
    pub fn if_has_time(self) -> bool {
        !matches!(self, Self::DateDash | Self::DateSlash)
    }
}

/// Parse a calendar date; time-of-day patterns drop the time part.
pub fn parse_date(pattern: EnumDatePattern, value: &str) -> Result<NaiveDate> {
    if pattern.if_has_time() {
        return parse_date_time(pattern, value).map(|dt| dt.date());
    }
    NaiveDate::parse_from_str(value.trim(), pattern.format_str()).map_err(|_| {
        ReportError::InvalidDate {
            value: value.to_string(),
            pattern: pattern.format_str(),
        }
    })
}

/// Parse a timestamp; date-only patterns resolve to midnight.
pub fn parse_date_time(pattern: EnumDatePattern, value: &str) -> Result<NaiveDateTime> {
    if !pattern.if_has_time() {
        return parse_date(pattern, value).map(|date| date.and_time(NaiveTime::MIN));
    }
    NaiveDateTime::parse_from_str(value.trim(), pattern.format_str()).map_err(|_| {
        ReportError::InvalidDate {
            value: value.to_string(),
            pattern: pattern.format_str(),
        }
    })
}

pub fn format_date(pattern: EnumDatePattern, date: NaiveDate) -> String {
    format_date_time(pattern, date.and_time(NaiveTime::MIN))
}

pub fn format_date_time(pattern: EnumDatePattern, value: NaiveDateTime) -> String {
    value.format(pattern.format_str()).to_string()
}

/// Excel serial day number (1900 date system) of `date`.
///
/// Returns `None` before 1900-01-01, which Excel cannot represent.
pub fn convert_date_to_excel_serial(date: NaiveDate) -> Option<f64> {
    let date_first = NaiveDate::from_ymd_opt(1900, 1, 1)?;
    if date < date_first {
        return None;
    }

    // Serial 60 is the phantom 1900-02-29.
    let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date_leap_bug = NaiveDate::from_ymd_opt(1900, 3, 1)?;
    let mut n_days = date.signed_duration_since(excel_epoch).num_days();
    if date < date_leap_bug {
        n_days -= 1;
    }
    Some(n_days as f64)
}

/// Excel serial date-time number of `value`.
pub fn convert_date_time_to_excel_serial(value: NaiveDateTime) -> Option<f64> {
    let n_day = convert_date_to_excel_serial(value.date())?;
    let time = value.time();
    let n_seconds = f64::from(time.num_seconds_from_midnight())
        + f64::from(time.nanosecond() % 1_000_000_000) / 1e9;
    Some(n_day + n_seconds / 86_400.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format_round_patterns() {
        let date = parse_date(EnumDatePattern::DateDash, "1991-01-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1991, 1, 1).unwrap());
        assert_eq!(format_date(EnumDatePattern::DateSlash, date), "01/01/1991");

        let dt = parse_date_time(EnumDatePattern::Timestamp, "08/25/1964 13:45:10").unwrap();
        assert_eq!(
            format_date_time(EnumDatePattern::Iso8601, dt),
            "1964-08-25T13:45:10"
        );
        assert_eq!(
            parse_date(EnumDatePattern::DateTimeDash, "1964-08-25 13:45:10").unwrap(),
            NaiveDate::from_ymd_opt(1964, 8, 25).unwrap()
        );
        assert_eq!(
            parse_date_time(EnumDatePattern::DateDash, "1964-08-25")
                .unwrap()
                .time(),
            NaiveTime::MIN
        );
    }

    #[test]
    fn test_parse_date_rejects_mismatched_text() {
        let err = parse_date(EnumDatePattern::DateDash, "25/08/1964").unwrap_err();
        assert!(matches!(err, ReportError::InvalidDate { .. }));
    }

    #[test]
    fn test_excel_serial_matches_excel_1900_system() {
        let serial =
            |y, m, d| convert_date_to_excel_serial(NaiveDate::from_ymd_opt(y, m, d).unwrap());

        assert_eq!(serial(1900, 1, 1), Some(1.0));
        assert_eq!(serial(1900, 2, 28), Some(59.0));
        assert_eq!(serial(1900, 3, 1), Some(61.0));
        assert_eq!(serial(1964, 8, 25), Some(23_614.0));
        assert_eq!(serial(1899, 12, 31), None);

        let dt = NaiveDate::from_ymd_opt(1964, 8, 25)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(convert_date_time_to_excel_serial(dt), Some(23_614.5));
    }
}
