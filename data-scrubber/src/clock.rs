//! Trading-session clock
//!
//! Venue exports carry a time of day only (`HH:MM:SS.mmm`); the trading date
//! comes from the file being processed. The clock combines both and converts
//! the wall-clock instant in the venue timezone to epoch nanoseconds.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{ScrubError, ScrubResult};

/// Default venue timezone for both Shanghai and Shenzhen exports
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";

const DATE_FORMAT: &str = "%Y%m%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Parse a `YYYYMMDD` trading date
pub fn parse_trading_date(s: &str) -> ScrubResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|e| {
        ScrubError::Configuration(format!("invalid trading date '{}': {}", s, e))
    })
}

/// Format a trading date as `YYYYMMDD`
pub fn format_trading_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a timezone name such as `Asia/Shanghai`
pub fn parse_timezone(name: &str) -> ScrubResult<Tz> {
    name.parse::<Tz>()
        .map_err(|e| ScrubError::Configuration(format!("invalid timezone '{}': {}", name, e)))
}

/// Converts venue times of day on one trading date to epoch nanoseconds.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    date: NaiveDate,
    tz: Tz,
}

impl SessionClock {
    pub fn new(date: NaiveDate, tz: Tz) -> Self {
        Self { date, tz }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Convert a `HH:MM:SS.mmm` time of day to epoch nanoseconds.
    ///
    /// # Errors
    ///
    /// A time that does not parse, or a local time that does not exist in
    /// the venue timezone, is a file-level [`ScrubError::Timestamp`].
    pub fn to_nanos(&self, time_of_day: &str) -> ScrubResult<i64> {
        let value = time_of_day.trim();
        let time = NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|e| {
            ScrubError::Timestamp {
                value: value.to_string(),
                reason: e.to_string(),
            }
        })?;

        let local = NaiveDateTime::new(self.date, time);
        let instant = self
            .tz
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| ScrubError::Timestamp {
                value: value.to_string(),
                reason: format!("no unique instant in {}", self.tz),
            })?;

        instant
            .timestamp_nanos_opt()
            .ok_or_else(|| ScrubError::Timestamp {
                value: value.to_string(),
                reason: "out of nanosecond range".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(date: &str) -> SessionClock {
        SessionClock::new(
            parse_trading_date(date).unwrap(),
            parse_timezone(DEFAULT_TIMEZONE).unwrap(),
        )
    }

    #[test]
    fn test_to_nanos_shanghai() {
        // 2024-01-02 09:30:00.000 +08:00 == 2024-01-02 01:30:00 UTC
        let ns = clock("20240102").to_nanos("09:30:00.000").unwrap();
        assert_eq!(ns, 1_704_159_000_000_000_000);
    }

    #[test]
    fn test_to_nanos_keeps_millis() {
        let c = clock("20240102");
        let a = c.to_nanos("09:30:00.000").unwrap();
        let b = c.to_nanos("09:30:00.125").unwrap();
        assert_eq!(b - a, 125_000_000);
    }

    #[test]
    fn test_to_nanos_trims_padding() {
        let c = clock("20240102");
        assert_eq!(
            c.to_nanos(" 09:30:00.000 ").unwrap(),
            c.to_nanos("09:30:00.000").unwrap()
        );
    }

    #[test]
    fn test_to_nanos_malformed() {
        let err = clock("20240102").to_nanos("9h30").unwrap_err();
        assert!(matches!(err, ScrubError::Timestamp { .. }));
    }

    #[test]
    fn test_parse_trading_date() {
        let d = parse_trading_date("20231204").unwrap();
        assert_eq!(format_trading_date(d), "20231204");
        assert!(parse_trading_date("2023-12-04").is_err());
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("Asia/Shanghai").is_ok());
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
