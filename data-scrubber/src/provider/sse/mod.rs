//! Shanghai Stock Exchange (SSE) exports
//!
//! Trades switched layout on 2023-12-04: earlier dates ship a pure
//! transaction table (`{date}_Transaction.csv.zip`), later dates a mixed
//! tick-by-tick table (`{date}_mdl_4_24_0.csv.zip`) in which only `Type == T`
//! rows are trades. The layout is chosen once per file from the trading date.
//! Snapshots ship as `{date}_MarketData.csv.zip`.

mod decoder;
mod normalizer;

pub use decoder::{SseCurrentTradeDecoder, SseLegacyTradeDecoder, SseSnapshotDecoder, SseTradeDecoder};
pub use normalizer::{SseSnapshotNormalizer, SseTradeNormalizer};

use chrono::{Datelike, NaiveDate};

use crate::clock::format_trading_date;

/// First trading date (year, month, day) of the current trade layout
pub const TRADE_LAYOUT_CUTOVER: (i32, u32, u32) = (2023, 12, 4);

/// SSE trade schema revision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseRevision {
    /// `Transaction` table, before the cutover
    Legacy,
    /// `mdl_4_24_0` tick-by-tick table, on and after the cutover
    Current,
}

impl SseRevision {
    pub fn for_date(date: NaiveDate) -> Self {
        if (date.year(), date.month(), date.day()) >= TRADE_LAYOUT_CUTOVER {
            SseRevision::Current
        } else {
            SseRevision::Legacy
        }
    }
}

/// Trade archive name for a trading date
pub fn trade_file_name(date: NaiveDate) -> String {
    let day = format_trading_date(date);
    match SseRevision::for_date(date) {
        SseRevision::Current => format!("{}_mdl_4_24_0.csv.zip", day),
        SseRevision::Legacy => format!("{}_Transaction.csv.zip", day),
    }
}

/// Snapshot archive name for a trading date
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("{}_MarketData.csv.zip", format_trading_date(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_revision_cutover() {
        assert_eq!(SseRevision::for_date(date(2023, 12, 1)), SseRevision::Legacy);
        assert_eq!(SseRevision::for_date(date(2023, 12, 3)), SseRevision::Legacy);
        assert_eq!(SseRevision::for_date(date(2023, 12, 4)), SseRevision::Current);
        assert_eq!(SseRevision::for_date(date(2024, 1, 2)), SseRevision::Current);
        assert_eq!(SseRevision::for_date(date(2019, 6, 25)), SseRevision::Legacy);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(trade_file_name(date(2023, 12, 1)), "20231201_Transaction.csv.zip");
        assert_eq!(trade_file_name(date(2023, 12, 4)), "20231204_mdl_4_24_0.csv.zip");
        assert_eq!(snapshot_file_name(date(2024, 1, 2)), "20240102_MarketData.csv.zip");
    }
}
