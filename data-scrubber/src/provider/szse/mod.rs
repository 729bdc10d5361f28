//! Shenzhen Stock Exchange (SZSE) exports
//!
//! Trades ship as `{date}_mdl_6_36_0.csv.zip`, snapshots as
//! `{date}_mdl_6_28_0.csv.zip`. Data rows carry a trailing delimiter the
//! header lacks, and some text columns are space padded (`"102 "`).

mod decoder;
mod normalizer;

pub use decoder::{SzseSnapshotDecoder, SzseTradeDecoder};
pub use normalizer::{infer_direction, SzseSnapshotNormalizer, SzseTradeNormalizer, EXEC_TYPE_TRADE};

use chrono::NaiveDate;

use crate::clock::format_trading_date;

/// Trade archive name for a trading date
pub fn trade_file_name(date: NaiveDate) -> String {
    format!("{}_mdl_6_36_0.csv.zip", format_trading_date(date))
}

/// Snapshot archive name for a trading date
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("{}_mdl_6_28_0.csv.zip", format_trading_date(date))
}
