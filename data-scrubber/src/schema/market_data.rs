//! Canonical market data events
//!
//! Venue-specific records are normalized to these types before merging and
//! storage. Only `local_timestamp_ns` orders events across venues.

use serde::{Deserialize, Serialize};

/// Depth of the snapshot price ladders
pub const BOOK_LEVELS: usize = 10;

/// Source venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    /// Shanghai Stock Exchange
    Sse,
    /// Shenzhen Stock Exchange
    Szse,
}

impl Venue {
    /// Instrument id suffix (`.SH` / `.SZ`)
    pub fn suffix(&self) -> &'static str {
        match self {
            Venue::Sse => ".SH",
            Venue::Szse => ".SZ",
        }
    }

    /// Canonical instrument id for a venue security code
    pub fn instrument_id(&self, code: &str) -> String {
        format!("{}{}", code, self.suffix())
    }
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Venue::Sse => write!(f, "SSE"),
            Venue::Szse => write!(f, "SZSE"),
        }
    }
}

/// Kind of data processed per trading date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Trade,
    Snapshot,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Trade => "trade",
            DataType::Snapshot => "snapshot",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trade" | "trades" => Some(DataType::Trade),
            "snapshot" | "snapshots" => Some(DataType::Snapshot),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trade direction (aggressor side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
    #[default]
    Unknown,
}

impl Direction {
    /// Single character representation ('B', 'S' or 'N')
    pub fn as_char(&self) -> char {
        match self {
            Direction::Buy => 'B',
            Direction::Sell => 'S',
            Direction::Unknown => 'N',
        }
    }

    /// Parse a venue B/S flag; anything else is `Unknown`
    pub fn from_flag(flag: &str) -> Self {
        match flag.trim() {
            "B" | "b" => Direction::Buy,
            "S" | "s" => Direction::Sell,
            _ => Direction::Unknown,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
            Direction::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Common view over canonical events used by merge and partitioning
pub trait CanonicalEvent: Send {
    fn instrument_id(&self) -> &str;
    fn local_timestamp_ns(&self) -> i64;
}

/// Canonical trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Security code plus venue suffix, e.g. `600000.SH`
    pub instrument_id: String,
    /// Exchange-reported trade time, epoch nanoseconds
    pub event_timestamp_ns: i64,
    /// Venue sequence id of the trade
    pub sequence_id: i64,
    pub price: f64,
    pub volume: i64,
    pub turnover: f64,
    pub direction: Direction,
    pub buy_order_id: i64,
    pub sell_order_id: i64,
    /// Capture time at the recording host, epoch nanoseconds
    pub local_timestamp_ns: i64,
}

impl CanonicalEvent for TradeEvent {
    fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    fn local_timestamp_ns(&self) -> i64 {
        self.local_timestamp_ns
    }
}

/// One price level of a snapshot ladder
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub volume: i64,
}

/// Canonical order book snapshot with ten levels per side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEvent {
    pub instrument_id: String,
    /// Exchange update time, epoch nanoseconds
    pub event_timestamp_ns: i64,
    pub sequence_id: i64,
    pub last: f64,
    pub pre_close: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    /// Closing price; zero where the venue does not export it
    pub close: f64,
    /// Cumulative number of trades
    pub trade_count: i64,
    /// Cumulative volume
    pub volume: i64,
    /// Cumulative turnover
    pub turnover: f64,
    pub high_limit: f64,
    pub low_limit: f64,
    pub bids: [PriceLevel; BOOK_LEVELS],
    pub asks: [PriceLevel; BOOK_LEVELS],
    pub local_timestamp_ns: i64,
}

impl CanonicalEvent for SnapshotEvent {
    fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    fn local_timestamp_ns(&self) -> i64 {
        self.local_timestamp_ns
    }
}

/// A-share stock codes start with 0, 3 (Shenzhen) or 6 (Shanghai)
pub fn is_stock_code(code: &str) -> bool {
    matches!(code.as_bytes().first(), Some(b'0' | b'3' | b'6'))
}
