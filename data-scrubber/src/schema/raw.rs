//! Raw venue records
//!
//! Field sets as exported by each venue and schema revision. Time strings are
//! kept verbatim; the normalizer turns them into nanoseconds.

use super::market_data::BOOK_LEVELS;

/// Shanghai tick-by-tick record (current layout, `mdl_4_24_0`).
///
/// Mixes trades (`Type == "T"`) with order adds and deletes.
#[derive(Debug, Clone, PartialEq)]
pub struct SseCurrentTrade {
    pub biz_index: i64,
    pub channel: i64,
    pub security_id: String,
    pub tick_time: String,
    pub tick_type: String,
    pub buy_order_no: i64,
    pub sell_order_no: i64,
    pub price: f64,
    pub qty: i64,
    pub trade_money: f64,
    pub tick_bs_flag: String,
    pub local_time: String,
    pub seq_no: i64,
}

/// Shanghai transaction record (legacy `Transaction` layout). Trades only.
#[derive(Debug, Clone, PartialEq)]
pub struct SseLegacyTrade {
    pub data_status: i64,
    pub trade_index: i64,
    pub trade_channel: i64,
    pub security_id: String,
    pub trade_time: String,
    pub trade_price: f64,
    pub trade_volume: f64,
    pub trade_money: f64,
    pub trade_buy_no: i64,
    pub trade_sell_no: i64,
    pub trade_bs_flag: String,
    pub biz_index: i64,
    pub local_time: String,
    pub seq_no: i64,
}

/// Shanghai trade record of either schema revision
#[derive(Debug, Clone, PartialEq)]
pub enum SseTrade {
    Legacy(SseLegacyTrade),
    Current(SseCurrentTrade),
}

/// Shenzhen tick-by-tick execution record (`mdl_6_36_0`)
#[derive(Debug, Clone, PartialEq)]
pub struct SzseTrade {
    pub channel_no: i64,
    pub appl_seq_num: i64,
    pub md_stream_id: String,
    pub bid_appl_seq_num: i64,
    pub offer_appl_seq_num: i64,
    pub security_id: String,
    pub security_id_source: String,
    pub last_px: f64,
    pub last_qty: i64,
    pub exec_type: i64,
    pub transact_time: String,
    pub local_time: String,
    pub seq_no: i64,
}

/// `(price, volume)` ladder as exported, best level first
pub type RawLadder<V> = [(f64, V); BOOK_LEVELS];

/// Shanghai level-2 snapshot (`MarketData`). Volumes are exported as decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct SseSnapshot {
    pub update_time: String,
    pub security_id: String,
    pub pre_close_price: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub last_price: f64,
    pub close_price: f64,
    pub trade_number: i64,
    pub trade_volume: f64,
    pub turnover: f64,
    pub bids: RawLadder<f64>,
    pub asks: RawLadder<f64>,
    pub local_time: String,
    pub seq_no: i64,
}

/// Shenzhen level-2 snapshot (`mdl_6_28_0`)
#[derive(Debug, Clone, PartialEq)]
pub struct SzseSnapshot {
    pub update_time: String,
    pub security_id: String,
    pub pre_close_price: f64,
    pub turn_num: i64,
    pub volume: i64,
    pub turnover: f64,
    pub last_price: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub high_limit_price: f64,
    pub low_limit_price: f64,
    pub bids: RawLadder<i64>,
    pub asks: RawLadder<i64>,
    pub local_time: String,
    pub seq_no: i64,
}
