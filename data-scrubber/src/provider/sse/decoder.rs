//! SSE row decoders
//!
//! Each decoder is bound to a file's header once; binding fails if any
//! required column is missing, which is how a legacy table handed to the
//! current-layout decoder is rejected before any row is read.

use crate::error::{RowError, ScrubResult};
use crate::ingest::HeaderIndex;
use crate::provider::fields::{bind_ladder, LadderColumns, Row};
use crate::provider::RowDecoder;
use crate::schema::{RawLadder, SseCurrentTrade, SseLegacyTrade, SseSnapshot, SseTrade};

use super::SseRevision;

/// Decoder for the `mdl_4_24_0` tick-by-tick layout
#[derive(Debug, Clone)]
pub struct SseCurrentTradeDecoder {
    biz_index: usize,
    channel: Option<usize>,
    security_id: usize,
    tick_time: usize,
    tick_type: usize,
    buy_order_no: usize,
    sell_order_no: usize,
    price: usize,
    qty: usize,
    trade_money: usize,
    tick_bs_flag: usize,
    local_time: usize,
    seq_no: Option<usize>,
}

impl SseCurrentTradeDecoder {
    pub const LAYOUT: &'static str = "sse-trade-current";

    pub fn bind(header: &HeaderIndex) -> ScrubResult<Self> {
        let col = |name| header.require(name, Self::LAYOUT);
        Ok(Self {
            biz_index: col("BizIndex")?,
            channel: header.get("Channel"),
            security_id: col("SecurityID")?,
            tick_time: col("TickTime")?,
            tick_type: col("Type")?,
            buy_order_no: col("BuyOrderNO")?,
            sell_order_no: col("SellOrderNO")?,
            price: col("Price")?,
            qty: col("Qty")?,
            trade_money: col("TradeMoney")?,
            tick_bs_flag: col("TickBSFlag")?,
            local_time: col("LocalTime")?,
            seq_no: header.get("SeqNo"),
        })
    }

    fn decode_row(&self, row: Row<'_>) -> Result<SseCurrentTrade, RowError> {
        Ok(SseCurrentTrade {
            biz_index: row.int(self.biz_index),
            channel: row.opt_int(self.channel),
            security_id: row.required_text(self.security_id, "SecurityID")?.to_string(),
            tick_time: row.text(self.tick_time).to_string(),
            tick_type: row.required_text(self.tick_type, "Type")?.to_string(),
            buy_order_no: row.int(self.buy_order_no),
            sell_order_no: row.int(self.sell_order_no),
            price: row.float(self.price),
            qty: row.int(self.qty),
            trade_money: row.float(self.trade_money),
            tick_bs_flag: row.text(self.tick_bs_flag).to_string(),
            local_time: row.text(self.local_time).to_string(),
            seq_no: row.opt_int(self.seq_no),
        })
    }
}

/// Decoder for the legacy `Transaction` layout
#[derive(Debug, Clone)]
pub struct SseLegacyTradeDecoder {
    data_status: Option<usize>,
    trade_index: Option<usize>,
    trade_channel: Option<usize>,
    security_id: usize,
    trade_time: usize,
    trade_price: usize,
    trade_volume: usize,
    trade_money: usize,
    trade_buy_no: usize,
    trade_sell_no: usize,
    trade_bs_flag: usize,
    biz_index: usize,
    local_time: usize,
    seq_no: Option<usize>,
}

impl SseLegacyTradeDecoder {
    pub const LAYOUT: &'static str = "sse-trade-legacy";

    pub fn bind(header: &HeaderIndex) -> ScrubResult<Self> {
        let col = |name| header.require(name, Self::LAYOUT);
        Ok(Self {
            data_status: header.get("DataStatus"),
            trade_index: header.get("TradeIndex"),
            trade_channel: header.get("TradeChan"),
            security_id: col("SecurityID")?,
            trade_time: col("TradTime")?,
            trade_price: col("TradPrice")?,
            trade_volume: col("TradVolume")?,
            trade_money: col("TradeMoney")?,
            trade_buy_no: col("TradeBuyNo")?,
            trade_sell_no: col("TradeSellNo")?,
            trade_bs_flag: col("TradeBSFlag")?,
            biz_index: col("BizIndex")?,
            local_time: col("LocalTime")?,
            seq_no: header.get("SeqNo"),
        })
    }

    fn decode_row(&self, row: Row<'_>) -> Result<SseLegacyTrade, RowError> {
        Ok(SseLegacyTrade {
            data_status: row.opt_int(self.data_status),
            trade_index: row.opt_int(self.trade_index),
            trade_channel: row.opt_int(self.trade_channel),
            security_id: row.required_text(self.security_id, "SecurityID")?.to_string(),
            trade_time: row.text(self.trade_time).to_string(),
            trade_price: row.float(self.trade_price),
            trade_volume: row.float(self.trade_volume),
            trade_money: row.float(self.trade_money),
            trade_buy_no: row.int(self.trade_buy_no),
            trade_sell_no: row.int(self.trade_sell_no),
            trade_bs_flag: row.text(self.trade_bs_flag).to_string(),
            biz_index: row.int(self.biz_index),
            local_time: row.text(self.local_time).to_string(),
            seq_no: row.opt_int(self.seq_no),
        })
    }
}

/// SSE trade decoder for the revision selected by trading date
#[derive(Debug, Clone)]
pub enum SseTradeDecoder {
    Legacy(SseLegacyTradeDecoder),
    Current(SseCurrentTradeDecoder),
}

impl SseTradeDecoder {
    pub fn bind(header: &HeaderIndex, revision: SseRevision) -> ScrubResult<Self> {
        Ok(match revision {
            SseRevision::Legacy => SseTradeDecoder::Legacy(SseLegacyTradeDecoder::bind(header)?),
            SseRevision::Current => SseTradeDecoder::Current(SseCurrentTradeDecoder::bind(header)?),
        })
    }
}

impl RowDecoder for SseTradeDecoder {
    type Record = SseTrade;

    fn layout(&self) -> &'static str {
        match self {
            SseTradeDecoder::Legacy(_) => SseLegacyTradeDecoder::LAYOUT,
            SseTradeDecoder::Current(_) => SseCurrentTradeDecoder::LAYOUT,
        }
    }

    fn decode(&self, fields: &[String]) -> Result<SseTrade, RowError> {
        let row = Row::new(fields);
        match self {
            SseTradeDecoder::Legacy(d) => d.decode_row(row).map(SseTrade::Legacy),
            SseTradeDecoder::Current(d) => d.decode_row(row).map(SseTrade::Current),
        }
    }
}

/// Decoder for `MarketData` snapshots
#[derive(Debug, Clone)]
pub struct SseSnapshotDecoder {
    update_time: usize,
    security_id: usize,
    pre_close_price: usize,
    open_price: usize,
    high_price: usize,
    low_price: usize,
    last_price: usize,
    close_price: usize,
    trade_number: usize,
    trade_volume: usize,
    turnover: usize,
    bids: LadderColumns,
    asks: LadderColumns,
    local_time: usize,
    seq_no: Option<usize>,
}

impl SseSnapshotDecoder {
    pub const LAYOUT: &'static str = "sse-snapshot";

    pub fn bind(header: &HeaderIndex) -> ScrubResult<Self> {
        let col = |name| header.require(name, Self::LAYOUT);
        Ok(Self {
            update_time: col("UpdateTime")?,
            security_id: col("SecurityID")?,
            pre_close_price: col("PreCloPrice")?,
            open_price: col("OpenPrice")?,
            high_price: col("HighPrice")?,
            low_price: col("LowPrice")?,
            last_price: col("LastPrice")?,
            close_price: col("ClosePrice")?,
            trade_number: col("TradNumber")?,
            trade_volume: col("TradVolume")?,
            turnover: col("Turnover")?,
            bids: bind_ladder(header, "Bid", Self::LAYOUT)?,
            asks: bind_ladder(header, "Ask", Self::LAYOUT)?,
            local_time: col("LocalTime")?,
            seq_no: header.get("SeqNo"),
        })
    }
}

fn read_ladder(row: &Row<'_>, columns: &LadderColumns) -> RawLadder<f64> {
    columns.map(|(price, volume)| (row.float(price), row.float(volume)))
}

impl RowDecoder for SseSnapshotDecoder {
    type Record = SseSnapshot;

    fn layout(&self) -> &'static str {
        Self::LAYOUT
    }

    fn decode(&self, fields: &[String]) -> Result<SseSnapshot, RowError> {
        let row = Row::new(fields);
        Ok(SseSnapshot {
            update_time: row.text(self.update_time).to_string(),
            security_id: row.required_text(self.security_id, "SecurityID")?.to_string(),
            pre_close_price: row.float(self.pre_close_price),
            open_price: row.float(self.open_price),
            high_price: row.float(self.high_price),
            low_price: row.float(self.low_price),
            last_price: row.float(self.last_price),
            close_price: row.float(self.close_price),
            trade_number: row.int(self.trade_number),
            trade_volume: row.float(self.trade_volume),
            turnover: row.float(self.turnover),
            bids: read_ladder(&row, &self.bids),
            asks: read_ladder(&row, &self.asks),
            local_time: row.text(self.local_time).to_string(),
            seq_no: row.opt_int(self.seq_no),
        })
    }
}
