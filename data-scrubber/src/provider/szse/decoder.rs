//! SZSE row decoders

use crate::error::{RowError, ScrubResult};
use crate::ingest::HeaderIndex;
use crate::provider::fields::{bind_ladder, LadderColumns, Row};
use crate::provider::RowDecoder;
use crate::schema::{RawLadder, SzseSnapshot, SzseTrade};

/// Decoder for `mdl_6_36_0` execution records
#[derive(Debug, Clone)]
pub struct SzseTradeDecoder {
    channel_no: Option<usize>,
    appl_seq_num: usize,
    md_stream_id: Option<usize>,
    bid_appl_seq_num: usize,
    offer_appl_seq_num: usize,
    security_id: usize,
    security_id_source: Option<usize>,
    last_px: usize,
    last_qty: usize,
    exec_type: usize,
    transact_time: usize,
    local_time: usize,
    seq_no: usize,
}

impl SzseTradeDecoder {
    pub const LAYOUT: &'static str = "szse-trade";

    pub fn bind(header: &HeaderIndex) -> ScrubResult<Self> {
        let col = |name| header.require(name, Self::LAYOUT);
        Ok(Self {
            channel_no: header.get("ChannelNo"),
            appl_seq_num: col("ApplSeqNum")?,
            md_stream_id: header.get("MDStreamID"),
            bid_appl_seq_num: col("BidApplSeqNum")?,
            offer_appl_seq_num: col("OfferApplSeqNum")?,
            security_id: col("SecurityID")?,
            security_id_source: header.get("SecurityIDSource"),
            last_px: col("LastPx")?,
            last_qty: col("LastQty")?,
            exec_type: col("ExecType")?,
            transact_time: col("TransactTime")?,
            local_time: col("LocalTime")?,
            seq_no: col("SeqNo")?,
        })
    }
}

impl RowDecoder for SzseTradeDecoder {
    type Record = SzseTrade;

    fn layout(&self) -> &'static str {
        Self::LAYOUT
    }

    fn decode(&self, fields: &[String]) -> Result<SzseTrade, RowError> {
        let row = Row::new(fields);
        Ok(SzseTrade {
            channel_no: row.opt_int(self.channel_no),
            appl_seq_num: row.int(self.appl_seq_num),
            md_stream_id: row.opt_text(self.md_stream_id).to_string(),
            bid_appl_seq_num: row.int(self.bid_appl_seq_num),
            offer_appl_seq_num: row.int(self.offer_appl_seq_num),
            security_id: row.required_text(self.security_id, "SecurityID")?.to_string(),
            security_id_source: row.opt_text(self.security_id_source).to_string(),
            last_px: row.float(self.last_px),
            last_qty: row.int(self.last_qty),
            exec_type: row.required_int(self.exec_type, "ExecType")?,
            transact_time: row.text(self.transact_time).to_string(),
            local_time: row.text(self.local_time).to_string(),
            seq_no: row.int(self.seq_no),
        })
    }
}

/// Decoder for `mdl_6_28_0` snapshots
#[derive(Debug, Clone)]
pub struct SzseSnapshotDecoder {
    update_time: usize,
    security_id: usize,
    pre_close_price: usize,
    turn_num: usize,
    volume: usize,
    turnover: usize,
    last_price: usize,
    open_price: usize,
    high_price: usize,
    low_price: usize,
    high_limit_price: usize,
    low_limit_price: usize,
    bids: LadderColumns,
    asks: LadderColumns,
    local_time: usize,
    seq_no: Option<usize>,
}

impl SzseSnapshotDecoder {
    pub const LAYOUT: &'static str = "szse-snapshot";

    pub fn bind(header: &HeaderIndex) -> ScrubResult<Self> {
        let col = |name| header.require(name, Self::LAYOUT);
        Ok(Self {
            update_time: col("UpdateTime")?,
            security_id: col("SecurityID")?,
            pre_close_price: col("PreCloPrice")?,
            turn_num: col("TurnNum")?,
            volume: col("Volume")?,
            turnover: col("Turnover")?,
            last_price: col("LastPrice")?,
            open_price: col("OpenPrice")?,
            high_price: col("HighPrice")?,
            low_price: col("LowPrice")?,
            high_limit_price: col("HighLimitPrice")?,
            low_limit_price: col("LowLimitPrice")?,
            bids: bind_ladder(header, "Bid", Self::LAYOUT)?,
            asks: bind_ladder(header, "Ask", Self::LAYOUT)?,
            local_time: col("LocalTime")?,
            seq_no: header.get("SeqNo"),
        })
    }
}

fn read_ladder(row: &Row<'_>, columns: &LadderColumns) -> RawLadder<i64> {
    columns.map(|(price, volume)| (row.float(price), row.int(volume)))
}

impl RowDecoder for SzseSnapshotDecoder {
    type Record = SzseSnapshot;

    fn layout(&self) -> &'static str {
        Self::LAYOUT
    }

    fn decode(&self, fields: &[String]) -> Result<SzseSnapshot, RowError> {
        let row = Row::new(fields);
        Ok(SzseSnapshot {
            update_time: row.text(self.update_time).to_string(),
            security_id: row.required_text(self.security_id, "SecurityID")?.to_string(),
            pre_close_price: row.float(self.pre_close_price),
            turn_num: row.int(self.turn_num),
            volume: row.int(self.volume),
            turnover: row.float(self.turnover),
            last_price: row.float(self.last_price),
            open_price: row.float(self.open_price),
            high_price: row.float(self.high_price),
            low_price: row.float(self.low_price),
            high_limit_price: row.float(self.high_limit_price),
            low_limit_price: row.float(self.low_limit_price),
            bids: read_ladder(&row, &self.bids),
            asks: read_ladder(&row, &self.asks),
            local_time: row.text(self.local_time).to_string(),
            seq_no: row.opt_int(self.seq_no),
        })
    }
}
