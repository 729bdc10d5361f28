//! SSE record normalizers

use tracing::warn;

use crate::clock::SessionClock;
use crate::error::ScrubResult;
use crate::provider::Normalizer;
use crate::reference::{PriceLimit, PriceLimitSource};
use crate::schema::{
    is_stock_code, Direction, PriceLevel, RawLadder, SnapshotEvent, SseSnapshot, SseTrade, TradeEvent,
    Venue, BOOK_LEVELS,
};

/// Record type flag of an executed trade in the tick-by-tick layout
const TRADE_TYPE: &str = "T";

/// Normalizes SSE trades of either layout
#[derive(Debug, Clone, Copy)]
pub struct SseTradeNormalizer {
    clock: SessionClock,
}

impl SseTradeNormalizer {
    pub fn new(clock: SessionClock) -> Self {
        Self { clock }
    }
}

impl Normalizer for SseTradeNormalizer {
    type Record = SseTrade;
    type Event = TradeEvent;

    fn normalize(&self, record: SseTrade) -> ScrubResult<Option<TradeEvent>> {
        match record {
            SseTrade::Current(t) => {
                if t.tick_type != TRADE_TYPE || !is_stock_code(&t.security_id) {
                    return Ok(None);
                }
                Ok(Some(TradeEvent {
                    instrument_id: Venue::Sse.instrument_id(&t.security_id),
                    event_timestamp_ns: self.clock.to_nanos(&t.tick_time)?,
                    sequence_id: t.biz_index,
                    price: t.price,
                    volume: t.qty,
                    turnover: t.trade_money,
                    direction: Direction::from_flag(&t.tick_bs_flag),
                    buy_order_id: t.buy_order_no,
                    sell_order_id: t.sell_order_no,
                    local_timestamp_ns: self.clock.to_nanos(&t.local_time)?,
                }))
            }
            SseTrade::Legacy(t) => {
                if !is_stock_code(&t.security_id) {
                    return Ok(None);
                }
                Ok(Some(TradeEvent {
                    instrument_id: Venue::Sse.instrument_id(&t.security_id),
                    event_timestamp_ns: self.clock.to_nanos(&t.trade_time)?,
                    sequence_id: t.biz_index,
                    price: t.trade_price,
                    volume: t.trade_volume as i64,
                    turnover: t.trade_money,
                    direction: Direction::from_flag(&t.trade_bs_flag),
                    buy_order_id: t.trade_buy_no,
                    sell_order_id: t.trade_sell_no,
                    local_timestamp_ns: self.clock.to_nanos(&t.local_time)?,
                }))
            }
        }
    }
}

/// Normalizes SSE snapshots; price limits come from the reference table
pub struct SseSnapshotNormalizer<'a> {
    clock: SessionClock,
    limits: &'a dyn PriceLimitSource,
}

impl<'a> SseSnapshotNormalizer<'a> {
    pub fn new(clock: SessionClock, limits: &'a dyn PriceLimitSource) -> Self {
        Self { clock, limits }
    }
}

fn ladder(raw: &RawLadder<f64>) -> [PriceLevel; BOOK_LEVELS] {
    raw.map(|(price, volume)| PriceLevel {
        price,
        volume: volume as i64,
    })
}

impl Normalizer for SseSnapshotNormalizer<'_> {
    type Record = SseSnapshot;
    type Event = SnapshotEvent;

    fn normalize(&self, s: SseSnapshot) -> ScrubResult<Option<SnapshotEvent>> {
        if !is_stock_code(&s.security_id) {
            return Ok(None);
        }

        let instrument_id = Venue::Sse.instrument_id(&s.security_id);
        let limit = self.limits.lookup(&instrument_id).unwrap_or_else(|| {
            warn!("No price limit for {}; using zero", instrument_id);
            PriceLimit::default()
        });

        Ok(Some(SnapshotEvent {
            event_timestamp_ns: self.clock.to_nanos(&s.update_time)?,
            sequence_id: s.seq_no,
            last: s.last_price,
            pre_close: s.pre_close_price,
            open: s.open_price,
            high: s.high_price,
            low: s.low_price,
            close: s.close_price,
            trade_count: s.trade_number,
            volume: s.trade_volume as i64,
            turnover: s.turnover,
            high_limit: limit.high_limit,
            low_limit: limit.low_limit,
            bids: ladder(&s.bids),
            asks: ladder(&s.asks),
            local_timestamp_ns: self.clock.to_nanos(&s.local_time)?,
            instrument_id,
        }))
    }
}
