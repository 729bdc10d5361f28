//! SZSE record normalizers

use crate::clock::SessionClock;
use crate::error::ScrubResult;
use crate::provider::Normalizer;
use crate::schema::{
    is_stock_code, Direction, PriceLevel, SnapshotEvent, SzseSnapshot, SzseTrade, TradeEvent, Venue,
};

/// `ExecType` of an executed trade (`'F'`); cancellations are `'4'` (52)
pub const EXEC_TYPE_TRADE: i64 = 70;

/// Aggressor side from the application sequence numbers of both orders.
///
/// The later (higher-numbered) order is the aggressor: a later bid means the
/// buyer crossed the spread.
pub fn infer_direction(bid_appl_seq_num: i64, offer_appl_seq_num: i64) -> Direction {
    use std::cmp::Ordering;
    match bid_appl_seq_num.cmp(&offer_appl_seq_num) {
        Ordering::Greater => Direction::Buy,
        Ordering::Less => Direction::Sell,
        Ordering::Equal => Direction::Unknown,
    }
}

/// Normalizes SZSE executions
#[derive(Debug, Clone, Copy)]
pub struct SzseTradeNormalizer {
    clock: SessionClock,
}

impl SzseTradeNormalizer {
    pub fn new(clock: SessionClock) -> Self {
        Self { clock }
    }
}

impl Normalizer for SzseTradeNormalizer {
    type Record = SzseTrade;
    type Event = TradeEvent;

    fn normalize(&self, t: SzseTrade) -> ScrubResult<Option<TradeEvent>> {
        if t.exec_type != EXEC_TYPE_TRADE || !is_stock_code(&t.security_id) {
            return Ok(None);
        }

        Ok(Some(TradeEvent {
            instrument_id: Venue::Szse.instrument_id(&t.security_id),
            event_timestamp_ns: self.clock.to_nanos(&t.transact_time)?,
            sequence_id: t.seq_no,
            price: t.last_px,
            volume: t.last_qty,
            turnover: t.last_px * t.last_qty as f64,
            direction: infer_direction(t.bid_appl_seq_num, t.offer_appl_seq_num),
            buy_order_id: t.bid_appl_seq_num,
            sell_order_id: t.offer_appl_seq_num,
            local_timestamp_ns: self.clock.to_nanos(&t.local_time)?,
        }))
    }
}

/// Normalizes SZSE snapshots; limits come from the row itself
#[derive(Debug, Clone, Copy)]
pub struct SzseSnapshotNormalizer {
    clock: SessionClock,
}

impl SzseSnapshotNormalizer {
    pub fn new(clock: SessionClock) -> Self {
        Self { clock }
    }
}

impl Normalizer for SzseSnapshotNormalizer {
    type Record = SzseSnapshot;
    type Event = SnapshotEvent;

    fn normalize(&self, s: SzseSnapshot) -> ScrubResult<Option<SnapshotEvent>> {
        if !is_stock_code(&s.security_id) {
            return Ok(None);
        }

        let level = |(price, volume): (f64, i64)| PriceLevel { price, volume };
        Ok(Some(SnapshotEvent {
            instrument_id: Venue::Szse.instrument_id(&s.security_id),
            event_timestamp_ns: self.clock.to_nanos(&s.update_time)?,
            sequence_id: s.seq_no,
            last: s.last_price,
            pre_close: s.pre_close_price,
            open: s.open_price,
            high: s.high_price,
            low: s.low_price,
            // Not exported by the venue
            close: 0.0,
            trade_count: s.turn_num,
            volume: s.volume,
            turnover: s.turnover,
            high_limit: s.high_limit_price,
            low_limit: s.low_limit_price,
            bids: s.bids.map(level),
            asks: s.asks.map(level),
            local_timestamp_ns: self.clock.to_nanos(&s.local_time)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{parse_timezone, parse_trading_date};
    use crate::schema::BOOK_LEVELS;

    fn clock() -> SessionClock {
        SessionClock::new(
            parse_trading_date("20240102").unwrap(),
            parse_timezone("Asia/Shanghai").unwrap(),
        )
    }

    fn trade(code: &str, exec_type: i64, bid: i64, offer: i64) -> SzseTrade {
        SzseTrade {
            channel_no: 2022,
            appl_seq_num: 22166,
            md_stream_id: "011".to_string(),
            bid_appl_seq_num: bid,
            offer_appl_seq_num: offer,
            security_id: code.to_string(),
            security_id_source: "102".to_string(),
            last_px: 1.5,
            last_qty: 200,
            exec_type,
            transact_time: "09:30:00.000".to_string(),
            local_time: "09:30:00.047".to_string(),
            seq_no: 281886,
        }
    }

    #[test]
    fn test_infer_direction() {
        assert_eq!(infer_direction(100, 50), Direction::Buy);
        assert_eq!(infer_direction(50, 100), Direction::Sell);
        assert_eq!(infer_direction(77, 77), Direction::Unknown);
    }

    #[test]
    fn test_trade_event() {
        let event = SzseTradeNormalizer::new(clock())
            .normalize(trade("000001", EXEC_TYPE_TRADE, 100, 50))
            .unwrap()
            .unwrap();
        assert_eq!(event.instrument_id, "000001.SZ");
        assert_eq!(event.direction, Direction::Buy);
        assert_eq!(event.turnover, 300.0);
        assert_eq!(event.sequence_id, 281886);
        assert_eq!(event.buy_order_id, 100);
        assert_eq!(event.sell_order_id, 50);
    }

    #[test]
    fn test_cancellations_filtered() {
        let n = SzseTradeNormalizer::new(clock());
        assert!(n.normalize(trade("000001", 52, 100, 0)).unwrap().is_none());
    }

    #[test]
    fn test_funds_filtered() {
        let n = SzseTradeNormalizer::new(clock());
        assert!(n.normalize(trade("159915", EXEC_TYPE_TRADE, 1, 2)).unwrap().is_none());
    }

    #[test]
    fn test_snapshot_uses_row_limits() {
        let snap = SzseSnapshot {
            update_time: "09:41:36.000".to_string(),
            security_id: "300319".to_string(),
            pre_close_price: 8.75,
            turn_num: 2406,
            volume: 1586600,
            turnover: 13856440.0,
            last_price: 8.72,
            open_price: 8.74,
            high_price: 8.79,
            low_price: 8.68,
            high_limit_price: 10.5,
            low_limit_price: 7.0,
            bids: [(8.72, 3700); BOOK_LEVELS],
            asks: [(8.73, 3700); BOOK_LEVELS],
            local_time: "09:41:37.203".to_string(),
            seq_no: 1099999,
        };
        let event = SzseSnapshotNormalizer::new(clock()).normalize(snap).unwrap().unwrap();
        assert_eq!(event.instrument_id, "300319.SZ");
        assert_eq!(event.high_limit, 10.5);
        assert_eq!(event.low_limit, 7.0);
        assert_eq!(event.close, 0.0);
        assert_eq!(event.trade_count, 2406);
        assert_eq!(event.asks[0], PriceLevel { price: 8.73, volume: 3700 });
    }
}
