//! Per-date orchestration
//!
//! One job is one (trading date, data type) pair: decode both venues, merge
//! them by local capture time, partition per instrument and hand each
//! partition to the sink. A failing job never stops the batch.

mod batch;
mod summary;

pub use batch::run_batch;
pub use summary::{DateSummary, JobOutcome, JobReport, VenueStats};

use std::path::PathBuf;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{error, info, warn};

use crate::clock::{format_trading_date, parse_timezone, SessionClock};
use crate::config::Settings;
use crate::error::{ErrorClassification, ScrubResult};
use crate::ingest::{decode_file, IngestOptions};
use crate::merge::{merge_by_local_time, sort_by_local_time};
use crate::provider::sse::{
    self, SseRevision, SseSnapshotDecoder, SseSnapshotNormalizer, SseTradeDecoder, SseTradeNormalizer,
};
use crate::provider::szse::{
    self, SzseSnapshotDecoder, SzseSnapshotNormalizer, SzseTradeDecoder, SzseTradeNormalizer,
};
use crate::provider::Normalizer;
use crate::reference::{PriceLimitSource, PriceLimitTable};
use crate::schema::{CanonicalEvent, DataType, SnapshotEvent, TradeEvent};
use crate::sink::{partition_stream, write_partitions, EventSink};

/// Normalized events of both venues for one date, before merging
#[derive(Debug)]
pub struct VenueEvents<E> {
    pub sse: Vec<E>,
    pub szse: Vec<E>,
    pub sse_stats: VenueStats,
    pub szse_stats: VenueStats,
}

/// Runs jobs against one source tree
#[derive(Debug, Clone)]
pub struct Pipeline {
    src_dir: PathBuf,
    limits_dir: PathBuf,
    ingest: IngestOptions,
    timezone: Tz,
    sort: bool,
    queue_capacity: usize,
}

impl Pipeline {
    pub fn new(src_dir: impl Into<PathBuf>, limits_dir: impl Into<PathBuf>, ingest: IngestOptions, timezone: Tz) -> Self {
        Self {
            src_dir: src_dir.into(),
            limits_dir: limits_dir.into(),
            ingest,
            timezone,
            sort: true,
            queue_capacity: crate::sink::DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn from_settings(settings: &Settings) -> ScrubResult<Self> {
        let ingest = IngestOptions {
            workers: settings.ingest.workers,
            min_segment_bytes: settings.ingest.min_segment_bytes,
            scratch_dir: settings.ingest.scratch_dir.clone(),
        };
        let timezone = parse_timezone(&settings.ingest.timezone)?;
        Ok(Self::new(&settings.src_dir, settings.limits_dir(), ingest, timezone)
            .with_sort(settings.sort)
            .with_queue_capacity(settings.ingest.queue_capacity))
    }

    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// `{src_dir}/{YYYYMMDD}`
    pub fn date_dir(&self, date: NaiveDate) -> PathBuf {
        self.src_dir.join(format_trading_date(date))
    }

    fn input(&self, date: NaiveDate, file_name: String) -> PathBuf {
        self.date_dir(date).join(file_name)
    }

    fn clock(&self, date: NaiveDate) -> SessionClock {
        SessionClock::new(date, self.timezone)
    }

    /// Decode and normalize the trades of both venues
    pub fn trade_events(&self, date: NaiveDate) -> ScrubResult<VenueEvents<TradeEvent>> {
        let clock = self.clock(date);
        let revision = SseRevision::for_date(date);

        let sse_path = self.input(date, sse::trade_file_name(date));
        let sse_table = decode_file(&sse_path, &self.ingest, |h| SseTradeDecoder::bind(h, revision))?;
        let sse_events = SseTradeNormalizer::new(clock).normalize_all(sse_table.records)?;
        info!("SSE trades ({:?} layout): {} events", revision, sse_events.len());

        let szse_path = self.input(date, szse::trade_file_name(date));
        let szse_table = decode_file(&szse_path, &self.ingest, SzseTradeDecoder::bind)?;
        let szse_events = SzseTradeNormalizer::new(clock).normalize_all(szse_table.records)?;
        info!("SZSE trades: {} events", szse_events.len());

        Ok(VenueEvents {
            sse_stats: VenueStats::new(sse_table.stats, sse_events.len()),
            szse_stats: VenueStats::new(szse_table.stats, szse_events.len()),
            sse: sse_events,
            szse: szse_events,
        })
    }

    /// Decode and normalize the snapshots of both venues
    pub fn snapshot_events(
        &self,
        date: NaiveDate,
        limits: &dyn PriceLimitSource,
    ) -> ScrubResult<VenueEvents<SnapshotEvent>> {
        let clock = self.clock(date);

        let sse_path = self.input(date, sse::snapshot_file_name(date));
        let sse_table = decode_file(&sse_path, &self.ingest, SseSnapshotDecoder::bind)?;
        let sse_events = SseSnapshotNormalizer::new(clock, limits).normalize_all(sse_table.records)?;
        info!("SSE snapshots: {} events", sse_events.len());

        let szse_path = self.input(date, szse::snapshot_file_name(date));
        let szse_table = decode_file(&szse_path, &self.ingest, SzseSnapshotDecoder::bind)?;
        let szse_events = SzseSnapshotNormalizer::new(clock).normalize_all(szse_table.records)?;
        info!("SZSE snapshots: {} events", szse_events.len());

        Ok(VenueEvents {
            sse_stats: VenueStats::new(sse_table.stats, sse_events.len()),
            szse_stats: VenueStats::new(szse_table.stats, szse_events.len()),
            sse: sse_events,
            szse: szse_events,
        })
    }

    /// Merge both venues (SSE first on ties), partition and write
    pub fn publish<E, S>(&self, date: NaiveDate, venues: VenueEvents<E>, sink: &S) -> ScrubResult<JobOutcome>
    where
        E: CanonicalEvent,
        S: EventSink<E> + ?Sized,
    {
        let VenueEvents {
            mut sse,
            mut szse,
            sse_stats,
            szse_stats,
        } = venues;

        if self.sort {
            sort_by_local_time(&mut sse);
            sort_by_local_time(&mut szse);
        }

        let events = sse.len() + szse.len();
        let partitions = partition_stream(merge_by_local_time(sse, szse), self.queue_capacity)?;
        let written = write_partitions(sink, date, &partitions)?;

        Ok(JobOutcome {
            sse: sse_stats,
            szse: szse_stats,
            events,
            instruments: written.len(),
        })
    }

    pub fn run_trade<S>(&self, date: NaiveDate, sink: &S) -> ScrubResult<JobOutcome>
    where
        S: EventSink<TradeEvent> + ?Sized,
    {
        let venues = self.trade_events(date)?;
        self.publish(date, venues, sink)
    }

    /// The price-limit table is loaded before either venue is decoded
    pub fn run_snapshot<S>(&self, date: NaiveDate, sink: &S) -> ScrubResult<JobOutcome>
    where
        S: EventSink<SnapshotEvent> + ?Sized,
    {
        let limits = PriceLimitTable::load_for_date(&self.limits_dir, date)?;
        let venues = self.snapshot_events(date, &limits)?;
        self.publish(date, venues, sink)
    }

    pub fn run_job<S>(&self, date: NaiveDate, data_type: DataType, sink: &S) -> ScrubResult<JobOutcome>
    where
        S: EventSink<TradeEvent> + EventSink<SnapshotEvent>,
    {
        let day = format_trading_date(date);
        info!("Process date({}) {} begin", day, data_type);
        let outcome = match data_type {
            DataType::Trade => self.run_trade(date, sink),
            DataType::Snapshot => self.run_snapshot(date, sink),
        };
        match &outcome {
            Ok(o) => info!(
                "Process date({}) {} end: {} events in {} instruments",
                day, data_type, o.events, o.instruments
            ),
            Err(e) => error!("date({}) {} failed [{:?}]: {}", day, data_type, e.category(), e),
        }
        outcome
    }

    /// Run every requested data type for one date, synchronously
    pub fn run_date<S>(&self, date: NaiveDate, data_types: &[DataType], sink: &S) -> DateSummary
    where
        S: EventSink<TradeEvent> + EventSink<SnapshotEvent>,
    {
        if !self.date_dir(date).is_dir() {
            warn!("date({}) not exists", format_trading_date(date));
            return DateSummary::missing(date);
        }

        let mut summary = DateSummary::new(date);
        for &data_type in data_types {
            let result = self.run_job(date, data_type, sink).map_err(|e| e.to_string());
            summary.jobs.push(JobReport { data_type, result });
        }
        summary
    }
}
