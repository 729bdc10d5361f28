//! Parquet output, one file per instrument per date

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType as ArrowType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::debug;

use crate::clock::format_trading_date;
use crate::error::{ScrubError, ScrubResult};
use crate::schema::{CanonicalEvent, DataType, PriceLevel, SnapshotEvent, TradeEvent, BOOK_LEVELS};

use super::EventSink;

/// Events that have a fixed columnar layout
pub trait ColumnarEvent: CanonicalEvent + Sized {
    const DATA_TYPE: DataType;

    fn schema() -> SchemaRef;

    fn to_batch(events: &[Self]) -> Result<RecordBatch, ArrowError>;
}

fn int64<E>(events: &[E], f: impl Fn(&E) -> i64) -> ArrayRef {
    Arc::new(Int64Array::from(events.iter().map(f).collect::<Vec<_>>()))
}

fn float64<E>(events: &[E], f: impl Fn(&E) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from(events.iter().map(f).collect::<Vec<_>>()))
}

impl ColumnarEvent for TradeEvent {
    const DATA_TYPE: DataType = DataType::Trade;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("instrument_id", ArrowType::Utf8, false),
            Field::new("event_timestamp_ns", ArrowType::Int64, false),
            Field::new("sequence_id", ArrowType::Int64, false),
            Field::new("price", ArrowType::Float64, false),
            Field::new("volume", ArrowType::Int64, false),
            Field::new("turnover", ArrowType::Float64, false),
            Field::new("direction", ArrowType::Utf8, false),
            Field::new("buy_order_id", ArrowType::Int64, false),
            Field::new("sell_order_id", ArrowType::Int64, false),
            Field::new("local_timestamp_ns", ArrowType::Int64, false),
        ]))
    }

    fn to_batch(events: &[Self]) -> Result<RecordBatch, ArrowError> {
        let instrument_ids: Vec<&str> = events.iter().map(|e| e.instrument_id.as_str()).collect();
        let directions: Vec<String> = events.iter().map(|e| e.direction.as_char().to_string()).collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(instrument_ids)),
            int64(events, |e| e.event_timestamp_ns),
            int64(events, |e| e.sequence_id),
            float64(events, |e| e.price),
            int64(events, |e| e.volume),
            float64(events, |e| e.turnover),
            Arc::new(StringArray::from(directions)),
            int64(events, |e| e.buy_order_id),
            int64(events, |e| e.sell_order_id),
            int64(events, |e| e.local_timestamp_ns),
        ];
        RecordBatch::try_new(Self::schema(), columns)
    }
}

impl ColumnarEvent for SnapshotEvent {
    const DATA_TYPE: DataType = DataType::Snapshot;

    fn schema() -> SchemaRef {
        let mut fields = vec![
            Field::new("instrument_id", ArrowType::Utf8, false),
            Field::new("event_timestamp_ns", ArrowType::Int64, false),
            Field::new("sequence_id", ArrowType::Int64, false),
            Field::new("last", ArrowType::Float64, false),
            Field::new("pre_close", ArrowType::Float64, false),
            Field::new("open", ArrowType::Float64, false),
            Field::new("high", ArrowType::Float64, false),
            Field::new("low", ArrowType::Float64, false),
            Field::new("close", ArrowType::Float64, false),
            Field::new("trade_count", ArrowType::Int64, false),
            Field::new("volume", ArrowType::Int64, false),
            Field::new("turnover", ArrowType::Float64, false),
            Field::new("high_limit", ArrowType::Float64, false),
            Field::new("low_limit", ArrowType::Float64, false),
        ];
        for side in ["bid", "ask"] {
            for n in 1..=BOOK_LEVELS {
                fields.push(Field::new(format!("{}_price_{}", side, n), ArrowType::Float64, false));
                fields.push(Field::new(format!("{}_volume_{}", side, n), ArrowType::Int64, false));
            }
        }
        fields.push(Field::new("local_timestamp_ns", ArrowType::Int64, false));
        Arc::new(Schema::new(fields))
    }

    fn to_batch(events: &[Self]) -> Result<RecordBatch, ArrowError> {
        let instrument_ids: Vec<&str> = events.iter().map(|e| e.instrument_id.as_str()).collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(instrument_ids)),
            int64(events, |e| e.event_timestamp_ns),
            int64(events, |e| e.sequence_id),
            float64(events, |e| e.last),
            float64(events, |e| e.pre_close),
            float64(events, |e| e.open),
            float64(events, |e| e.high),
            float64(events, |e| e.low),
            float64(events, |e| e.close),
            int64(events, |e| e.trade_count),
            int64(events, |e| e.volume),
            float64(events, |e| e.turnover),
            float64(events, |e| e.high_limit),
            float64(events, |e| e.low_limit),
        ];
        let sides: [fn(&SnapshotEvent) -> &[PriceLevel; BOOK_LEVELS]; 2] = [|e| &e.bids, |e| &e.asks];
        for side in sides {
            for level in 0..BOOK_LEVELS {
                columns.push(float64(events, |e| side(e)[level].price));
                columns.push(int64(events, |e| side(e)[level].volume));
            }
        }
        columns.push(int64(events, |e| e.local_timestamp_ns));
        RecordBatch::try_new(Self::schema(), columns)
    }
}

/// Writes Snappy-compressed Parquet files under
/// `{root}/{data_type}/{YYYYMMDD}/{YYYYMMDD}_{data_type}_{instrument}.parquet`.
///
/// Each file is written to a `.tmp` sibling and renamed into place, so a
/// reader never sees a partial file under the final name.
#[derive(Debug, Clone)]
pub struct ParquetSink {
    root: PathBuf,
}

impl ParquetSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination of one instrument's partition
    pub fn partition_path(&self, data_type: DataType, date: NaiveDate, instrument_id: &str) -> PathBuf {
        let day = format_trading_date(date);
        self.root
            .join(data_type.as_str())
            .join(&day)
            .join(format!("{}_{}_{}.parquet", day, data_type, instrument_id))
    }

    fn writer_properties() -> WriterProperties {
        WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build()
    }
}

impl<E: ColumnarEvent> EventSink<E> for ParquetSink {
    fn write_partition(&self, date: NaiveDate, instrument_id: &str, events: &[E]) -> ScrubResult<PathBuf> {
        let path = self.partition_path(E::DATA_TYPE, date, instrument_id);
        let parent = path
            .parent()
            .ok_or_else(|| ScrubError::Sink(format!("no parent directory for {:?}", path)))?;
        fs::create_dir_all(parent)?;

        let tmp_path = path.with_extension("parquet.tmp");
        let batch = E::to_batch(events)?;

        let file = File::create(&tmp_path)?;
        let mut writer = ArrowWriter::try_new(file, E::schema(), Some(Self::writer_properties()))?;
        writer.write(&batch)?;
        writer.close()?;

        fs::rename(&tmp_path, &path)?;
        debug!("Wrote {} {} rows to {:?}", events.len(), E::DATA_TYPE, path);
        Ok(path)
    }
}
