//! Output side of the pipeline
//!
//! The merged stream is split per instrument by the [`Partitioner`] and each
//! partition is handed to an [`EventSink`].

mod parquet;
mod partition;

pub use self::parquet::{ColumnarEvent, ParquetSink};
pub use partition::{partition_stream, Partitioner, DEFAULT_QUEUE_CAPACITY};

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::ScrubResult;

/// Destination for per-instrument partitions
pub trait EventSink<E>: Send + Sync {
    /// Persist one instrument's events for a trading date; returns where they went
    fn write_partition(&self, date: NaiveDate, instrument_id: &str, events: &[E]) -> ScrubResult<PathBuf>;
}

/// Write every partition, stopping at the first failure
pub fn write_partitions<E, S>(
    sink: &S,
    date: NaiveDate,
    partitions: &BTreeMap<String, Vec<E>>,
) -> ScrubResult<Vec<PathBuf>>
where
    S: EventSink<E> + ?Sized,
{
    partitions
        .iter()
        .map(|(instrument_id, events)| sink.write_partition(date, instrument_id, events))
        .collect()
}
