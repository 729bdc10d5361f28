//! # Data Scrubber
//!
//! Turns daily SSE and SZSE tick exports into one time-ordered stream per
//! trading date, partitioned per instrument.
//!
//! ## Stages
//!
//! - **Ingest**: extract the archive, split the table into line-aligned byte
//!   ranges and decode them on parallel worker threads
//! - **Normalize**: venue records to canonical trade and snapshot events,
//!   with the SSE trade layout chosen by trading date
//! - **Merge**: stable sort per venue, then a two-pointer merge on local
//!   capture time
//! - **Sink**: per-instrument partitions written as Parquet

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod provider;
pub mod reference;
pub mod schema;
pub mod sink;

// Re-export commonly used types
pub use config::Settings;
pub use error::{RowError, ScrubError, ScrubResult};
pub use ingest::{decode_file, IngestOptions};
pub use merge::{merge_by_local_time, merge_sorted, MergeByLocalTime};
pub use pipeline::{run_batch, DateSummary, Pipeline};
pub use provider::{Normalizer, RowDecoder};
pub use schema::{CanonicalEvent, DataType, Direction, SnapshotEvent, TradeEvent, Venue};
pub use sink::{EventSink, ParquetSink, Partitioner};
