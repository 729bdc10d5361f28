//! Parallel table ingestion
//!
//! Archive → header → chunk plan → parallel decode. The result is every
//! decodable record of the table in file order, plus row counters.

pub mod archive;
pub mod chunk;
pub mod header;
pub mod tokenizer;
pub mod worker;

pub use archive::{open_table, TableSource};
pub use chunk::{ChunkPlan, ChunkPlanner, ChunkRange};
pub use header::HeaderIndex;
pub use worker::{decode_chunks, ChunkStats};

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ScrubResult;
use crate::provider::RowDecoder;

/// Knobs for one ingest run
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub workers: usize,
    pub min_segment_bytes: u64,
    pub scratch_dir: Option<PathBuf>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            workers: chunk::default_workers(),
            min_segment_bytes: chunk::DEFAULT_MIN_SEGMENT_BYTES,
            scratch_dir: None,
        }
    }
}

/// Records of one table in file order
#[derive(Debug)]
pub struct DecodedTable<R> {
    pub records: Vec<R>,
    pub stats: ChunkStats,
    pub workers: usize,
}

/// Decode a venue input file.
///
/// `bind` resolves the decoder's columns against the header; it runs once,
/// before any worker starts, so a missing column fails the whole file.
pub fn decode_file<D, F>(path: &Path, options: &IngestOptions, bind: F) -> ScrubResult<DecodedTable<D::Record>>
where
    D: RowDecoder,
    F: FnOnce(&HeaderIndex) -> ScrubResult<D>,
{
    let table = open_table(path, options.scratch_dir.as_deref())?;
    let header = HeaderIndex::read_from(table.path())?;
    let decoder = bind(&header)?;

    let plan = ChunkPlanner::new(options.workers)
        .with_min_segment_bytes(options.min_segment_bytes)
        .plan_file(table.path(), header.data_offset())?;

    info!(
        "[{}] decoding {:?} with {} workers",
        decoder.layout(),
        path.file_name().unwrap_or_default(),
        plan.workers()
    );

    let (records, stats) = decode_chunks(table.path(), &header, &plan, &decoder)?;

    info!(
        "[{}] decoded {} of {} rows ({} skipped)",
        decoder.layout(),
        stats.decoded,
        stats.rows,
        stats.skipped
    );

    Ok(DecodedTable {
        records,
        stats,
        workers: plan.workers(),
    })
}
