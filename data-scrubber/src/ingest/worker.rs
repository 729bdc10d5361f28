//! Chunk workers
//!
//! Each worker owns one [`ChunkRange`], opens its own handle on the table,
//! seeks to its start and decodes every record whose first byte lies inside
//! the range. Workers share only the immutable header and decoder.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;
use std::thread;

use tracing::{debug, error, warn};

use crate::error::{ScrubError, ScrubResult};
use crate::provider::RowDecoder;

use super::chunk::{ChunkPlan, ChunkRange};
use super::header::HeaderIndex;
use super::tokenizer::{fit_to_width, split_fields};

/// Malformed rows logged per worker before going quiet
const MAX_ROW_WARNINGS: u64 = 10;

/// Row counters for one chunk (or a whole file once merged)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkStats {
    /// Data rows read, blank lines excluded
    pub rows: u64,
    /// Rows decoded into records
    pub decoded: u64,
    /// Rows skipped for a row-level error
    pub skipped: u64,
}

impl ChunkStats {
    pub fn absorb(&mut self, other: ChunkStats) {
        self.rows += other.rows;
        self.decoded += other.decoded;
        self.skipped += other.skipped;
    }
}

/// Records decoded from one chunk, in file order
#[derive(Debug)]
pub struct ChunkOutput<R> {
    pub index: usize,
    pub records: Vec<R>,
    pub stats: ChunkStats,
}

/// Decode every record starting inside `range`.
pub fn read_chunk<D: RowDecoder>(
    path: &Path,
    header: &HeaderIndex,
    range: ChunkRange,
    decoder: &D,
) -> ScrubResult<ChunkOutput<D::Record>> {
    let mut output = ChunkOutput {
        index: range.index,
        records: Vec::new(),
        stats: ChunkStats::default(),
    };
    if range.is_empty() {
        return Ok(output);
    }

    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(range.start))?;
    let mut reader = BufReader::new(file);

    let mut position = range.start;
    let mut buf = Vec::with_capacity(512);

    // A record starting before `end` is ours even if it runs past it
    while position < range.end {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        position += n as u64;

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        output.stats.rows += 1;

        let decoded = fit_to_width(split_fields(line), header.width())
            .and_then(|fields| decoder.decode(&fields));

        match decoded {
            Ok(record) => {
                output.records.push(record);
                output.stats.decoded += 1;
            }
            Err(e) => {
                output.stats.skipped += 1;
                if output.stats.skipped <= MAX_ROW_WARNINGS {
                    warn!(
                        "[{}] chunk {} skipped row at byte {}: {}",
                        decoder.layout(),
                        range.index,
                        position - n as u64,
                        e
                    );
                }
            }
        }
    }

    debug!(
        "[{}] chunk {} done: {} rows, {} decoded, {} skipped",
        decoder.layout(),
        range.index,
        output.stats.rows,
        output.stats.decoded,
        output.stats.skipped
    );

    Ok(output)
}

/// Run one worker per range and concatenate their records in range order.
///
/// Every worker is joined before returning. When several fail, each failure
/// is logged and the first (by range order) is returned.
pub fn decode_chunks<D: RowDecoder>(
    path: &Path,
    header: &HeaderIndex,
    plan: &ChunkPlan,
    decoder: &D,
) -> ScrubResult<(Vec<D::Record>, ChunkStats)> {
    let results: Vec<ScrubResult<ChunkOutput<D::Record>>> = thread::scope(|scope| {
        let handles: Vec<_> = plan
            .ranges
            .iter()
            .map(|&range| {
                thread::Builder::new()
                    .name(format!("chunk-{}", range.index))
                    .spawn_scoped(scope, move || read_chunk(path, header, range, decoder))
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(index, handle)| match handle {
                Ok(handle) => handle.join().unwrap_or_else(|panic| {
                    Err(ScrubError::Worker {
                        index,
                        message: panic_message(panic.as_ref()),
                    })
                }),
                Err(e) => Err(ScrubError::Io(e)),
            })
            .collect()
    });

    let mut records = Vec::new();
    let mut stats = ChunkStats::default();
    let mut first_error = None;

    for result in results {
        match result {
            Ok(chunk) => {
                stats.absorb(chunk.stats);
                records.extend(chunk.records);
            }
            Err(e) => {
                error!("[{}] {} chunk worker failed: {}", decoder.layout(), path.display(), e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok((records, stats)),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowError;
    use crate::ingest::chunk::ChunkPlanner;
    use std::io::Write;

    /// Decodes `id,value` rows; a non-numeric id is a row error
    struct PairDecoder {
        id: usize,
        value: usize,
    }

    impl RowDecoder for PairDecoder {
        type Record = (i64, String);

        fn layout(&self) -> &'static str {
            "pair"
        }

        fn decode(&self, fields: &[String]) -> Result<Self::Record, RowError> {
            let id = fields[self.id].trim().parse::<i64>().map_err(|_| RowError::InvalidField {
                column: "id",
                value: fields[self.id].clone(),
            })?;
            Ok((id, fields[self.value].clone()))
        }
    }

    fn write_table(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn sample_body(rows: usize) -> String {
        let mut body = String::from("id,value\n");
        for i in 0..rows {
            // Vary line length so boundaries land everywhere
            let pad = "x".repeat(i % 7);
            if i % 5 == 0 {
                body.push_str(&format!("{},\"q,{}\",\n", i, pad));
            } else {
                body.push_str(&format!("{},v{}\n", i, pad));
            }
        }
        body
    }

    fn decode_with(file: &tempfile::NamedTempFile, workers: usize) -> (Vec<(i64, String)>, ChunkStats) {
        let header = HeaderIndex::read_from(file.path()).unwrap();
        let decoder = PairDecoder {
            id: header.require("id", "pair").unwrap(),
            value: header.require("value", "pair").unwrap(),
        };
        let plan = ChunkPlanner::new(workers)
            .with_min_segment_bytes(1)
            .plan_file(file.path(), header.data_offset())
            .unwrap();
        decode_chunks(file.path(), &header, &plan, &decoder).unwrap()
    }

    #[test]
    fn test_chunk_coverage_matches_single_scan() {
        let file = write_table(&sample_body(200));
        let (baseline, base_stats) = decode_with(&file, 1);
        assert_eq!(baseline.len(), 200);
        assert_eq!(base_stats.skipped, 0);

        for workers in [2, 3, 4, 7, 16, 64, 500] {
            let (records, stats) = decode_with(&file, workers);
            assert_eq!(stats, base_stats, "workers={}", workers);
            // Concatenated in range order, so even the order matches
            assert_eq!(records, baseline, "workers={}", workers);
        }
    }

    #[test]
    fn test_malformed_rows_are_counted_not_fatal() {
        let file = write_table("id,value\n1,a\nbad,b\n2,c,d,e\n3,d\n\n");
        let (records, stats) = decode_with(&file, 2);
        assert_eq!(records, vec![(1, "a".to_string()), (3, "d".to_string())]);
        assert_eq!(stats.rows, 4);
        assert_eq!(stats.decoded, 2);
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn test_last_record_without_newline() {
        let file = write_table("id,value\n1,a\n2,b");
        let (records, _) = decode_with(&file, 3);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], (2, "b".to_string()));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let header = HeaderIndex::from_line("id,value", 9);
        let decoder = PairDecoder { id: 0, value: 1 };
        let plan = ChunkPlan {
            ranges: vec![ChunkRange {
                index: 0,
                start: 9,
                end: 100,
            }],
            total_bytes: 100,
        };
        let result = decode_chunks(Path::new("/nonexistent/table.csv"), &header, &plan, &decoder);
        assert!(matches!(result, Err(ScrubError::Io(_))));
    }
}
