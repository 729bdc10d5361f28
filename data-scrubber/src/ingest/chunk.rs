//! Chunk planning
//!
//! Splits the data region of a decompressed table into contiguous byte ranges
//! that can be parsed in parallel. Every range after the first starts right
//! after a newline, so no worker ever starts mid-record. A record belongs to
//! the range holding its first byte; the owning worker reads past its end
//! offset to finish it.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

/// Segments smaller than this are not worth a thread of their own
pub const DEFAULT_MIN_SEGMENT_BYTES: u64 = 1 << 20;

/// One worker's byte range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Ordered, contiguous, non-overlapping ranges covering the data region once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    pub ranges: Vec<ChunkRange>,
    pub total_bytes: u64,
}

impl ChunkPlan {
    pub fn workers(&self) -> usize {
        self.ranges.len()
    }
}

/// Computes [`ChunkPlan`]s for a requested degree of parallelism
#[derive(Debug, Clone)]
pub struct ChunkPlanner {
    workers: usize,
    min_segment_bytes: u64,
}

impl Default for ChunkPlanner {
    fn default() -> Self {
        Self::new(default_workers())
    }
}

/// Available hardware parallelism, 1 when unknown
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl ChunkPlanner {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            min_segment_bytes: DEFAULT_MIN_SEGMENT_BYTES,
        }
    }

    /// Override the segment floor (tests use tiny floors to force many chunks)
    pub fn with_min_segment_bytes(mut self, bytes: u64) -> Self {
        self.min_segment_bytes = bytes.max(1);
        self
    }

    /// Effective worker count and segment size for a file of `total` bytes
    pub fn segment_layout(&self, total: u64) -> (usize, u64) {
        let mut workers = self.workers as u64;
        let mut segment = total / workers;
        if segment < self.min_segment_bytes {
            workers = (total / self.min_segment_bytes).clamp(1, workers);
            segment = total / workers;
        }
        (workers as usize, segment)
    }

    /// Plan a file on disk whose first data record starts at `data_offset`.
    pub fn plan_file(&self, path: &Path, data_offset: u64) -> io::Result<ChunkPlan> {
        let file = File::open(path)?;
        let total = file.metadata()?.len();
        self.plan(BufReader::new(file), data_offset, total)
    }

    /// Plan over any seekable source of `total` bytes.
    pub fn plan<R: Read + Seek>(
        &self,
        mut reader: BufReader<R>,
        data_offset: u64,
        total: u64,
    ) -> io::Result<ChunkPlan> {
        let data_offset = data_offset.min(total);
        let (workers, segment) = self.segment_layout(total);

        let mut starts = Vec::with_capacity(workers);
        starts.push(data_offset);
        for i in 1..workers {
            let nominal = i as u64 * segment;
            let aligned = align_to_record(&mut reader, nominal, total)?;
            let prev = *starts.last().unwrap_or(&data_offset);
            starts.push(aligned.max(prev));
        }

        let ranges: Vec<ChunkRange> = starts
            .iter()
            .enumerate()
            .map(|(index, &start)| ChunkRange {
                index,
                start,
                end: starts.get(index + 1).copied().unwrap_or(total),
            })
            .collect();

        debug!(
            "Chunk plan: {} bytes, {} workers, segment {} bytes, ranges {:?}",
            total,
            ranges.len(),
            segment,
            ranges.iter().map(|r| (r.start, r.end)).collect::<Vec<_>>()
        );

        Ok(ChunkPlan {
            ranges,
            total_bytes: total,
        })
    }
}

/// First record start at or after `nominal`.
///
/// Scanning begins one byte early so that a record starting exactly at the
/// nominal offset (previous byte is `\n`) stays where it is.
fn align_to_record<R: Read + Seek>(
    reader: &mut BufReader<R>,
    nominal: u64,
    total: u64,
) -> io::Result<u64> {
    if nominal == 0 {
        return Ok(0);
    }

    let from = nominal - 1;
    reader.seek(SeekFrom::Start(from))?;
    let mut skipped = Vec::new();
    let n = reader.read_until(b'\n', &mut skipped)? as u64;

    if skipped.last() == Some(&b'\n') {
        Ok((from + n).min(total))
    } else {
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn plan_bytes(data: &[u8], data_offset: u64, workers: usize, floor: u64) -> ChunkPlan {
        ChunkPlanner::new(workers)
            .with_min_segment_bytes(floor)
            .plan(BufReader::new(Cursor::new(data)), data_offset, data.len() as u64)
            .unwrap()
    }

    fn assert_contiguous(plan: &ChunkPlan, data_offset: u64) {
        assert_eq!(plan.ranges[0].start, data_offset);
        assert_eq!(plan.ranges.last().unwrap().end, plan.total_bytes);
        for pair in plan.ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_segment_layout_floor_shrinks_workers() {
        let planner = ChunkPlanner::new(8);
        // 3 MiB with a 1 MiB floor: 8 workers would get 384 KiB each
        assert_eq!(planner.segment_layout(3 << 20), (3, 1 << 20));
        // Tiny file: one worker
        assert_eq!(planner.segment_layout(100), (1, 100));
        // Big file: all workers
        assert_eq!(planner.segment_layout(64 << 20), (8, 8 << 20));
    }

    #[test]
    fn test_segment_layout_empty_file() {
        assert_eq!(ChunkPlanner::new(4).segment_layout(0), (1, 0));
    }

    #[test]
    fn test_starts_follow_newlines() {
        let data = b"H1,H2\naaaa\nbbbb\ncccc\ndddd\n";
        let plan = plan_bytes(data, 6, 4, 1);
        assert_contiguous(&plan, 6);
        for r in &plan.ranges[1..] {
            if r.start < data.len() as u64 {
                assert_eq!(data[r.start as usize - 1], b'\n');
            }
        }
    }

    #[test]
    fn test_record_at_nominal_start_not_skipped() {
        let data = b"hdr\nab\ncdefgh\n";
        let plan = plan_bytes(data, 4, 2, 1);
        // nominal 7, byte 6 is '\n' so record "cdefgh" starts the second range
        assert_eq!(plan.ranges[1].start, 7);
    }

    #[test]
    fn test_long_record_spanning_segments() {
        // One long record swallows several nominal starts: later ranges are empty
        let data = b"h\nxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx\ny\n";
        let plan = plan_bytes(data, 2, 4, 1);
        assert_contiguous(&plan, 2);
        let non_empty: Vec<_> = plan.ranges.iter().filter(|r| !r.is_empty()).collect();
        assert!(non_empty.len() <= 3);
        let covered: u64 = plan.ranges.iter().map(|r| r.len()).sum();
        assert_eq!(covered, data.len() as u64 - 2);
    }

    #[test]
    fn test_no_trailing_newline() {
        let data = b"h\naaaa\nbbbb";
        let plan = plan_bytes(data, 2, 3, 1);
        assert_contiguous(&plan, 2);
    }

    #[test]
    fn test_header_only() {
        let data = b"A,B,C\n";
        let plan = plan_bytes(data, 6, 4, 1);
        assert_contiguous(&plan, 6);
        assert!(plan.ranges.iter().all(|r| r.is_empty()));
    }
}
