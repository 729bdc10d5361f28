//! Venue decoder and normalizer seams
//!
//! A decoder turns one tokenized row into a raw venue record; it is bound to
//! a file's header once and then shared read-only by every chunk worker. A
//! normalizer turns raw records into canonical events, dropping the ones that
//! do not belong to the target universe.

use crate::error::{RowError, ScrubResult};
use crate::schema::CanonicalEvent;

/// Decodes tokenized rows of one venue layout
pub trait RowDecoder: Sync {
    /// Raw record produced per row
    type Record: Send;

    /// Layout name used in logs and errors
    fn layout(&self) -> &'static str;

    /// Decode one row whose width already matches the header.
    ///
    /// Row-level problems are reported as [`RowError`]; the caller logs,
    /// counts and skips the row.
    fn decode(&self, fields: &[String]) -> Result<Self::Record, RowError>;
}

/// Converts raw venue records into canonical events
pub trait Normalizer {
    type Record;
    type Event: CanonicalEvent;

    /// Normalize one record. `Ok(None)` means the record is filtered out
    /// (not a trade, not a stock). Errors are fatal for the file.
    fn normalize(&self, record: Self::Record) -> ScrubResult<Option<Self::Event>>;

    /// Normalize a batch, preserving input order
    fn normalize_all(&self, records: Vec<Self::Record>) -> ScrubResult<Vec<Self::Event>> {
        let mut events = Vec::with_capacity(records.len());
        for record in records {
            if let Some(event) = self.normalize(record)? {
                events.push(event);
            }
        }
        Ok(events)
    }
}
