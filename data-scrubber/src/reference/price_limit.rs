//! Daily price-limit table
//!
//! Expected file: `{limits_dir}/{YYYYMMDD}_stk_limit.csv` with columns
//! `ts_code,trade_date,pre_close,up_limit,down_limit`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::clock::format_trading_date;
use crate::error::ScrubResult;
use crate::ingest::tokenizer::{fit_to_width, split_fields};
use crate::ingest::HeaderIndex;

const LAYOUT: &str = "stk-limit";

/// Daily upper and lower price bounds of one instrument
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriceLimit {
    pub high_limit: f64,
    pub low_limit: f64,
}

/// Read-only price-limit lookup
pub trait PriceLimitSource: Sync {
    fn lookup(&self, instrument_id: &str) -> Option<PriceLimit>;
}

/// Price limits of one trading date keyed by instrument id
#[derive(Debug, Clone, Default)]
pub struct PriceLimitTable {
    limits: HashMap<String, PriceLimit>,
}

impl PriceLimitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instrument_id: impl Into<String>, limit: PriceLimit) {
        self.limits.insert(instrument_id.into(), limit);
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Path of the table for `date` under `dir`
    pub fn file_for(dir: &Path, date: NaiveDate) -> PathBuf {
        dir.join(format!("{}_stk_limit.csv", format_trading_date(date)))
    }

    /// Load the table for `date`. A missing file yields an empty table.
    pub fn load_for_date(dir: &Path, date: NaiveDate) -> ScrubResult<Self> {
        let path = Self::file_for(dir, date);
        if !path.exists() {
            warn!("Price-limit table {:?} not found; limits will read as zero", path);
            return Ok(Self::new());
        }
        Self::load(&path)
    }

    /// Load a price-limit CSV. Malformed rows are skipped.
    pub fn load(path: &Path) -> ScrubResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(Self::new());
        }

        let header = HeaderIndex::from_line(&line, line.len() as u64);
        let code = header.require("ts_code", LAYOUT)?;
        let up = header.require("up_limit", LAYOUT)?;
        let down = header.require("down_limit", LAYOUT)?;

        let mut table = Self::new();
        let mut skipped = 0u64;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let Ok(fields) = fit_to_width(split_fields(&line), header.width()) else {
                skipped += 1;
                continue;
            };
            let parsed = (
                fields[code].trim(),
                fields[up].trim().parse::<f64>(),
                fields[down].trim().parse::<f64>(),
            );
            match parsed {
                (id, Ok(high_limit), Ok(low_limit)) if !id.is_empty() => {
                    table.insert(id, PriceLimit { high_limit, low_limit });
                }
                _ => skipped += 1,
            }
        }

        info!(
            "Loaded {} price limits from {:?} ({} rows skipped)",
            table.len(),
            path,
            skipped
        );
        Ok(table)
    }
}

impl PriceLimitSource for PriceLimitTable {
    fn lookup(&self, instrument_id: &str) -> Option<PriceLimit> {
        self.limits.get(instrument_id).copied()
    }
}
