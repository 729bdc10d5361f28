//! Application settings and configuration

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::clock::{parse_trading_date, DEFAULT_TIMEZONE};
use crate::ingest::chunk::{default_workers, DEFAULT_MIN_SEGMENT_BYTES};
use crate::schema::DataType;
use crate::sink::DEFAULT_QUEUE_CAPACITY;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root of the raw exports, laid out as `{src_dir}/{YYYYMMDD}/...`
    #[serde(default = "default_src_dir")]
    pub src_dir: PathBuf,
    /// Root of the scrubbed output
    #[serde(default = "default_dst_dir")]
    pub dst_dir: PathBuf,
    /// First date of the range (YYYYMMDD), inclusive
    #[serde(default)]
    pub date_start: Option<String>,
    /// Last date of the range (YYYYMMDD), inclusive
    #[serde(default)]
    pub date_end: Option<String>,
    /// Explicit dates; takes precedence over the range when non-empty
    #[serde(default)]
    pub date_list: Vec<String>,
    /// Direction of the range walk
    #[serde(default)]
    pub date_sort: DateSort,
    /// Data types to process for each date
    #[serde(default = "default_data_types", alias = "data_type_list")]
    pub data_types: Vec<DataType>,
    /// Stable-sort each venue by local time before merging
    #[serde(default = "default_true")]
    pub sort: bool,
    /// Parallel ingest settings
    #[serde(default)]
    pub ingest: IngestSettings,
    /// Reference data settings
    #[serde(default)]
    pub reference: ReferenceSettings,
}

/// Order in which a date range is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSort {
    #[default]
    Asc,
    Desc,
}

/// Parallel ingest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    /// Chunk workers per file
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Capacity of the queue between merge and partitioner
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Timezone the venue times are recorded in
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Smallest segment a worker is given before the worker count shrinks
    #[serde(default = "default_min_segment_bytes")]
    pub min_segment_bytes: u64,
    /// Where archives are extracted; system temp dir when unset
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            timezone: default_timezone(),
            min_segment_bytes: default_min_segment_bytes(),
            scratch_dir: None,
        }
    }
}

/// Reference data settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceSettings {
    /// Directory holding `{YYYYMMDD}_stk_limit.csv`; `{src_dir}/reference` when unset
    #[serde(default)]
    pub limits_dir: Option<PathBuf>,
}

fn default_src_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_dst_dir() -> PathBuf {
    PathBuf::from("data/scrubbed")
}

fn default_data_types() -> Vec<DataType> {
    vec![DataType::Snapshot, DataType::Trade]
}

fn default_true() -> bool {
    true
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_min_segment_bytes() -> u64 {
    DEFAULT_MIN_SEGMENT_BYTES
}

impl Settings {
    /// Load settings from configuration files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load settings, layering an explicit file over the config directory
    pub fn load_from(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(explicit, "DATA_SCRUBBER")
    }

    /// Load settings with a custom environment variable prefix
    pub fn load_with_prefix(explicit: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config_dir = Self::config_dir();

        let mut builder = Config::builder()
            // Start with default configuration
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            // Add environment-specific configuration
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Add local overrides (not checked into git)
            .add_source(File::with_name(&format!("{}/local", config_dir)).required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Environment variables last (e.g., DATA_SCRUBBER__INGEST__WORKERS)
        let s = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Get the configuration directory path
    fn config_dir() -> String {
        std::env::var("DATA_SCRUBBER_CONFIG_DIR").unwrap_or_else(|_| "config".into())
    }

    /// Directory holding the daily price-limit tables
    pub fn limits_dir(&self) -> PathBuf {
        self.reference
            .limits_dir
            .clone()
            .unwrap_or_else(|| self.src_dir.join("reference"))
    }

    /// Trading dates of this run, in processing order.
    ///
    /// A non-empty `date_list` is used as given; unparseable entries are
    /// logged and skipped. Otherwise every calendar day from `date_start` to
    /// `date_end` is walked in `date_sort` order. Days without exports are
    /// skipped later, when their directory is missing.
    pub fn dates(&self) -> Result<Vec<NaiveDate>, ConfigError> {
        if !self.date_list.is_empty() {
            let dates = self
                .date_list
                .iter()
                .filter_map(|raw| match parse_trading_date(raw) {
                    Ok(date) => Some(date),
                    Err(e) => {
                        error!("Skipping date_list entry: {}", e);
                        None
                    }
                })
                .collect();
            return Ok(dates);
        }

        let bound = |value: &Option<String>, name: &str| -> Result<NaiveDate, ConfigError> {
            let raw = value
                .as_deref()
                .ok_or_else(|| ConfigError::Message(format!("{} is not set and date_list is empty", name)))?;
            parse_trading_date(raw).map_err(|e| ConfigError::Message(format!("{}: {}", name, e)))
        };
        let start = bound(&self.date_start, "date_start")?;
        let end = bound(&self.date_end, "date_end")?;

        let mut dates = Vec::new();
        let mut current = start;
        while current <= end {
            dates.push(current);
            current += Duration::days(1);
        }
        if self.date_sort == DateSort::Desc {
            dates.reverse();
        }
        Ok(dates)
    }

    /// Create default settings (useful for testing)
    pub fn default_settings() -> Self {
        Settings {
            src_dir: default_src_dir(),
            dst_dir: default_dst_dir(),
            date_start: None,
            date_end: None,
            date_list: Vec::new(),
            date_sort: DateSort::Asc,
            data_types: default_data_types(),
            sort: true,
            ingest: IngestSettings::default(),
            reference: ReferenceSettings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::default_settings()
    }
}
