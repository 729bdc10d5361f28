//! Error types for the scrubber.
//!
//! Two levels of failure exist:
//! - [`ScrubError`]: fatal for one input file (one date and data type).
//! - [`RowError`]: affects a single CSV row. Logged, counted and skipped.

mod traits;

pub use traits::{ErrorCategory, ErrorClassification};

use std::path::PathBuf;
use thiserror::Error;

/// File-level errors. Any of these aborts processing of the current input.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScrubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Input not found: {0:?}")]
    MissingInput(PathBuf),

    #[error("Input is empty: {0:?}")]
    EmptyInput(PathBuf),

    #[error("Archive {0:?} holds no .csv table")]
    NoTable(PathBuf),

    #[error("Table in {0:?} has no header line")]
    EmptyHeader(PathBuf),

    #[error("Required column '{column}' missing for layout {layout}")]
    MissingColumn { column: String, layout: &'static str },

    #[error("Invalid timestamp '{value}': {reason}")]
    Timestamp { value: String, reason: String },

    #[error("Chunk worker {index} failed: {message}")]
    Worker { index: usize, message: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for file-level operations
pub type ScrubResult<T> = Result<T, ScrubError>;

/// Row-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("Invalid field count: expected {expected}, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("Missing value for column {0}")]
    MissingField(&'static str),

    #[error("Invalid value '{value}' for column {column}")]
    InvalidField { column: &'static str, value: String },
}
