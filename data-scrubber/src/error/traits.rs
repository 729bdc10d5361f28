//! Error classification traits.
//!
//! Errors describe whether a failed job is worth re-running; failed jobs are
//! logged with their category.

use std::time::Duration;

use super::ScrubError;

/// Classification of error types for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient errors that may resolve on retry (I/O hiccups, interrupted writes)
    Transient,
    /// Permanent errors that won't resolve on retry (bad input, missing columns)
    Permanent,
    /// Configuration errors (missing config, invalid settings)
    Configuration,
    /// Internal errors (panicked worker, unexpected state)
    Internal,
}

/// Trait for errors that can classify themselves.
pub trait ErrorClassification {
    /// Returns the category of this error
    fn category(&self) -> ErrorCategory;

    /// Returns true if this error is transient and may succeed on retry
    fn is_transient(&self) -> bool {
        matches!(self.category(), ErrorCategory::Transient)
    }

    /// Returns true if this error is permanent and won't succeed on retry
    fn is_permanent(&self) -> bool {
        matches!(self.category(), ErrorCategory::Permanent)
    }

    /// Suggests a delay before retrying, if applicable
    fn suggested_retry_delay(&self) -> Option<Duration> {
        match self.category() {
            ErrorCategory::Transient => Some(Duration::from_millis(500)),
            _ => None,
        }
    }
}

impl ErrorClassification for ScrubError {
    fn category(&self) -> ErrorCategory {
        match self {
            ScrubError::Io(_) => ErrorCategory::Transient,
            ScrubError::Zip(_) => ErrorCategory::Permanent,
            ScrubError::MissingInput(_) => ErrorCategory::Permanent,
            ScrubError::EmptyInput(_) => ErrorCategory::Permanent,
            ScrubError::NoTable(_) => ErrorCategory::Permanent,
            ScrubError::EmptyHeader(_) => ErrorCategory::Permanent,
            ScrubError::MissingColumn { .. } => ErrorCategory::Permanent,
            ScrubError::Timestamp { .. } => ErrorCategory::Permanent,
            ScrubError::Worker { .. } => ErrorCategory::Internal,
            ScrubError::Arrow(_) => ErrorCategory::Internal,
            ScrubError::Parquet(_) => ErrorCategory::Transient,
            ScrubError::Sink(_) => ErrorCategory::Transient,
            ScrubError::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}
