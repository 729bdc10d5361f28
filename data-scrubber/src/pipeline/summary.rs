//! Per-date run reporting

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::clock::format_trading_date;
use crate::ingest::ChunkStats;
use crate::schema::DataType;

/// Row counters for one venue input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VenueStats {
    /// Data rows seen
    pub rows: u64,
    /// Rows skipped as malformed
    pub skipped: u64,
    /// Canonical events kept after filtering
    pub events: usize,
}

impl VenueStats {
    pub fn new(stats: ChunkStats, events: usize) -> Self {
        Self {
            rows: stats.rows,
            skipped: stats.skipped,
            events,
        }
    }
}

/// Result of one successful (date, data type) job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub sse: VenueStats,
    pub szse: VenueStats,
    /// Events written across all partitions
    pub events: usize,
    /// Partitions (instruments) written
    pub instruments: usize,
}

/// Outcome of one data type for a date
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub data_type: DataType,
    /// `Err` carries the rendered fatal error
    pub result: Result<JobOutcome, String>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Status of one trading date
#[derive(Debug, Clone, Serialize)]
pub struct DateSummary {
    pub date: NaiveDate,
    /// `false` when the date directory does not exist and nothing ran
    pub present: bool,
    pub jobs: Vec<JobReport>,
}

impl DateSummary {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            present: true,
            jobs: Vec::new(),
        }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self {
            date,
            present: false,
            jobs: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.jobs.iter().all(JobReport::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobReport> {
        self.jobs.iter().filter(|j| !j.is_success())
    }

    pub fn events(&self) -> usize {
        self.jobs
            .iter()
            .filter_map(|j| j.result.as_ref().ok())
            .map(|o| o.events)
            .sum()
    }
}

impl fmt::Display for DateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = format_trading_date(self.date);
        if !self.present {
            return write!(f, "{}: no exports", day);
        }
        write!(f, "{}:", day)?;
        for job in &self.jobs {
            match &job.result {
                Ok(o) => write!(f, " {}=ok({} events, {} instruments)", job.data_type, o.events, o.instruments)?,
                Err(_) => write!(f, " {}=FAILED", job.data_type)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_status() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut summary = DateSummary::new(date);
        summary.jobs.push(JobReport {
            data_type: DataType::Snapshot,
            result: Ok(JobOutcome {
                events: 5,
                instruments: 2,
                ..Default::default()
            }),
        });
        assert!(summary.is_success());

        summary.jobs.push(JobReport {
            data_type: DataType::Trade,
            result: Err("Input not found".to_string()),
        });
        assert!(!summary.is_success());
        assert_eq!(summary.failures().count(), 1);
        assert_eq!(summary.events(), 5);
        assert_eq!(
            summary.to_string(),
            "20240102: snapshot=ok(5 events, 2 instruments) trade=FAILED"
        );
        assert_eq!(DateSummary::missing(date).to_string(), "20240102: no exports");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["date"], "2024-01-02");
        assert_eq!(json["jobs"][0]["data_type"], "snapshot");
        assert_eq!(json["jobs"][0]["result"]["Ok"]["events"], 5);
        assert_eq!(json["jobs"][1]["result"]["Err"], "Input not found");
    }
}
