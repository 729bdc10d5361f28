//! Async batch runner over the configured dates

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clock::format_trading_date;
use crate::config::Settings;
use crate::error::{ScrubError, ScrubResult};
use crate::sink::ParquetSink;

use super::{DateSummary, JobReport, Pipeline};

/// Run every (date, data type) job of the settings.
///
/// Jobs run one at a time on the blocking pool; each already fans out across
/// chunk workers. Failures are recorded in the date's summary and the batch
/// moves on.
pub async fn run_batch(settings: &Settings) -> ScrubResult<Vec<DateSummary>> {
    let dates = settings
        .dates()
        .map_err(|e| ScrubError::Configuration(e.to_string()))?;
    let pipeline = Arc::new(Pipeline::from_settings(settings)?);
    let sink = Arc::new(ParquetSink::new(&settings.dst_dir));

    info!("Processing {} dates into {:?}", dates.len(), settings.dst_dir);

    let mut summaries = Vec::with_capacity(dates.len());
    for date in dates {
        let day = format_trading_date(date);
        if !pipeline.date_dir(date).is_dir() {
            warn!("date({}) not exists", day);
            summaries.push(DateSummary::missing(date));
            continue;
        }

        let mut summary = DateSummary::new(date);
        for &data_type in &settings.data_types {
            let pipeline = Arc::clone(&pipeline);
            let sink = Arc::clone(&sink);
            let joined =
                tokio::task::spawn_blocking(move || pipeline.run_job(date, data_type, sink.as_ref())).await;

            let result = match joined {
                Ok(outcome) => outcome.map_err(|e| e.to_string()),
                Err(e) => {
                    error!("date({}) {} job aborted: {}", day, data_type, e);
                    Err(format!("job aborted: {}", e))
                }
            };
            summary.jobs.push(JobReport { data_type, result });
        }

        info!("{}", summary);
        summaries.push(summary);
    }

    Ok(summaries)
}
