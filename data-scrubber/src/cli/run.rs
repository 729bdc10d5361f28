//! Run command - scrub a batch of trading dates

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{error, info};

use crate::config::Settings;
use crate::pipeline::run_batch;
use crate::schema::DataType;

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {
    /// Settings file layered over the config directory
    #[arg(long, short, env = "DATA_SCRUBBER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Trading dates (YYYYMMDD); replaces the configured dates
    #[arg(long = "date", short = 'd')]
    pub dates: Vec<String>,

    /// Data types to process (trade, snapshot)
    #[arg(long = "data-type", short = 't')]
    pub data_types: Vec<String>,

    /// Chunk workers per file
    #[arg(long, short)]
    pub workers: Option<usize>,

    /// Source root override
    #[arg(long)]
    pub src_dir: Option<PathBuf>,

    /// Output root override
    #[arg(long)]
    pub dst_dir: Option<PathBuf>,

    /// Write the per-date summaries as JSON to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl RunArgs {
    /// Apply command-line overrides on top of loaded settings
    pub fn apply(&self, settings: &mut Settings) -> Result<()> {
        if !self.dates.is_empty() {
            settings.date_list = self.dates.clone();
        }
        if !self.data_types.is_empty() {
            settings.data_types = self
                .data_types
                .iter()
                .map(|s| DataType::from_str(s).with_context(|| format!("unknown data type '{}'", s)))
                .collect::<Result<_>>()?;
        }
        if let Some(workers) = self.workers {
            if workers == 0 {
                bail!("--workers must be at least 1");
            }
            settings.ingest.workers = workers;
        }
        if let Some(ref dir) = self.src_dir {
            settings.src_dir = dir.clone();
        }
        if let Some(ref dir) = self.dst_dir {
            settings.dst_dir = dir.clone();
        }
        Ok(())
    }
}

/// Execute the run command
pub async fn execute(args: RunArgs) -> Result<()> {
    let mut settings = Settings::load_from(args.config.as_deref()).context("failed to load settings")?;
    args.apply(&mut settings)?;

    info!("Scrub request:");
    info!("  Source: {:?}", settings.src_dir);
    info!("  Output: {:?}", settings.dst_dir);
    info!("  Data types: {:?}", settings.data_types);
    info!("  Workers per file: {}", settings.ingest.workers);

    let summaries = run_batch(&settings).await?;

    if let Some(ref path) = args.summary {
        let json = serde_json::to_string_pretty(&summaries)?;
        std::fs::write(path, json).with_context(|| format!("cannot write summary to {:?}", path))?;
        info!("Summary written to {:?}", path);
    }

    let failed: Vec<_> = summaries.iter().filter(|s| !s.is_success()).collect();
    for summary in &failed {
        for job in summary.failures() {
            if let Err(ref reason) = job.result {
                error!("  {} {}: {}", summary.date, job.data_type, reason);
            }
        }
    }

    info!(
        "Batch completed: {} dates, {} failed, {} events written",
        summaries.len(),
        failed.len(),
        summaries.iter().map(|s| s.events()).sum::<usize>()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            dates: vec![],
            data_types: vec![],
            workers: None,
            src_dir: None,
            dst_dir: None,
            summary: None,
        }
    }

    #[test]
    fn test_overrides_applied() {
        let mut settings = Settings::default_settings();
        let args = RunArgs {
            dates: vec!["20240102".to_string()],
            data_types: vec!["trade".to_string()],
            workers: Some(4),
            dst_dir: Some(PathBuf::from("/tmp/out")),
            ..args()
        };
        args.apply(&mut settings).unwrap();
        assert_eq!(settings.date_list, vec!["20240102"]);
        assert_eq!(settings.data_types, vec![DataType::Trade]);
        assert_eq!(settings.ingest.workers, 4);
        assert_eq!(settings.dst_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let mut settings = Settings::default_settings();
        let bad_type = RunArgs {
            data_types: vec!["order".to_string()],
            ..args()
        };
        assert!(bad_type.apply(&mut settings).is_err());

        let zero_workers = RunArgs {
            workers: Some(0),
            ..args()
        };
        assert!(zero_workers.apply(&mut settings).is_err());
    }
}
