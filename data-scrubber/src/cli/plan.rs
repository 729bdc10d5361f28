//! Plan command - inspect how an export would be split across workers

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::ingest::{open_table, ChunkPlanner, HeaderIndex};

/// Arguments for the plan command
#[derive(Args)]
pub struct PlanArgs {
    /// Export archive (.csv.zip) or plain .csv
    #[arg(long, short)]
    pub input: PathBuf,

    /// Requested chunk workers
    #[arg(long, short)]
    pub workers: Option<usize>,
}

/// Execute the plan command
pub async fn execute(args: PlanArgs) -> Result<()> {
    info!("Plan request:");
    info!("  Input: {:?}", args.input);

    let table = open_table(&args.input, None).with_context(|| format!("cannot open {:?}", args.input))?;
    let header = HeaderIndex::read_from(table.path())?;

    let planner = match args.workers {
        Some(workers) => ChunkPlanner::new(workers),
        None => ChunkPlanner::default(),
    };
    let plan = planner.plan_file(table.path(), header.data_offset())?;

    println!("Columns ({}):", header.width());
    for (i, name) in header.names().iter().enumerate() {
        println!("  {:>3}  {}", i, name);
    }
    println!();
    println!(
        "Data region: {} bytes from offset {}, {} workers",
        plan.total_bytes,
        header.data_offset(),
        plan.workers()
    );
    for range in &plan.ranges {
        println!(
            "  chunk-{:<3} [{:>12}, {:>12})  {:>12} bytes",
            range.index,
            range.start,
            range.end,
            range.len()
        );
    }
    Ok(())
}
