//! Data Scrubber CLI
//!
//! Provides commands for:
//! - `run`: Scrub the configured trading dates into per-instrument Parquet
//! - `plan`: Show the header and chunk plan of one export

use anyhow::{anyhow, Result};
use clap::Parser;

use data_scrubber::cli::{Cli, Commands};
use data_scrubber::logging::{init_logging, LogConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    init_logging(LogConfig::from_env()).map_err(|e| anyhow!(e))?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    match cli.command {
        Commands::Run(args) => {
            data_scrubber::cli::run::execute(args).await?;
        }
        Commands::Plan(args) => {
            data_scrubber::cli::plan::execute(args).await?;
        }
    }

    Ok(())
}
