//! Command-line interface

pub mod plan;
pub mod run;

use clap::{Parser, Subcommand};

/// Data Scrubber CLI
#[derive(Parser)]
#[command(name = "data-scrubber")]
#[command(about = "Normalize and time-merge SSE/SZSE tick archives")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Process the configured trading dates
    Run(run::RunArgs),
    /// Show the header and chunk plan of one export
    Plan(plan::PlanArgs),
}
