use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "evalmetrics")]
#[command(about = "Aggregate EVAL_METRICS telemetry from survey-builder logs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// TOML file with [report] and [archive] settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build metrics.json from an eval log
    Report {
        /// Eval log to read (overrides EVAL_METRICS_FILE)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Where to write the report
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Zip the draft-data folder to a file
    Archive {
        /// Folder to zip (overrides DRAFT_DATA_FOLDER)
        #[arg(long)]
        folder: Option<PathBuf>,

        /// Where to write the archive
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the draft-data download response as JSON
    Download {
        /// Folder to serve (overrides DRAFT_DATA_FOLDER)
        #[arg(long)]
        folder: Option<PathBuf>,
    },
}
