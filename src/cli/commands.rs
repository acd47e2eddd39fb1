//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Convert newline-delimited JSON files into compressed Parquet
#[derive(Parser, Debug)]
#[command(name = "raw2parquet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a batch of datasets
    ///
    /// Without --config or --dataset the built-in grocery review batch is used.
    Convert(ConvertArgs),

    /// Show shape, schema and codecs of a Parquet file
    Inspect {
        /// Parquet file to inspect
        file: PathBuf,

        /// Print the first N rows as JSON
        #[arg(long, default_value = "0")]
        head: usize,
    },

    /// Check a batch file and report which inputs are present
    Validate {
        /// Batch file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Arguments for `convert`
#[derive(Args, Debug, Default)]
pub struct ConvertArgs {
    /// Batch file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory that input paths are relative to
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory that output paths are relative to (created if missing)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Default compression codec (snappy, gzip, zstd, brotli, lz4, uncompressed)
    #[arg(long)]
    pub compression: Option<String>,

    /// Extra dataset as NAME=INPUT:OUTPUT (repeatable)
    #[arg(short, long = "dataset", value_name = "NAME=INPUT:OUTPUT")]
    pub datasets: Vec<String>,

    /// Skip malformed lines for the named dataset (repeatable)
    #[arg(long = "ignore-errors", value_name = "NAME")]
    pub ignore_errors: Vec<String>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Pretty,
    /// A single JSON document
    Json,
}
