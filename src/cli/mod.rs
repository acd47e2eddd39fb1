//! CLI module
//!
//! Command-line interface for running conversions.
//!
//! # Commands
//!
//! - `convert` - Convert a batch of ndjson datasets to Parquet
//! - `inspect` - Show the shape and schema of a Parquet file
//! - `validate` - Check a batch file

mod commands;
mod runner;

pub use commands::{Cli, Commands, ConvertArgs, OutputFormat};
pub use runner::{parse_dataset_arg, Runner};
