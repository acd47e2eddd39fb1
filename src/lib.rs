// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # raw2parquet
//!
//! Batch conversion of newline-delimited JSON files into compressed Parquet.
//!
//! ## Features
//!
//! - **ndjson Input**: Plain or gzip-compressed, one JSON object per line
//! - **Error Tolerance**: Fail on the first malformed line, or skip and count them
//! - **Schema Inference**: Column types inferred and widened across records
//! - **Parquet Output**: Snappy by default, or gzip, zstd, brotli, lz4, uncompressed
//! - **Batch Summary**: One success/failure outcome per dataset, never aborting the batch
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use raw2parquet::{Batch, Converter, ConverterConfig, DatasetDescriptor, Result};
//!
//! fn main() -> Result<()> {
//!     let converter = Converter::new(ConverterConfig::default())?;
//!
//!     let batch: Batch = [
//!         DatasetDescriptor::new("reviews", "reviews.jsonl.gz", "reviews.parquet"),
//!         DatasetDescriptor::new("metadata", "meta.jsonl.gz", "meta.parquet")
//!             .with_ignore_errors(true),
//!     ]
//!     .into_iter()
//!     .collect();
//!
//!     for (name, outcome) in converter.execute(&batch).iter() {
//!         println!("{name}: {outcome}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        Converter                          │
//! │  execute(batch) → BatchResults                            │
//! │  convert(dataset) = load(input) → save(output, codec)     │
//! └───────────────────────────────────────────────────────────┘
//!                │                              │
//!        ┌───────┴───────┐              ┌───────┴────────┐
//!        │    decode     │              │     output     │
//!        ├───────────────┤              ├────────────────┤
//!        │ ndjson / gzip │  JSON → Arrow│ schema infer   │
//!        │ strict / skip │ ────────────▶│ Parquet writer │
//!        └───────────────┘              └────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Converter and batch configuration
pub mod config;

/// ndjson input
pub mod decode;

/// Arrow/Parquet output
pub mod output;

/// Batch conversion
pub mod converter;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{BatchFile, ConverterConfig};
pub use converter::{Batch, BatchResults, Converter, DatasetDescriptor, Outcome, RecordSet, Shape};
pub use error::{Error, ErrorKind, Result};
pub use output::Codec;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
