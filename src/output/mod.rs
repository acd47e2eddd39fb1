//! Output module
//!
//! Handles Arrow RecordBatch creation and Parquet file writing.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Inferring Arrow schemas from JSON records
//! - Converting JSON to Arrow RecordBatches
//! - Selecting a compression codec and writing Parquet files
//! - Reading Parquet files back for inspection

mod reader;
mod schema;
mod writer;

pub use reader::{read_parquet, ParquetContents};
pub use schema::{arrow_to_json, infer_schema, json_to_arrow};
pub use writer::{
    write_batch_to_parquet, Codec, ParquetWriter, ParquetWriterConfig, PLACEHOLDER_KEY,
    VALID_CODECS,
};
