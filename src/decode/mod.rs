//! Input decoder module
//!
//! Reads newline-delimited JSON (optionally gzip-compressed) into JSON
//! records, either failing on the first malformed line or skipping it.

mod reader;

pub use reader::{DecodedRecords, NdjsonReader};
