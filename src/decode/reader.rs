//! Newline-delimited JSON reader
//!
//! Reads one JSON object per line from plain or gzip-compressed files.

use crate::error::{Error, Result};
use flate2::bufread::MultiGzDecoder;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Records decoded from an ndjson source
#[derive(Debug, Clone, Default)]
pub struct DecodedRecords {
    /// Parsed JSON objects, in input order
    pub records: Vec<Value>,
    /// Malformed lines dropped in tolerant mode
    pub skipped: usize,
}

/// ndjson reader with strict or error-tolerant parsing
///
/// Blank lines are ignored. A line that is valid JSON but not an object
/// counts as malformed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NdjsonReader {
    ignore_errors: bool,
}

impl NdjsonReader {
    /// Create a strict reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip malformed lines instead of failing the read
    #[must_use]
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    pub fn is_ignoring_errors(&self) -> bool {
        self.ignore_errors
    }

    /// Read an ndjson file, transparently decompressing gzip input
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<DecodedRecords> {
        let path = path.as_ref();
        let source = path.display().to_string();

        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(&source)
            } else {
                Error::Io(e)
            }
        })?;
        let mut reader = BufReader::new(file);

        if reader.fill_buf()?.starts_with(&GZIP_MAGIC) {
            debug!(path = %source, "Decompressing gzip input");
            self.read(BufReader::new(MultiGzDecoder::new(reader)), &source)
        } else {
            self.read(reader, &source)
        }
    }

    /// Read ndjson from any buffered source
    ///
    /// `source` names the input in error messages.
    pub fn read<R: BufRead>(&self, mut reader: R, source: &str) -> Result<DecodedRecords> {
        let mut decoded = DecodedRecords::default();
        let mut buf = Vec::new();
        let mut line_num = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_num += 1;

            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }

            match parse_record(line) {
                Ok(record) => decoded.records.push(record),
                Err(message) if self.ignore_errors => {
                    debug!(source, line = line_num, %message, "Skipping malformed record");
                    decoded.skipped += 1;
                }
                Err(message) => return Err(Error::parse(source, line_num, message)),
            }
        }

        Ok(decoded)
    }
}

fn parse_record(line: &[u8]) -> std::result::Result<Value, String> {
    match serde_json::from_slice::<Value>(line) {
        Ok(record @ Value::Object(_)) => Ok(record),
        Ok(other) => Err(format!("expected a JSON object, found {}", kind_of(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
