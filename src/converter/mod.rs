//! Converter module
//!
//! Batch conversion of ndjson datasets into Parquet files.
//!
//! # Overview
//!
//! The converter module provides:
//! - `Converter` - Loads, saves and converts datasets, and runs whole batches
//! - `DatasetDescriptor` / `Batch` - What to convert
//! - `Outcome` / `BatchResults` - Per-dataset success or failure

mod types;

pub use types::{Batch, BatchResults, DatasetDescriptor, Outcome, RecordSet, Shape};

use crate::config::ConverterConfig;
use crate::decode::NdjsonReader;
use crate::error::{Error, Result};
use crate::output::{json_to_arrow, write_batch_to_parquet, Codec, ParquetWriterConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// ndjson → Parquet converter
///
/// Each dataset is read fully into memory, written, and reported before
/// the next one starts.
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConverterConfig,
    writer_config: ParquetWriterConfig,
}

impl Converter {
    /// Create a converter, creating the output directory if it is missing
    ///
    /// The input directory is not checked until a dataset is read.
    pub fn new(config: ConverterConfig) -> Result<Self> {
        fs::create_dir_all(&config.output_dir).map_err(|e| {
            Error::write(
                config.output_dir.display(),
                format!("Failed to create output directory: {e}"),
            )
        })?;

        let writer_config = ParquetWriterConfig::new().with_codec(config.compression);
        Ok(Self {
            config,
            writer_config,
        })
    }

    /// Set row group, dictionary and statistics options
    ///
    /// The codec is still chosen per dataset.
    #[must_use]
    pub fn with_writer_config(mut self, writer_config: ParquetWriterConfig) -> Self {
        self.writer_config = writer_config;
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn input_path(&self, dataset: &DatasetDescriptor) -> PathBuf {
        self.config.input_dir.join(dataset.input_file())
    }

    pub fn output_path(&self, dataset: &DatasetDescriptor) -> PathBuf {
        self.config.output_dir.join(dataset.output_file())
    }

    /// Read an ndjson file into a record set
    pub fn load(&self, path: impl AsRef<Path>, ignore_errors: bool) -> Result<RecordSet> {
        let path = path.as_ref();
        let decoded = NdjsonReader::new()
            .ignore_errors(ignore_errors)
            .read_path(path)?;

        if decoded.skipped > 0 {
            warn!(
                path = %path.display(),
                skipped = decoded.skipped,
                "Skipped malformed records"
            );
        }

        let batch = json_to_arrow(&decoded.records)?;
        Ok(RecordSet::new(batch, decoded.skipped))
    }

    /// Write a record set as Parquet, replacing any existing file
    pub fn save(
        &self,
        records: &RecordSet,
        path: impl AsRef<Path>,
        codec: Codec,
    ) -> Result<usize> {
        let config = self.writer_config.clone().with_codec(codec);
        write_batch_to_parquet(path, records.batch(), Some(&config))
    }

    /// Load then save one dataset
    pub fn convert(&self, dataset: &DatasetDescriptor) -> Result<RecordSet> {
        let codec = match dataset.compression() {
            Some(name) => name.parse()?,
            None => self.config.compression,
        };

        let records = self.load(self.input_path(dataset), dataset.ignore_errors())?;
        self.save(&records, self.output_path(dataset), codec)?;
        Ok(records)
    }

    /// Convert every dataset in the batch
    ///
    /// A failing dataset is recorded and the batch moves on; the result
    /// holds exactly one outcome per dataset.
    pub fn execute(&self, batch: &Batch) -> BatchResults {
        let mut results = BatchResults::default();

        for dataset in batch.iter() {
            let started = Instant::now();
            info!(
                dataset = dataset.name(),
                input = %self.input_path(dataset).display(),
                "Converting"
            );

            let outcome = match self.convert(dataset) {
                Ok(records) => {
                    info!(
                        dataset = dataset.name(),
                        shape = %records.shape(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Converted"
                    );
                    Outcome::success(&records, self.output_path(dataset))
                }
                Err(e) => {
                    warn!(
                        dataset = dataset.name(),
                        kind = %e.kind(),
                        "Conversion failed: {e}"
                    );
                    Outcome::failed(&e)
                }
            };

            results.record(dataset.name(), outcome);
        }

        info!(
            succeeded = results.succeeded(),
            failed = results.failed(),
            "Batch complete"
        );
        results
    }
}

#[cfg(test)]
mod tests;
