//! Parquet read-back
//!
//! Loads a Parquet file into memory for inspection and verification.

use super::writer::PLACEHOLDER_KEY;
use crate::error::{Error, Result};
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Contents of a Parquet file
#[derive(Debug, Clone)]
pub struct ParquetContents {
    /// Arrow schema embedded in the file
    pub schema: SchemaRef,
    /// All record batches, in file order
    pub batches: Vec<RecordBatch>,
    /// Distinct column chunk codecs, in first-seen order
    pub codecs: Vec<Compression>,
    /// Number of row groups
    pub row_groups: usize,
}

impl ParquetContents {
    /// Total row count across batches
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }
}

/// Read a whole Parquet file
///
/// The stand-in column written for a table without columns is dropped, so
/// such files read back with zero columns and their original row count.
pub fn read_parquet(path: impl AsRef<Path>) -> Result<ParquetContents> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::file_not_found(path.display())
        } else {
            Error::Io(e)
        }
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();

    let metadata = builder.metadata();
    let mut codecs = Vec::new();
    for row_group in metadata.row_groups() {
        for column in row_group.columns() {
            let codec = column.compression();
            if !codecs.contains(&codec) {
                codecs.push(codec);
            }
        }
    }
    let row_groups = metadata.num_row_groups();

    let placeholder = metadata
        .file_metadata()
        .key_value_metadata()
        .and_then(|entries| entries.iter().find(|kv| kv.key == PLACEHOLDER_KEY))
        .and_then(|kv| kv.value.as_deref())
        .is_some_and(|column| {
            schema.fields().len() == 1 && schema.field(0).name().as_str() == column
        });

    let reader = builder.build()?;
    let mut batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    let schema = if placeholder {
        let empty = Arc::new(Schema::empty());
        batches = batches
            .iter()
            .map(|batch| {
                let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
                RecordBatch::try_new_with_options(Arc::clone(&empty), vec![], &options)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        empty
    } else {
        schema
    };

    Ok(ParquetContents {
        schema,
        batches,
        codecs,
        row_groups,
    })
}
