//! Parquet file writer
//!
//! Provides codec selection and utilities for writing Arrow RecordBatches
//! to Parquet files.

use crate::error::{Error, Result};
use arrow::array::{ArrayRef, BooleanArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{BrotliLevel, Compression, GzipLevel, ZstdLevel};
use parquet::errors::ParquetError;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// Key-value metadata entry naming the stand-in column of a table with no columns
pub const PLACEHOLDER_KEY: &str = "raw2parquet.placeholder_column";

const PLACEHOLDER_COLUMN: &str = "__rows";

/// Codec names accepted by [`Codec::from_str`]
pub const VALID_CODECS: &str =
    "snappy, gzip[:level], zstd[:level], brotli[:level], lz4, uncompressed";

/// Block compression codec for Parquet output
///
/// Parsed from names such as `snappy`, `zstd` or `gzip:9`. Levels are
/// optional; without one the writer's default level is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    /// No compression
    Uncompressed,
    /// Snappy (default)
    #[default]
    Snappy,
    /// Gzip with an optional level (0-9)
    Gzip(Option<u32>),
    /// Zstandard with an optional level (1-22)
    Zstd(Option<i32>),
    /// Brotli with an optional level (0-11)
    Brotli(Option<u32>),
    /// LZ4 raw block format
    Lz4,
}

impl Codec {
    /// Resolve to the Parquet compression setting, validating any level
    pub fn compression(&self) -> Result<Compression> {
        let invalid = |_: ParquetError| Error::unsupported_codec(self.to_string());
        let compression = match *self {
            Codec::Uncompressed => Compression::UNCOMPRESSED,
            Codec::Snappy => Compression::SNAPPY,
            Codec::Lz4 => Compression::LZ4_RAW,
            Codec::Gzip(level) => Compression::GZIP(
                level
                    .map(GzipLevel::try_new)
                    .transpose()
                    .map_err(invalid)?
                    .unwrap_or_default(),
            ),
            Codec::Zstd(level) => Compression::ZSTD(
                level
                    .map(ZstdLevel::try_new)
                    .transpose()
                    .map_err(invalid)?
                    .unwrap_or_default(),
            ),
            Codec::Brotli(level) => Compression::BROTLI(
                level
                    .map(BrotliLevel::try_new)
                    .transpose()
                    .map_err(invalid)?
                    .unwrap_or_default(),
            ),
        };
        Ok(compression)
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let (name, level) = match lowered.split_once(':') {
            Some((name, level)) => (name, Some(level)),
            None => (lowered.as_str(), None),
        };

        let codec = match (name, level) {
            ("uncompressed" | "none", None) => Codec::Uncompressed,
            ("snappy", None) => Codec::Snappy,
            ("lz4", None) => Codec::Lz4,
            ("gzip", level) => Codec::Gzip(parse_level(s, level)?),
            ("zstd", level) => Codec::Zstd(parse_level(s, level)?),
            ("brotli", level) => Codec::Brotli(parse_level(s, level)?),
            _ => return Err(Error::unsupported_codec(s)),
        };

        codec.compression()?;
        Ok(codec)
    }
}

fn parse_level<T: FromStr>(raw: &str, level: Option<&str>) -> Result<Option<T>> {
    level
        .map(|l| l.parse::<T>().map_err(|_| Error::unsupported_codec(raw)))
        .transpose()
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Uncompressed => f.write_str("uncompressed"),
            Codec::Snappy => f.write_str("snappy"),
            Codec::Lz4 => f.write_str("lz4"),
            Codec::Gzip(None) => f.write_str("gzip"),
            Codec::Gzip(Some(l)) => write!(f, "gzip:{l}"),
            Codec::Zstd(None) => f.write_str("zstd"),
            Codec::Zstd(Some(l)) => write!(f, "zstd:{l}"),
            Codec::Brotli(None) => f.write_str("brotli"),
            Codec::Brotli(Some(l)) => write!(f, "brotli:{l}"),
        }
    }
}

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    codec: Codec,
    row_group_size: usize,
    dictionary_enabled: bool,
    statistics_enabled: bool,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            codec: Codec::Snappy,
            row_group_size: 1024 * 1024, // 1M rows
            dictionary_enabled: true,
            statistics_enabled: true,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression codec
    #[must_use]
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary_enabled = enabled;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    #[must_use]
    pub fn codec(&self) -> Codec {
        self.codec
    }

    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    #[must_use]
    pub fn is_dictionary_enabled(&self) -> bool {
        self.dictionary_enabled
    }

    #[must_use]
    pub fn is_statistics_enabled(&self) -> bool {
        self.statistics_enabled
    }

    /// Build writer properties
    fn build_properties(&self, placeholder: bool) -> Result<WriterProperties> {
        let mut builder = WriterProperties::builder()
            .set_compression(self.codec.compression()?)
            .set_max_row_group_size(self.row_group_size.max(1));

        if !self.dictionary_enabled {
            builder = builder.set_dictionary_enabled(false);
        }

        if !self.statistics_enabled {
            builder = builder.set_statistics_enabled(EnabledStatistics::None);
        }

        if placeholder {
            builder = builder.set_key_value_metadata(Some(vec![KeyValue::new(
                PLACEHOLDER_KEY.to_string(),
                PLACEHOLDER_COLUMN.to_string(),
            )]));
        }

        Ok(builder.build())
    }
}

/// Parquet file writer
///
/// Output goes to a hidden temporary file next to the target and is renamed
/// over it on [`close`](Self::close), so an existing file survives a failed
/// write.
///
/// Parquet cannot store a schema without columns. A table with no columns
/// is written as a single all-null Boolean column, named in the file's
/// key-value metadata under [`PLACEHOLDER_KEY`]; [`read_parquet`]
/// drops it again.
///
/// [`read_parquet`]: crate::output::read_parquet
pub struct ParquetWriter {
    writer: ArrowWriter<File>,
    path: PathBuf,
    temp_path: PathBuf,
    placeholder: Option<SchemaRef>,
    rows_written: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(
        path: impl AsRef<Path>,
        schema: &Schema,
        config: &ParquetWriterConfig,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let temp_path = temp_path_for(&path);

        let placeholder = schema.fields().is_empty().then(|| {
            Arc::new(Schema::new(vec![Field::new(
                PLACEHOLDER_COLUMN,
                DataType::Boolean,
                true,
            )]))
        });
        let file_schema = match &placeholder {
            Some(placeholder) => Arc::clone(placeholder),
            None => Arc::new(schema.clone()),
        };

        let props = config.build_properties(placeholder.is_some())?;
        let file = File::create(&temp_path)
            .map_err(|e| Error::write(path.display(), format!("Failed to create file: {e}")))?;

        let writer = match ArrowWriter::try_new(file, file_schema, Some(props)) {
            Ok(writer) => writer,
            Err(e) => {
                discard(&temp_path);
                return Err(Error::write(
                    path.display(),
                    format!("Failed to create Parquet writer: {e}"),
                ));
            }
        };

        Ok(Self {
            writer,
            path,
            temp_path,
            placeholder,
            rows_written: 0,
        })
    }

    /// Write a RecordBatch to the file
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        let written = match &self.placeholder {
            Some(schema) => {
                if batch.num_columns() > 0 {
                    return Err(Error::write(
                        self.path.display(),
                        "Record batch has columns but the writer schema has none",
                    ));
                }
                let column: ArrayRef = Arc::new(BooleanArray::new_null(batch.num_rows()));
                let stand_in = RecordBatch::try_new(Arc::clone(schema), vec![column])?;
                self.writer.write(&stand_in)
            }
            None => self.writer.write(batch),
        };

        written
            .map_err(|e| Error::write(self.path.display(), format!("Failed to write batch: {e}")))?;

        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Get the number of rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Finalize the file and move it into place
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;

        if let Err(e) = self.writer.close() {
            discard(&self.temp_path);
            return Err(Error::write(
                self.path.display(),
                format!("Failed to close Parquet writer: {e}"),
            ));
        }

        if let Err(e) = fs::rename(&self.temp_path, &self.path) {
            discard(&self.temp_path);
            return Err(Error::write(
                self.path.display(),
                format!("Failed to move output into place: {e}"),
            ));
        }

        Ok(rows)
    }

    /// Drop everything written so far, leaving the target path untouched
    pub fn abort(self) {
        drop(self.writer);
        discard(&self.temp_path);
    }
}

/// `dir/name` → `dir/.name.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

fn discard(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path) {
        warn!(path = %temp_path.display(), "Failed to remove temporary file: {e}");
    }
}

/// Write a single RecordBatch to a Parquet file
pub fn write_batch_to_parquet(
    path: impl AsRef<Path>,
    batch: &RecordBatch,
    config: Option<&ParquetWriterConfig>,
) -> Result<usize> {
    let default_config = ParquetWriterConfig::default();
    let config = config.unwrap_or(&default_config);

    let mut writer = ParquetWriter::new(path, batch.schema().as_ref(), config)?;
    if let Err(e) = writer.write(batch) {
        writer.abort();
        return Err(e);
    }
    writer.close()
}
